// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounds-checked read cursor over an encoded message.

use super::{varint, DecodeError, WireType, MAX_TAG};

/// Group nesting limit while skipping unknown groups.
const MAX_GROUP_DEPTH: u32 = 100;

/// Immutable cursor for reading (bounds-checked, zero-copy).
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes consumed since `start` (a previous [`position`](Self::position)).
    pub fn consumed_since(&self, start: usize) -> &'a [u8] {
        &self.buffer[start.min(self.offset)..self.offset]
    }

    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let (value, consumed) = varint::decode(&self.buffer[self.offset..])?;
        self.offset += consumed;
        Ok(value)
    }

    /// Read a field key, returning its tag and wire type.
    pub fn read_key(&mut self) -> Result<(u32, WireType), DecodeError> {
        let key = self.read_varint()?;
        let wire_type = WireType::from_raw((key & 0x07) as u8)?;
        let tag = key >> 3;
        match u32::try_from(tag) {
            Ok(tag) if tag != 0 && tag <= MAX_TAG => Ok((tag, wire_type)),
            _ => Err(DecodeError::InvalidTag { tag }),
        }
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        if count > self.remaining() {
            return Err(DecodeError::Truncated {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    pub fn read_fixed32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_fixed64(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.read_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Read a varint length prefix and the payload it announces.
    pub fn read_len_delimited(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| DecodeError::Truncated {
            needed: usize::MAX,
            remaining: self.remaining(),
        })?;
        self.read_bytes(len)
    }

    /// Skip the payload of a field whose key was just read.
    pub fn skip_field(&mut self, tag: u32, wire_type: WireType) -> Result<(), DecodeError> {
        self.skip_field_nested(tag, wire_type, 0)
    }

    fn skip_field_nested(
        &mut self,
        tag: u32,
        wire_type: WireType,
        depth: u32,
    ) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::I64 => {
                self.read_bytes(8)?;
            }
            WireType::I32 => {
                self.read_bytes(4)?;
            }
            WireType::Len => {
                self.read_len_delimited()?;
            }
            WireType::StartGroup => {
                if depth >= MAX_GROUP_DEPTH {
                    return Err(DecodeError::RecursionLimitExceeded {
                        limit: MAX_GROUP_DEPTH,
                    });
                }
                loop {
                    let (inner_tag, inner_type) = self.read_key()?;
                    if inner_type == WireType::EndGroup {
                        if inner_tag == tag {
                            break;
                        }
                        return Err(DecodeError::UnexpectedEndGroup { tag: inner_tag });
                    }
                    self.skip_field_nested(inner_tag, inner_type, depth + 1)?;
                }
            }
            WireType::EndGroup => return Err(DecodeError::UnexpectedEndGroup { tag }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::encode_key;

    #[test]
    fn test_read_key_and_varint() {
        let bytes = [0x08, 0x96, 0x01];
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_key(), Ok((1, WireType::Varint)));
        assert_eq!(reader.read_varint(), Ok(150));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_key_rejects_tag_zero() {
        let mut reader = WireReader::new(&[0x00]);
        assert_eq!(reader.read_key(), Err(DecodeError::InvalidTag { tag: 0 }));
    }

    #[test]
    fn test_read_len_delimited_truncated() {
        let mut reader = WireReader::new(&[0x05, b'a', b'b']);
        assert_eq!(
            reader.read_len_delimited(),
            Err(DecodeError::Truncated {
                needed: 5,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_fixed_reads_little_endian() {
        let mut bytes = 0xDEAD_BEEFu32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&7u64.to_le_bytes());
        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_fixed32(), Ok(0xDEAD_BEEF));
        assert_eq!(reader.read_fixed64(), Ok(7));
    }

    #[test]
    fn test_skip_group_captures_whole_field() {
        let mut bytes = Vec::new();
        encode_key(4, WireType::StartGroup, &mut bytes);
        encode_key(1, WireType::Varint, &mut bytes);
        bytes.push(0x2A);
        encode_key(4, WireType::EndGroup, &mut bytes);
        bytes.push(0x10);

        let mut reader = WireReader::new(&bytes);
        let start = reader.position();
        let (tag, wire_type) = reader.read_key().expect("key");
        reader.skip_field(tag, wire_type).expect("skip");
        assert_eq!(reader.consumed_since(start), &bytes[..bytes.len() - 1]);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_skip_mismatched_end_group() {
        let mut bytes = Vec::new();
        encode_key(4, WireType::StartGroup, &mut bytes);
        encode_key(5, WireType::EndGroup, &mut bytes);

        let mut reader = WireReader::new(&bytes);
        let (tag, wire_type) = reader.read_key().expect("key");
        assert_eq!(
            reader.skip_field(tag, wire_type),
            Err(DecodeError::UnexpectedEndGroup { tag: 5 })
        );
    }
}
