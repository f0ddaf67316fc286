// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Field-level encode/merge helpers called by generated `Message` impls.
//!
//! Encoding omits default scalars and empty repeated fields. Merging follows
//! the protobuf parser rules: singular scalars take the last value, repeated
//! fields append and accept both packed and unpacked input, nested messages
//! merge into the existing value.

pub mod scalar;

pub use scalar::{
    Bool, Double, Enumeration, Fixed32, Fixed64, Float, Int32, Int64, ProtoBytes, ProtoString,
    SFixed32, SFixed64, SInt32, SInt64, ScalarEncoding, UInt32, UInt64,
};

use crate::message::{DecodeContext, Message, MessageField};
use crate::wire::{encode_key, key_len, varint, DecodeError, WireReader, WireType};

/// Reject a known field arriving with the wrong wire type.
#[inline]
pub fn check_wire_type(tag: u32, expected: WireType, found: WireType) -> Result<(), DecodeError> {
    if expected == found {
        Ok(())
    } else {
        Err(DecodeError::WireTypeMismatch {
            tag,
            expected,
            found,
        })
    }
}

/// Emit a singular scalar, skipping the default value.
pub fn encode_scalar<E: ScalarEncoding>(tag: u32, value: &E::Value, buf: &mut Vec<u8>) {
    if E::is_default(value) {
        return;
    }
    encode_key(tag, E::WIRE_TYPE, buf);
    E::encode_value(value, buf);
}

/// Emit one keyed entry per element.
pub fn encode_repeated<E: ScalarEncoding>(tag: u32, values: &[E::Value], buf: &mut Vec<u8>) {
    for value in values {
        encode_key(tag, E::WIRE_TYPE, buf);
        E::encode_value(value, buf);
    }
}

/// Emit all elements as a single length-delimited entry.
pub fn encode_packed<E: ScalarEncoding>(tag: u32, values: &[E::Value], buf: &mut Vec<u8>) {
    if values.is_empty() {
        return;
    }
    let payload_len = match E::FIXED_WIDTH {
        Some(width) => width * values.len(),
        None => values.iter().map(E::encoded_len).sum(),
    };
    encode_key(tag, WireType::Len, buf);
    varint::encode(payload_len as u64, buf);
    buf.reserve(payload_len);
    for value in values {
        E::encode_value(value, buf);
    }
}

/// Emit a nested message as a length-delimited entry, even when it is empty.
///
/// The payload is written straight into `buf` after its length prefix.
pub fn encode_message<M: Message>(tag: u32, message: &M, buf: &mut Vec<u8>) {
    encode_key(tag, WireType::Len, buf);
    varint::encode(message.encoded_len() as u64, buf);
    message.encode_to(buf);
}

/// Emit a singular message field when present.
pub fn encode_message_field<M: Message, F: MessageField<M>>(tag: u32, field: &F, buf: &mut Vec<u8>) {
    if let Some(message) = field.as_message() {
        encode_message(tag, message, buf);
    }
}

pub fn encode_repeated_message<M: Message>(tag: u32, values: &[M], buf: &mut Vec<u8>) {
    for message in values {
        encode_message(tag, message, buf);
    }
}

/// Size of [`encode_scalar`] output.
pub fn scalar_len<E: ScalarEncoding>(tag: u32, value: &E::Value) -> usize {
    if E::is_default(value) {
        0
    } else {
        key_len(tag) + E::encoded_len(value)
    }
}

/// Size of [`encode_repeated`] output.
pub fn repeated_len<E: ScalarEncoding>(tag: u32, values: &[E::Value]) -> usize {
    values.iter().map(|value| key_len(tag) + E::encoded_len(value)).sum()
}

/// Size of [`encode_packed`] output.
pub fn packed_len<E: ScalarEncoding>(tag: u32, values: &[E::Value]) -> usize {
    if values.is_empty() {
        return 0;
    }
    let payload_len = match E::FIXED_WIDTH {
        Some(width) => width * values.len(),
        None => values.iter().map(E::encoded_len).sum(),
    };
    key_len(tag) + varint::encoded_len(payload_len as u64) + payload_len
}

/// Size of [`encode_message`] output.
pub fn message_len<M: Message>(tag: u32, message: &M) -> usize {
    let payload_len = message.encoded_len();
    key_len(tag) + varint::encoded_len(payload_len as u64) + payload_len
}

pub fn message_field_len<M: Message, F: MessageField<M>>(tag: u32, field: &F) -> usize {
    field.as_message().map_or(0, |message| message_len(tag, message))
}

pub fn repeated_message_len<M: Message>(tag: u32, values: &[M]) -> usize {
    values.iter().map(|message| message_len(tag, message)).sum()
}

/// Replace a singular scalar with the decoded value.
pub fn merge_scalar<E: ScalarEncoding>(
    tag: u32,
    wire_type: WireType,
    value: &mut E::Value,
    reader: &mut WireReader<'_>,
) -> Result<(), DecodeError> {
    check_wire_type(tag, E::WIRE_TYPE, wire_type)?;
    *value = E::decode_value(reader)?;
    Ok(())
}

/// Append to a repeated scalar from either a packed or an unpacked entry.
pub fn merge_repeated<E: ScalarEncoding>(
    tag: u32,
    wire_type: WireType,
    values: &mut Vec<E::Value>,
    reader: &mut WireReader<'_>,
) -> Result<(), DecodeError> {
    if wire_type == WireType::Len && E::WIRE_TYPE != WireType::Len {
        let payload = reader.read_len_delimited()?;
        if let Some(width) = E::FIXED_WIDTH {
            if payload.len() % width != 0 {
                return Err(DecodeError::PackedLengthMismatch {
                    tag,
                    length: payload.len(),
                    width,
                });
            }
            values.reserve(payload.len() / width);
        }
        let mut packed = WireReader::new(payload);
        while !packed.is_empty() {
            values.push(E::decode_value(&mut packed)?);
        }
        return Ok(());
    }
    check_wire_type(tag, E::WIRE_TYPE, wire_type)?;
    values.push(E::decode_value(reader)?);
    Ok(())
}

/// Merge a length-delimited entry into an existing message.
pub fn merge_message<M: Message>(
    tag: u32,
    wire_type: WireType,
    message: &mut M,
    reader: &mut WireReader<'_>,
    ctx: DecodeContext,
) -> Result<(), DecodeError> {
    check_wire_type(tag, WireType::Len, wire_type)?;
    let ctx = ctx.enter()?;
    let payload = reader.read_len_delimited()?;
    message.merge_from(&mut WireReader::new(payload), ctx)
}

/// Merge into a singular message field, materialising it first.
pub fn merge_message_field<M: Message, F: MessageField<M>>(
    tag: u32,
    wire_type: WireType,
    field: &mut F,
    reader: &mut WireReader<'_>,
    ctx: DecodeContext,
) -> Result<(), DecodeError> {
    check_wire_type(tag, WireType::Len, wire_type)?;
    merge_message(tag, wire_type, field.get_or_insert_default(), reader, ctx)
}

/// Decode one element of a repeated message field and append it.
pub fn merge_repeated_message<M: Message>(
    tag: u32,
    wire_type: WireType,
    values: &mut Vec<M>,
    reader: &mut WireReader<'_>,
    ctx: DecodeContext,
) -> Result<(), DecodeError> {
    let mut message = M::default();
    merge_message(tag, wire_type, &mut message, reader, ctx)?;
    values.push(message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge_all<E: ScalarEncoding>(bytes: &[u8]) -> Result<Vec<E::Value>, DecodeError> {
        let mut values = Vec::new();
        let mut reader = WireReader::new(bytes);
        while !reader.is_empty() {
            let (tag, wire_type) = reader.read_key()?;
            merge_repeated::<E>(tag, wire_type, &mut values, &mut reader)?;
        }
        Ok(values)
    }

    #[test]
    fn test_scalar_default_is_omitted() {
        let mut buf = Vec::new();
        encode_scalar::<Int32>(1, &0, &mut buf);
        encode_scalar::<ProtoString>(2, &String::new(), &mut buf);
        assert!(buf.is_empty());

        encode_scalar::<Int32>(1, &150, &mut buf);
        assert_eq!(buf, [0x08, 0x96, 0x01]);
    }

    #[test]
    fn test_packed_layout() {
        let mut buf = Vec::new();
        encode_packed::<Int32>(4, &[3, 270, 86_942], &mut buf);
        assert_eq!(buf, [0x22, 0x06, 0x03, 0x8E, 0x02, 0x9E, 0xA7, 0x05]);

        buf.clear();
        encode_packed::<Int32>(4, &[], &mut buf);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_lengths_match_output() {
        let values = [5, -1, 300];
        let mut buf = Vec::new();
        encode_packed::<Int32>(20, &values, &mut buf);
        assert_eq!(packed_len::<Int32>(20, &values), buf.len());

        buf.clear();
        encode_repeated::<SInt32>(20, &values, &mut buf);
        assert_eq!(repeated_len::<SInt32>(20, &values), buf.len());

        buf.clear();
        encode_packed::<SFixed64>(1, &[7, 8], &mut buf);
        assert_eq!(packed_len::<SFixed64>(1, &[7, 8]), buf.len());

        let text = "x".repeat(200);
        buf.clear();
        encode_scalar::<ProtoString>(3, &text, &mut buf);
        assert_eq!(scalar_len::<ProtoString>(3, &text), buf.len());
        assert_eq!(scalar_len::<Int32>(3, &0), 0);
        assert_eq!(packed_len::<Int32>(3, &[]), 0);
    }

    #[test]
    fn test_unpacked_layout_keeps_zero_elements() {
        let mut buf = Vec::new();
        encode_repeated::<Int32>(1, &[5, 0], &mut buf);
        assert_eq!(buf, [0x08, 0x05, 0x08, 0x00]);
    }

    #[test]
    fn test_merge_repeated_accepts_both_layouts() {
        let mut packed = Vec::new();
        encode_packed::<SInt64>(3, &[-1, 2, -3], &mut packed);
        let mut unpacked = Vec::new();
        encode_repeated::<SInt64>(3, &[-1, 2, -3], &mut unpacked);

        assert_eq!(merge_all::<SInt64>(&packed), Ok(vec![-1, 2, -3]));
        assert_eq!(merge_all::<SInt64>(&unpacked), Ok(vec![-1, 2, -3]));

        let mut mixed = packed.clone();
        mixed.extend_from_slice(&unpacked);
        assert_eq!(merge_all::<SInt64>(&mixed).map(|v| v.len()), Ok(6));
    }

    #[test]
    fn test_packed_fixed_width_mismatch() {
        // Key for field 1 (len) and a 5-byte payload of fixed32 elements.
        let bytes = [0x0A, 0x05, 1, 0, 0, 0, 2];
        assert_eq!(
            merge_all::<Fixed32>(&bytes),
            Err(DecodeError::PackedLengthMismatch {
                tag: 1,
                length: 5,
                width: 4
            })
        );
    }

    #[test]
    fn test_merge_scalar_wire_type_mismatch() {
        let mut value = 0i32;
        let mut reader = WireReader::new(&[0x00]);
        assert_eq!(
            merge_scalar::<Int32>(1, WireType::I32, &mut value, &mut reader),
            Err(DecodeError::WireTypeMismatch {
                tag: 1,
                expected: WireType::Varint,
                found: WireType::I32
            })
        );
    }

    #[test]
    fn test_repeated_strings_are_never_packed() {
        let values = vec!["a".to_owned(), String::new()];
        let mut buf = Vec::new();
        encode_repeated::<ProtoString>(2, &values, &mut buf);
        assert_eq!(merge_all::<ProtoString>(&buf), Ok(values));
    }
}
