// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire-level primitives of the protobuf binary format.
//!
//! Every encoded entry is a key (`tag << 3 | wire_type`, as a varint) followed
//! by a payload whose shape depends on the wire type:
//!
//! | Wire type | Payload |
//! |-----------|---------|
//! | `Varint` | LEB128 varint (int32, int64, uint*, sint*, bool, enum) |
//! | `I64` | 8 bytes little-endian (fixed64, sfixed64, double) |
//! | `Len` | varint length + bytes (string, bytes, messages, packed) |
//! | `StartGroup`/`EndGroup` | deprecated groups, only skipped |
//! | `I32` | 4 bytes little-endian (fixed32, sfixed32, float) |

mod error;
mod reader;
mod unknown;
pub mod varint;

pub use error::DecodeError;
pub use reader::WireReader;
pub use unknown::{UnknownField, UnknownFields};

use std::fmt;
use std::ops::RangeInclusive;

/// Smallest valid field tag.
pub const MIN_TAG: u32 = 1;

/// Largest valid field tag (29 bits).
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// Tags reserved for protobuf implementations; never valid in a schema.
pub const IMPLEMENTATION_RESERVED_TAGS: RangeInclusive<u32> = 19_000..=19_999;

/// Wire type carried in the low three bits of every key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    I64 = 1,
    Len = 2,
    StartGroup = 3,
    EndGroup = 4,
    I32 = 5,
}

impl WireType {
    /// Decode the three-bit wire type of a key.
    pub fn from_raw(raw: u8) -> Result<Self, DecodeError> {
        match raw {
            0 => Ok(Self::Varint),
            1 => Ok(Self::I64),
            2 => Ok(Self::Len),
            3 => Ok(Self::StartGroup),
            4 => Ok(Self::EndGroup),
            5 => Ok(Self::I32),
            other => Err(DecodeError::InvalidWireType { value: other }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Varint => "varint",
            Self::I64 => "i64",
            Self::Len => "len",
            Self::StartGroup => "start-group",
            Self::EndGroup => "end-group",
            Self::I32 => "i32",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check that `tag` is usable on the wire and in a schema.
pub fn is_valid_tag(tag: u32) -> bool {
    (MIN_TAG..=MAX_TAG).contains(&tag) && !IMPLEMENTATION_RESERVED_TAGS.contains(&tag)
}

/// Append the key for `tag` / `wire_type`.
pub fn encode_key(tag: u32, wire_type: WireType, buf: &mut Vec<u8>) {
    varint::encode((u64::from(tag) << 3) | wire_type as u64, buf);
}

/// Encoded size of the key for `tag` in bytes.
pub fn key_len(tag: u32) -> usize {
    varint::encoded_len(u64::from(tag) << 3)
}

/// Append a length prefix followed by `payload`.
pub fn encode_len_prefixed(payload: &[u8], buf: &mut Vec<u8>) {
    varint::encode(payload.len() as u64, buf);
    buf.extend_from_slice(payload);
}
