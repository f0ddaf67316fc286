// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One marker type per protobuf scalar encoding.
//!
//! Several encodings share a Rust type (`int32`, `sint32` and `sfixed32` are
//! all `i32`), so the encoding is chosen by marker rather than by value type.

use crate::wire::{varint, DecodeError, WireReader, WireType};

/// Raw (un-keyed) encoding of a single scalar value.
pub trait ScalarEncoding {
    type Value: Clone + Default + PartialEq;

    const WIRE_TYPE: WireType;

    /// Byte width of one element for fixed-width encodings.
    const FIXED_WIDTH: Option<usize> = None;

    fn encode_value(value: &Self::Value, buf: &mut Vec<u8>);

    fn decode_value(reader: &mut WireReader<'_>) -> Result<Self::Value, DecodeError>;

    /// Encoded size of `value` without key.
    fn encoded_len(value: &Self::Value) -> usize;

    fn is_default(value: &Self::Value) -> bool {
        *value == Self::Value::default()
    }
}

/// Generate a varint-encoded scalar marker.
macro_rules! impl_varint {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $to_wire:expr, $from_wire:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name;

        impl ScalarEncoding for $name {
            type Value = $ty;
            const WIRE_TYPE: WireType = WireType::Varint;

            #[inline]
            fn encode_value(value: &$ty, buf: &mut Vec<u8>) {
                varint::encode($to_wire(*value), buf);
            }

            #[inline]
            fn decode_value(reader: &mut WireReader<'_>) -> Result<$ty, DecodeError> {
                reader.read_varint().map($from_wire)
            }

            #[inline]
            fn encoded_len(value: &$ty) -> usize {
                varint::encoded_len($to_wire(*value))
            }
        }
    };
}

/// Generate a fixed-width little-endian scalar marker.
macro_rules! impl_fixed {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $size:expr, $read:ident, $to_bits:expr, $from_bits:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name;

        impl ScalarEncoding for $name {
            type Value = $ty;
            const WIRE_TYPE: WireType = if $size == 4 { WireType::I32 } else { WireType::I64 };
            const FIXED_WIDTH: Option<usize> = Some($size);

            #[inline]
            fn encode_value(value: &$ty, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&$to_bits(*value).to_le_bytes());
            }

            #[inline]
            fn decode_value(reader: &mut WireReader<'_>) -> Result<$ty, DecodeError> {
                reader.$read().map($from_bits)
            }

            #[inline]
            fn encoded_len(_value: &$ty) -> usize {
                $size
            }
        }
    };
}

impl_varint!(
    /// `int32`: negative values are sign-extended to ten bytes.
    Int32,
    i32,
    |v: i32| i64::from(v) as u64,
    |v: u64| v as i32
);
impl_varint!(
    /// `int64`.
    Int64,
    i64,
    |v: i64| v as u64,
    |v: u64| v as i64
);
impl_varint!(
    /// `uint32`.
    UInt32,
    u32,
    u64::from,
    |v: u64| v as u32
);
impl_varint!(
    /// `uint64`.
    UInt64,
    u64,
    |v: u64| v,
    |v: u64| v
);
impl_varint!(
    /// `sint32`: zigzag.
    SInt32,
    i32,
    |v: i32| u64::from(varint::zigzag_encode32(v)),
    |v: u64| varint::zigzag_decode32(v as u32)
);
impl_varint!(
    /// `sint64`: zigzag.
    SInt64,
    i64,
    varint::zigzag_encode64,
    varint::zigzag_decode64
);
impl_varint!(
    /// `bool`: any non-zero varint decodes as `true`.
    Bool,
    bool,
    u64::from,
    |v: u64| v != 0
);
impl_varint!(
    /// Open enum, carried as its `i32` number.
    Enumeration,
    i32,
    |v: i32| i64::from(v) as u64,
    |v: u64| v as i32
);

impl_fixed!(
    /// `fixed32`.
    Fixed32,
    u32,
    4,
    read_fixed32,
    |v: u32| v,
    |v: u32| v
);
impl_fixed!(
    /// `fixed64`.
    Fixed64,
    u64,
    8,
    read_fixed64,
    |v: u64| v,
    |v: u64| v
);
impl_fixed!(
    /// `sfixed32`.
    SFixed32,
    i32,
    4,
    read_fixed32,
    |v: i32| v as u32,
    |v: u32| v as i32
);
impl_fixed!(
    /// `sfixed64`.
    SFixed64,
    i64,
    8,
    read_fixed64,
    |v: i64| v as u64,
    |v: u64| v as i64
);
impl_fixed!(
    /// `float`.
    Float,
    f32,
    4,
    read_fixed32,
    f32::to_bits,
    f32::from_bits
);
impl_fixed!(
    /// `double`.
    Double,
    f64,
    8,
    read_fixed64,
    f64::to_bits,
    f64::from_bits
);

/// `string`: length-prefixed UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtoString;

impl ScalarEncoding for ProtoString {
    type Value = String;
    const WIRE_TYPE: WireType = WireType::Len;

    fn encode_value(value: &String, buf: &mut Vec<u8>) {
        crate::wire::encode_len_prefixed(value.as_bytes(), buf);
    }

    fn decode_value(reader: &mut WireReader<'_>) -> Result<String, DecodeError> {
        let bytes = reader.read_len_delimited()?;
        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    fn encoded_len(value: &String) -> usize {
        varint::encoded_len(value.len() as u64) + value.len()
    }
}

/// `bytes`: length-prefixed raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtoBytes;

impl ScalarEncoding for ProtoBytes {
    type Value = Vec<u8>;
    const WIRE_TYPE: WireType = WireType::Len;

    fn encode_value(value: &Vec<u8>, buf: &mut Vec<u8>) {
        crate::wire::encode_len_prefixed(value, buf);
    }

    fn decode_value(reader: &mut WireReader<'_>) -> Result<Vec<u8>, DecodeError> {
        Ok(reader.read_len_delimited()?.to_vec())
    }

    fn encoded_len(value: &Vec<u8>) -> usize {
        varint::encoded_len(value.len() as u64) + value.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<E: ScalarEncoding>(value: &E::Value) -> Vec<u8> {
        let mut buf = Vec::new();
        E::encode_value(value, &mut buf);
        assert_eq!(buf.len(), E::encoded_len(value));
        buf
    }

    fn decode<E: ScalarEncoding>(bytes: &[u8]) -> E::Value {
        let mut reader = WireReader::new(bytes);
        let value = E::decode_value(&mut reader).expect("decode");
        assert!(reader.is_empty());
        value
    }

    #[test]
    fn test_negative_int32_is_ten_bytes() {
        let bytes = encode::<Int32>(&-1);
        assert_eq!(bytes.len(), 10);
        assert_eq!(decode::<Int32>(&bytes), -1);
    }

    #[test]
    fn test_sint32_stays_small() {
        let bytes = encode::<SInt32>(&-1);
        assert_eq!(bytes, [0x01]);
        assert_eq!(decode::<SInt32>(&bytes), -1);
    }

    #[test]
    fn test_fixed_widths() {
        assert_eq!(Fixed32::FIXED_WIDTH, Some(4));
        assert_eq!(Double::FIXED_WIDTH, Some(8));
        assert_eq!(Int32::FIXED_WIDTH, None);
        assert_eq!(Float::WIRE_TYPE, WireType::I32);
        assert_eq!(SFixed64::WIRE_TYPE, WireType::I64);

        let bytes = encode::<Double>(&1.5);
        assert_eq!(bytes, 1.5f64.to_le_bytes());
        assert_eq!(decode::<Double>(&bytes), 1.5);

        assert_eq!(decode::<SFixed32>(&encode::<SFixed32>(&-7)), -7);
    }

    #[test]
    fn test_bool_accepts_any_non_zero() {
        assert!(decode::<Bool>(&[0x02]));
        assert!(!decode::<Bool>(&[0x00]));
    }

    #[test]
    fn test_string_rejects_invalid_utf8() {
        let mut reader = WireReader::new(&[0x02, 0xC3, 0x28]);
        assert!(matches!(
            ProtoString::decode_value(&mut reader),
            Err(DecodeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_defaults() {
        assert!(Int32::is_default(&0));
        assert!(!Int32::is_default(&5));
        assert!(ProtoString::is_default(&String::new()));
        assert!(ProtoBytes::is_default(&Vec::new()));
        assert!(Float::is_default(&0.0));
    }
}
