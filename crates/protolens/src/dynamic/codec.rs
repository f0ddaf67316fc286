// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor-driven encoder and decoder for [`DynamicMessage`].
//!
//! Produces the same bytes as the typed encoder for the same logical data:
//! declaration order, defaults omitted, unknown fields re-emitted last.

use super::{DynamicMessage, Value};
use crate::encoding::{
    check_wire_type, Bool, Double, Enumeration, Fixed32, Fixed64, Float, Int32, Int64, ProtoBytes,
    ProtoString, SFixed32, SFixed64, SInt32, SInt64, ScalarEncoding, UInt32, UInt64,
};
use crate::message::{DecodeContext, DecodeOptions};
use crate::schema::{ElementType, FieldDescriptor, FieldKind, Schema, ScalarType};
use crate::wire::{encode_key, encode_len_prefixed, DecodeError, UnknownField, WireReader, WireType};
use std::sync::Arc;

/// Encode `message` to protobuf bytes.
pub fn encode(message: &DynamicMessage) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_to(message, &mut buf);
    buf
}

/// Append the encoding of `message` to `buf`.
pub fn encode_to(message: &DynamicMessage, buf: &mut Vec<u8>) {
    for (field, value) in message.present_fields() {
        encode_field(field, value, buf);
    }
    message.unknown_fields().write_to(buf);
}

fn encode_field(field: &FieldDescriptor, value: &Value, buf: &mut Vec<u8>) {
    let tag = field.tag;
    match (&field.kind, value) {
        (FieldKind::Scalar(scalar), value) => {
            encode_key(tag, scalar.wire_type(), buf);
            encode_scalar(scalar, value, buf);
        }
        (FieldKind::Message(_), Value::Message(nested)) => encode_nested(tag, nested, buf),
        (FieldKind::Repeated(element), Value::List(items)) => {
            for item in items {
                match (element, item) {
                    (ElementType::Scalar(scalar), item) => {
                        encode_key(tag, scalar.wire_type(), buf);
                        encode_scalar(scalar, item, buf);
                    }
                    (ElementType::Message(_), Value::Message(nested)) => {
                        encode_nested(tag, nested, buf)
                    }
                    (ElementType::Message(_), other) => skip_invalid(field, other),
                }
            }
        }
        (FieldKind::PackedRepeated(ElementType::Scalar(scalar)), Value::List(items)) => {
            if items.is_empty() {
                return;
            }
            let mut payload = Vec::with_capacity(items.len() * scalar.fixed_width().unwrap_or(1));
            for item in items {
                encode_scalar(scalar, item, &mut payload);
            }
            encode_key(tag, WireType::Len, buf);
            encode_len_prefixed(&payload, buf);
        }
        (_, other) => skip_invalid(field, other),
    }
}

fn encode_nested(tag: u32, nested: &DynamicMessage, buf: &mut Vec<u8>) {
    encode_key(tag, WireType::Len, buf);
    encode_len_prefixed(&encode(nested), buf);
}

/// Values are checked on insertion, so this only guards against drift.
fn skip_invalid(field: &FieldDescriptor, value: &Value) {
    log::error!(
        "[dynamic] field '{}' ({}) holds a {} value; not encoded",
        field.name,
        field.kind,
        value.kind_name()
    );
}

/// Append the un-keyed encoding of one scalar.
fn encode_scalar(scalar: &ScalarType, value: &Value, buf: &mut Vec<u8>) {
    match (scalar, value) {
        (ScalarType::Double, Value::F64(v)) => Double::encode_value(v, buf),
        (ScalarType::Float, Value::F32(v)) => Float::encode_value(v, buf),
        (ScalarType::Int32, Value::I32(v)) => Int32::encode_value(v, buf),
        (ScalarType::Int64, Value::I64(v)) => Int64::encode_value(v, buf),
        (ScalarType::UInt32, Value::U32(v)) => UInt32::encode_value(v, buf),
        (ScalarType::UInt64, Value::U64(v)) => UInt64::encode_value(v, buf),
        (ScalarType::SInt32, Value::I32(v)) => SInt32::encode_value(v, buf),
        (ScalarType::SInt64, Value::I64(v)) => SInt64::encode_value(v, buf),
        (ScalarType::Fixed32, Value::U32(v)) => Fixed32::encode_value(v, buf),
        (ScalarType::Fixed64, Value::U64(v)) => Fixed64::encode_value(v, buf),
        (ScalarType::SFixed32, Value::I32(v)) => SFixed32::encode_value(v, buf),
        (ScalarType::SFixed64, Value::I64(v)) => SFixed64::encode_value(v, buf),
        (ScalarType::Bool, Value::Bool(v)) => Bool::encode_value(v, buf),
        (ScalarType::String, Value::String(v)) => ProtoString::encode_value(v, buf),
        (ScalarType::Bytes, Value::Bytes(v)) => ProtoBytes::encode_value(v, buf),
        (ScalarType::Enum(_), Value::Enum(v)) => Enumeration::encode_value(v, buf),
        (scalar, value) => log::error!(
            "[dynamic] {} value cannot be encoded as {}",
            value.kind_name(),
            scalar
        ),
    }
}

fn decode_scalar(scalar: &ScalarType, reader: &mut WireReader<'_>) -> Result<Value, DecodeError> {
    Ok(match scalar {
        ScalarType::Double => Value::F64(Double::decode_value(reader)?),
        ScalarType::Float => Value::F32(Float::decode_value(reader)?),
        ScalarType::Int32 => Value::I32(Int32::decode_value(reader)?),
        ScalarType::Int64 => Value::I64(Int64::decode_value(reader)?),
        ScalarType::UInt32 => Value::U32(UInt32::decode_value(reader)?),
        ScalarType::UInt64 => Value::U64(UInt64::decode_value(reader)?),
        ScalarType::SInt32 => Value::I32(SInt32::decode_value(reader)?),
        ScalarType::SInt64 => Value::I64(SInt64::decode_value(reader)?),
        ScalarType::Fixed32 => Value::U32(Fixed32::decode_value(reader)?),
        ScalarType::Fixed64 => Value::U64(Fixed64::decode_value(reader)?),
        ScalarType::SFixed32 => Value::I32(SFixed32::decode_value(reader)?),
        ScalarType::SFixed64 => Value::I64(SFixed64::decode_value(reader)?),
        ScalarType::Bool => Value::Bool(Bool::decode_value(reader)?),
        ScalarType::String => Value::String(ProtoString::decode_value(reader)?),
        ScalarType::Bytes => Value::Bytes(ProtoBytes::decode_value(reader)?),
        ScalarType::Enum(_) => Value::Enum(Enumeration::decode_value(reader)?),
    })
}

/// Decode `bytes` as an instance of `type_name`.
pub fn decode(schema: &Arc<Schema>, type_name: &str, bytes: &[u8]) -> Result<DynamicMessage, DecodeError> {
    decode_with(schema, type_name, bytes, &DecodeOptions::default())
}

pub fn decode_with(
    schema: &Arc<Schema>,
    type_name: &str,
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<DynamicMessage, DecodeError> {
    let mut message = empty(schema, type_name)?;
    merge_from(&mut message, &mut WireReader::new(bytes), DecodeContext::new(options))?;
    Ok(message)
}

fn empty(schema: &Arc<Schema>, type_name: &str) -> Result<DynamicMessage, DecodeError> {
    let descriptor = schema
        .message(type_name)
        .ok_or_else(|| DecodeError::UnknownMessageType(type_name.to_owned()))?;
    Ok(DynamicMessage::of(Arc::clone(schema), Arc::clone(descriptor)))
}

/// Merge every field remaining in `reader` into `message`.
pub fn merge_from(
    message: &mut DynamicMessage,
    reader: &mut WireReader<'_>,
    ctx: DecodeContext,
) -> Result<(), DecodeError> {
    let descriptor = Arc::clone(message.shared_descriptor());
    while !reader.is_empty() {
        let start = reader.position();
        let (tag, wire_type) = reader.read_key()?;
        match descriptor.field_by_tag(tag) {
            Some(field) => merge_field(message, field, wire_type, reader, ctx)?,
            None => {
                reader.skip_field(tag, wire_type)?;
                let raw = reader.consumed_since(start).to_vec();
                log::trace!(
                    "[dynamic] {}: retaining unknown field {} ({}, {} bytes)",
                    message.type_name(),
                    tag,
                    wire_type,
                    raw.len()
                );
                message
                    .unknown_fields_mut()
                    .push(UnknownField::new(tag, wire_type, raw));
            }
        }
    }
    Ok(())
}

fn merge_field(
    message: &mut DynamicMessage,
    field: &FieldDescriptor,
    wire_type: WireType,
    reader: &mut WireReader<'_>,
    ctx: DecodeContext,
) -> Result<(), DecodeError> {
    let tag = field.tag;
    match &field.kind {
        FieldKind::Scalar(scalar) => {
            check_wire_type(tag, scalar.wire_type(), wire_type)?;
            let value = decode_scalar(scalar, reader)?;
            let fields = message.stored_mut();
            if value == scalar.default_value() {
                fields.remove(&tag);
            } else {
                fields.insert(tag, value);
            }
        }
        FieldKind::Message(type_name) => {
            let mut nested = match message.stored_mut().remove(&tag) {
                Some(Value::Message(nested)) => *nested,
                _ => empty(message.schema(), type_name)?,
            };
            merge_nested(&mut nested, tag, wire_type, reader, ctx)?;
            message.stored_mut().insert(tag, Value::from(nested));
        }
        FieldKind::Repeated(element) | FieldKind::PackedRepeated(element) => {
            let mut items = Vec::new();
            match element {
                ElementType::Scalar(scalar) => {
                    merge_repeated_scalar(scalar, tag, wire_type, reader, &mut items)?
                }
                ElementType::Message(type_name) => {
                    let mut nested = empty(message.schema(), type_name)?;
                    merge_nested(&mut nested, tag, wire_type, reader, ctx)?;
                    items.push(Value::from(nested));
                }
            }
            if items.is_empty() {
                return Ok(());
            }
            match message
                .stored_mut()
                .entry(tag)
                .or_insert_with(|| Value::List(Vec::new()))
            {
                Value::List(existing) => existing.append(&mut items),
                other => *other = Value::List(items),
            }
        }
    }
    Ok(())
}

fn merge_nested(
    nested: &mut DynamicMessage,
    tag: u32,
    wire_type: WireType,
    reader: &mut WireReader<'_>,
    ctx: DecodeContext,
) -> Result<(), DecodeError> {
    check_wire_type(tag, WireType::Len, wire_type)?;
    let ctx = ctx.enter()?;
    let payload = reader.read_len_delimited()?;
    merge_from(nested, &mut WireReader::new(payload), ctx)
}

/// Accept one unpacked element or a packed run.
fn merge_repeated_scalar(
    scalar: &ScalarType,
    tag: u32,
    wire_type: WireType,
    reader: &mut WireReader<'_>,
    items: &mut Vec<Value>,
) -> Result<(), DecodeError> {
    if wire_type == WireType::Len && scalar.is_packable() {
        let payload = reader.read_len_delimited()?;
        if let Some(width) = scalar.fixed_width() {
            if payload.len() % width != 0 {
                return Err(DecodeError::PackedLengthMismatch {
                    tag,
                    length: payload.len(),
                    width,
                });
            }
        }
        let mut packed = WireReader::new(payload);
        while !packed.is_empty() {
            items.push(decode_scalar(scalar, &mut packed)?);
        }
        return Ok(());
    }
    check_wire_type(tag, scalar.wire_type(), wire_type)?;
    items.push(decode_scalar(scalar, reader)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Arc<Schema> {
        Schema::parse(
            r#"
            syntax = "proto3";
            package t;
            message Inner { sint32 x = 1; }
            message Outer {
              int32 a = 1;
              repeated fixed32 packed = 2;
              repeated int32 loose = 3 [packed = false];
              Inner inner = 4;
              repeated Inner many = 5;
              string s = 6;
              Outer child = 7;
            }
            "#,
        )
        .expect("schema")
    }

    #[test]
    fn test_round_trip() {
        let schema = schema();
        let mut outer = DynamicMessage::new(&schema, "t.Outer").expect("outer");
        outer.set("a", -5).expect("a");
        outer
            .set("packed", vec![Value::U32(1), Value::U32(2)])
            .expect("packed");
        outer.push("loose", 0).expect("loose");
        outer.push("loose", 7).expect("loose");
        outer
            .message_mut("inner")
            .and_then(|inner| inner.set("x", -1))
            .expect("inner");
        outer.set("s", "héllo").expect("s");

        let bytes = encode(&outer);
        let decoded = decode(&schema, "t.Outer", &bytes).expect("decode");
        assert_eq!(decoded, outer);
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_empty_message_encodes_to_nothing() {
        let schema = schema();
        let outer = DynamicMessage::new(&schema, "t.Outer").expect("outer");
        assert!(encode(&outer).is_empty());
        assert_eq!(decode(&schema, "t.Outer", &[]), Ok(outer));
    }

    #[test]
    fn test_present_empty_nested_is_emitted() {
        let schema = schema();
        let mut outer = DynamicMessage::new(&schema, "t.Outer").expect("outer");
        outer.message_mut("inner").expect("inner");
        assert_eq!(encode(&outer), [0x22, 0x00]);
    }

    #[test]
    fn test_explicit_default_on_wire_stays_unset() {
        let schema = schema();
        // a = 0 written explicitly
        let decoded = decode(&schema, "t.Outer", &[0x08, 0x00]).expect("decode");
        assert_eq!(decoded.has("a"), Ok(false));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let schema = schema();
        let bytes = [0x08, 0x01, 0xF8, 0x01, 0x2A, 0x9A, 0x01, 0x02, b'h', b'i'];
        let decoded = decode(&schema, "t.Outer", &bytes).expect("decode");
        assert_eq!(decoded.unknown_fields().len(), 2);
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_unknown_type_and_recursion_limit() {
        let schema = schema();
        assert_eq!(
            decode(&schema, "t.Missing", &[]),
            Err(DecodeError::UnknownMessageType("t.Missing".into()))
        );

        // child { child { child {} } }
        let bytes = [0x3A, 0x04, 0x3A, 0x02, 0x3A, 0x00];
        let options = DecodeOptions::default().with_recursion_limit(2);
        assert_eq!(
            decode_with(&schema, "t.Outer", &bytes, &options),
            Err(DecodeError::RecursionLimitExceeded { limit: 2 })
        );
        assert!(decode(&schema, "t.Outer", &bytes).is_ok());
    }

    #[test]
    fn test_wire_type_mismatch() {
        let schema = schema();
        // Field 6 (string) sent as varint.
        assert!(matches!(
            decode(&schema, "t.Outer", &[0x30, 0x01]),
            Err(DecodeError::WireTypeMismatch { tag: 6, .. })
        ));
    }
}
