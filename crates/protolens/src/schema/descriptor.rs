// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptors: the runtime description of messages, fields and enums.

use super::builder::{EnumDescriptorBuilder, MessageDescriptorBuilder};
use crate::dynamic::Value;
use crate::wire::WireType;
use std::collections::HashMap;
use std::fmt;

/// Scalar field types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    UInt32,
    UInt64,
    SInt32,
    SInt64,
    Fixed32,
    Fixed64,
    SFixed32,
    SFixed64,
    Bool,
    String,
    Bytes,
    /// Enum, by fully-qualified name. Carried on the wire as `int32`.
    Enum(String),
}

impl ScalarType {
    /// Parse a scalar keyword (`int32`, `string`, ...). Enums are not keywords.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "double" => Self::Double,
            "float" => Self::Float,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint32" => Self::UInt32,
            "uint64" => Self::UInt64,
            "sint32" => Self::SInt32,
            "sint64" => Self::SInt64,
            "fixed32" => Self::Fixed32,
            "fixed64" => Self::Fixed64,
            "sfixed32" => Self::SFixed32,
            "sfixed64" => Self::SFixed64,
            "bool" => Self::Bool,
            "string" => Self::String,
            "bytes" => Self::Bytes,
            _ => return None,
        })
    }

    /// Schema keyword, or the enum's full name.
    pub fn keyword(&self) -> &str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::SInt32 => "sint32",
            Self::SInt64 => "sint64",
            Self::Fixed32 => "fixed32",
            Self::Fixed64 => "fixed64",
            Self::SFixed32 => "sfixed32",
            Self::SFixed64 => "sfixed64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Enum(name) => name,
        }
    }

    /// Everything except `string` and `bytes` may use packed encoding.
    pub fn is_packable(&self) -> bool {
        !matches!(self, Self::String | Self::Bytes)
    }

    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Double | Self::Fixed64 | Self::SFixed64 => WireType::I64,
            Self::Float | Self::Fixed32 | Self::SFixed32 => WireType::I32,
            Self::String | Self::Bytes => WireType::Len,
            _ => WireType::Varint,
        }
    }

    /// Element width for fixed-size encodings.
    pub fn fixed_width(&self) -> Option<usize> {
        match self.wire_type() {
            WireType::I32 => Some(4),
            WireType::I64 => Some(8),
            _ => None,
        }
    }

    /// The proto3 zero value.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Double => Value::F64(0.0),
            Self::Float => Value::F32(0.0),
            Self::Int32 | Self::SInt32 | Self::SFixed32 => Value::I32(0),
            Self::Int64 | Self::SInt64 | Self::SFixed64 => Value::I64(0),
            Self::UInt32 | Self::Fixed32 => Value::U32(0),
            Self::UInt64 | Self::Fixed64 => Value::U64(0),
            Self::Bool => Value::Bool(false),
            Self::String => Value::String(String::new()),
            Self::Bytes => Value::Bytes(Vec::new()),
            Self::Enum(_) => Value::Enum(0),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Element of a repeated field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ElementType {
    Scalar(ScalarType),
    /// Message, by fully-qualified name.
    Message(String),
}

impl ElementType {
    pub fn is_packable(&self) -> bool {
        matches!(self, Self::Scalar(scalar) if scalar.is_packable())
    }

    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Scalar(scalar) => scalar.wire_type(),
            Self::Message(_) => WireType::Len,
        }
    }

    /// Name of the referenced message or enum type, if any.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Scalar(ScalarType::Enum(name)) | Self::Message(name) => Some(name),
            Self::Scalar(_) => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => scalar.fmt(f),
            Self::Message(name) => f.write_str(name),
        }
    }
}

/// Shape of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldKind {
    Scalar(ScalarType),
    /// Singular nested message; absent by default.
    Message(String),
    /// One wire entry per element.
    Repeated(ElementType),
    /// All elements in one length-delimited entry.
    PackedRepeated(ElementType),
}

impl FieldKind {
    pub fn is_repeated(&self) -> bool {
        matches!(self, Self::Repeated(_) | Self::PackedRepeated(_))
    }

    pub fn is_packed(&self) -> bool {
        matches!(self, Self::PackedRepeated(_))
    }

    pub fn element(&self) -> Option<&ElementType> {
        match self {
            Self::Repeated(element) | Self::PackedRepeated(element) => Some(element),
            _ => None,
        }
    }

    /// Singular message type, if this is a singular message field.
    pub fn message_type(&self) -> Option<&str> {
        match self {
            Self::Message(name) => Some(name),
            _ => None,
        }
    }

    /// Name of the referenced message or enum type, if any.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Scalar(ScalarType::Enum(name)) | Self::Message(name) => Some(name),
            Self::Scalar(_) => None,
            Self::Repeated(element) | Self::PackedRepeated(element) => element.type_name(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => scalar.fmt(f),
            Self::Message(name) => f.write_str(name),
            Self::Repeated(element) => write!(f, "repeated {}", element),
            Self::PackedRepeated(element) => write!(f, "repeated {} [packed]", element),
        }
    }
}

/// One field of a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldDescriptor {
    pub name: String,
    pub tag: u32,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, tag: u32, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            tag,
            kind,
        }
    }

    /// Value observed when the field is absent. `None` for singular
    /// messages, whose default is absence.
    pub fn default_value(&self) -> Option<Value> {
        match &self.kind {
            FieldKind::Scalar(scalar) => Some(scalar.default_value()),
            FieldKind::Message(_) => None,
            FieldKind::Repeated(_) | FieldKind::PackedRepeated(_) => Some(Value::List(Vec::new())),
        }
    }
}

/// Inclusive tag range excluded by a `reserved` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReservedRange {
    pub start: u32,
    pub end: u32,
}

impl ReservedRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, tag: u32) -> bool {
        (self.start..=self.end).contains(&tag)
    }
}

/// Validated description of one message type.
///
/// Field lookup by tag and by name is O(1).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MessageDescriptor {
    full_name: String,
    fields: Vec<FieldDescriptor>,
    reserved_ranges: Vec<ReservedRange>,
    reserved_names: Vec<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    by_tag: HashMap<u32, usize>,
    #[cfg_attr(feature = "serde", serde(skip))]
    by_name: HashMap<String, usize>,
}

impl MessageDescriptor {
    /// Start a validated descriptor for `full_name`.
    pub fn builder(full_name: impl Into<String>) -> MessageDescriptorBuilder {
        MessageDescriptorBuilder::new(full_name)
    }

    /// Assemble a descriptor whose fields were validated elsewhere.
    ///
    /// Used by `#[derive(Message)]`, which checks tags and names at compile time.
    #[doc(hidden)]
    pub fn new_unchecked(full_name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        let descriptor = Self::assemble(full_name.into(), fields, Vec::new(), Vec::new());
        debug_assert_eq!(descriptor.by_tag.len(), descriptor.fields.len(), "duplicate tag");
        debug_assert_eq!(descriptor.by_name.len(), descriptor.fields.len(), "duplicate name");
        descriptor
    }

    pub(crate) fn assemble(
        full_name: String,
        fields: Vec<FieldDescriptor>,
        reserved_ranges: Vec<ReservedRange>,
        reserved_names: Vec<String>,
    ) -> Self {
        let by_tag = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.tag, index))
            .collect();
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name.clone(), index))
            .collect();
        Self {
            full_name,
            fields,
            reserved_ranges,
            reserved_names,
            by_tag,
            by_name,
        }
    }

    /// Fully-qualified name (`package.Outer.Inner`).
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Last segment of the full name.
    pub fn name(&self) -> &str {
        self.full_name
            .rsplit('.')
            .next()
            .unwrap_or(self.full_name.as_str())
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field_by_tag(&self, tag: u32) -> Option<&FieldDescriptor> {
        self.by_tag.get(&tag).map(|&index| &self.fields[index])
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&index| &self.fields[index])
    }

    pub fn reserved_ranges(&self) -> &[ReservedRange] {
        &self.reserved_ranges
    }

    pub fn reserved_names(&self) -> &[String] {
        &self.reserved_names
    }

    pub fn is_reserved_tag(&self, tag: u32) -> bool {
        self.reserved_ranges.iter().any(|range| range.contains(tag))
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name
            && self.fields == other.fields
            && self.reserved_ranges == other.reserved_ranges
            && self.reserved_names == other.reserved_names
    }
}

impl Eq for MessageDescriptor {}

/// One named enum constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

impl EnumValue {
    pub fn new(name: impl Into<String>, number: i32) -> Self {
        Self {
            name: name.into(),
            number,
        }
    }
}

/// Validated description of one enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnumDescriptor {
    full_name: String,
    values: Vec<EnumValue>,
    allow_alias: bool,
}

impl EnumDescriptor {
    pub fn builder(full_name: impl Into<String>) -> EnumDescriptorBuilder {
        EnumDescriptorBuilder::new(full_name)
    }

    pub(crate) fn assemble(full_name: String, values: Vec<EnumValue>, allow_alias: bool) -> Self {
        Self {
            full_name,
            values,
            allow_alias,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn name(&self) -> &str {
        self.full_name
            .rsplit('.')
            .next()
            .unwrap_or(self.full_name.as_str())
    }

    /// Values in declaration order; the first one is the default (0).
    pub fn values(&self) -> &[EnumValue] {
        &self.values
    }

    pub fn allow_alias(&self) -> bool {
        self.allow_alias
    }

    pub fn value_by_name(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|value| value.name == name)
    }

    /// First value declared with `number` (aliases resolve to the first).
    pub fn value_by_number(&self, number: i32) -> Option<&EnumValue> {
        self.values.iter().find(|value| value.number == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_properties() {
        assert!(ScalarType::Int32.is_packable());
        assert!(ScalarType::Enum("a.E".into()).is_packable());
        assert!(!ScalarType::String.is_packable());
        assert!(!ScalarType::Bytes.is_packable());
        assert_eq!(ScalarType::Float.fixed_width(), Some(4));
        assert_eq!(ScalarType::SFixed64.fixed_width(), Some(8));
        assert_eq!(ScalarType::SInt64.fixed_width(), None);
        assert_eq!(ScalarType::from_keyword("sfixed32"), Some(ScalarType::SFixed32));
        assert_eq!(ScalarType::from_keyword("Person"), None);
    }

    #[test]
    fn test_field_defaults() {
        let scalar = FieldDescriptor::new("id", 1, FieldKind::Scalar(ScalarType::Int32));
        assert_eq!(scalar.default_value(), Some(Value::I32(0)));

        let nested = FieldDescriptor::new("address", 2, FieldKind::Message("t.Address".into()));
        assert_eq!(nested.default_value(), None);

        let list = FieldDescriptor::new(
            "xs",
            3,
            FieldKind::PackedRepeated(ElementType::Scalar(ScalarType::Int32)),
        );
        assert_eq!(list.default_value(), Some(Value::List(Vec::new())));
    }

    #[test]
    fn test_lookup_by_tag_and_name() {
        let descriptor = MessageDescriptor::new_unchecked(
            "t.Person",
            vec![
                FieldDescriptor::new("name", 1, FieldKind::Scalar(ScalarType::String)),
                FieldDescriptor::new("age", 2, FieldKind::Scalar(ScalarType::Int32)),
            ],
        );
        assert_eq!(descriptor.name(), "Person");
        assert_eq!(descriptor.field_by_tag(2).map(|f| f.name.as_str()), Some("age"));
        assert_eq!(descriptor.field_by_name("name").map(|f| f.tag), Some(1));
        assert!(descriptor.field_by_tag(3).is_none());
    }
}
