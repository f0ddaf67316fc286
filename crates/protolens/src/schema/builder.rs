// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent, validating builders for message and enum descriptors.

use super::descriptor::{
    ElementType, EnumDescriptor, EnumValue, FieldDescriptor, FieldKind, MessageDescriptor,
    ReservedRange, ScalarType,
};
use super::error::SchemaError;
use crate::wire::{is_valid_tag, MAX_TAG};
use std::collections::{HashMap, HashSet};

/// Builder for [`MessageDescriptor`].
///
/// ```
/// use protolens::schema::{MessageDescriptor, ScalarType};
///
/// let person = MessageDescriptor::builder("tutorial.Person")
///     .field("name", 1, ScalarType::String)
///     .field("age", 2, ScalarType::Int32)
///     .message("address", 3, "tutorial.Address")
///     .build()
///     .unwrap();
/// assert_eq!(person.fields().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MessageDescriptorBuilder {
    full_name: String,
    fields: Vec<FieldDescriptor>,
    reserved_ranges: Vec<ReservedRange>,
    reserved_names: Vec<String>,
}

impl MessageDescriptorBuilder {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            fields: Vec::new(),
            reserved_ranges: Vec::new(),
            reserved_names: Vec::new(),
        }
    }

    /// Add a singular scalar (or enum) field.
    pub fn field(self, name: impl Into<String>, tag: u32, scalar: ScalarType) -> Self {
        self.with_field(FieldDescriptor::new(name, tag, FieldKind::Scalar(scalar)))
    }

    /// Add a singular nested message field.
    pub fn message(self, name: impl Into<String>, tag: u32, type_name: impl Into<String>) -> Self {
        self.with_field(FieldDescriptor::new(
            name,
            tag,
            FieldKind::Message(type_name.into()),
        ))
    }

    /// Add an unpacked repeated field.
    pub fn repeated(self, name: impl Into<String>, tag: u32, element: ElementType) -> Self {
        self.with_field(FieldDescriptor::new(
            name,
            tag,
            FieldKind::Repeated(element),
        ))
    }

    /// Add a packed repeated scalar field.
    pub fn packed(self, name: impl Into<String>, tag: u32, scalar: ScalarType) -> Self {
        self.with_field(FieldDescriptor::new(
            name,
            tag,
            FieldKind::PackedRepeated(ElementType::Scalar(scalar)),
        ))
    }

    /// Add a prepared field descriptor.
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Reserve `start..=end`. Use [`MAX_TAG`] for `to max`.
    pub fn reserved_range(mut self, start: u32, end: u32) -> Self {
        self.reserved_ranges.push(ReservedRange::new(start, end));
        self
    }

    pub fn reserved_name(mut self, name: impl Into<String>) -> Self {
        self.reserved_names.push(name.into());
        self
    }

    /// Validate and produce the descriptor.
    ///
    /// Type references are checked later, when the descriptor joins a
    /// [`Schema`](super::Schema).
    pub fn build(self) -> Result<MessageDescriptor, SchemaError> {
        let message = &self.full_name;

        for range in &self.reserved_ranges {
            if range.start == 0 || range.start > range.end || range.end > MAX_TAG {
                return Err(SchemaError::InvalidReservedRange {
                    message: message.clone(),
                    start: range.start,
                    end: range.end,
                });
            }
        }

        let mut tags: HashMap<u32, &str> = HashMap::with_capacity(self.fields.len());
        let mut names: HashSet<&str> = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !is_valid_tag(field.tag) {
                return Err(SchemaError::InvalidTag {
                    message: message.clone(),
                    field: field.name.clone(),
                    tag: i64::from(field.tag),
                });
            }
            if self.reserved_ranges.iter().any(|r| r.contains(field.tag)) {
                return Err(SchemaError::ReservedTag {
                    message: message.clone(),
                    field: field.name.clone(),
                    tag: field.tag,
                });
            }
            if self.reserved_names.iter().any(|n| *n == field.name) {
                return Err(SchemaError::ReservedName {
                    message: message.clone(),
                    field: field.name.clone(),
                });
            }
            if let Some(first) = tags.insert(field.tag, &field.name) {
                return Err(SchemaError::DuplicateTag {
                    message: message.clone(),
                    tag: field.tag,
                    first: first.to_owned(),
                    second: field.name.clone(),
                });
            }
            if !names.insert(&field.name) {
                return Err(SchemaError::DuplicateFieldName {
                    message: message.clone(),
                    name: field.name.clone(),
                });
            }
            if let FieldKind::PackedRepeated(element) = &field.kind {
                if !element.is_packable() {
                    return Err(SchemaError::InvalidPacked {
                        message: message.clone(),
                        field: field.name.clone(),
                        element: element.to_string(),
                    });
                }
            }
        }

        Ok(MessageDescriptor::assemble(
            self.full_name,
            self.fields,
            self.reserved_ranges,
            self.reserved_names,
        ))
    }
}

/// Builder for [`EnumDescriptor`].
#[derive(Debug, Clone)]
pub struct EnumDescriptorBuilder {
    full_name: String,
    values: Vec<EnumValue>,
    allow_alias: bool,
}

impl EnumDescriptorBuilder {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            values: Vec::new(),
            allow_alias: false,
        }
    }

    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValue::new(name, number));
        self
    }

    /// Permit several names for one number.
    pub fn allow_alias(mut self, allow: bool) -> Self {
        self.allow_alias = allow;
        self
    }

    pub fn build(self) -> Result<EnumDescriptor, SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidEnum {
            name: self.full_name.clone(),
            reason,
        };

        match self.values.first() {
            None => return Err(invalid("no values".to_owned())),
            Some(first) if first.number != 0 => {
                return Err(invalid(format!(
                    "first value '{}' must be 0, found {}",
                    first.name, first.number
                )))
            }
            Some(_) => {}
        }

        let mut names = HashSet::with_capacity(self.values.len());
        let mut numbers = HashSet::with_capacity(self.values.len());
        for value in &self.values {
            if !names.insert(value.name.as_str()) {
                return Err(invalid(format!("duplicate value name '{}'", value.name)));
            }
            if !numbers.insert(value.number) && !self.allow_alias {
                return Err(invalid(format!(
                    "value '{}' reuses number {} without allow_alias",
                    value.name, value.number
                )));
            }
        }

        Ok(EnumDescriptor::assemble(
            self.full_name,
            self.values,
            self.allow_alias,
        ))
    }
}
