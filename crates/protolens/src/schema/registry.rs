// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Validated collection of message and enum descriptors.

use super::descriptor::{ElementType, EnumDescriptor, FieldKind, MessageDescriptor, ScalarType};
use super::error::SchemaError;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Schema language revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Syntax {
    /// Repeated scalars unpacked unless `[packed = true]`.
    #[default]
    Proto2,
    /// Repeated packable scalars packed unless `[packed = false]`.
    Proto3,
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Proto2 => "proto2",
            Self::Proto3 => "proto3",
        })
    }
}

/// Immutable, cross-reference-checked set of types keyed by full name.
///
/// Shared as `Arc<Schema>`; dynamic messages keep a handle to resolve
/// nested types.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Schema {
    package: Option<String>,
    syntax: Syntax,
    messages: Vec<Arc<MessageDescriptor>>,
    enums: Vec<Arc<EnumDescriptor>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    message_index: HashMap<String, usize>,
    #[cfg_attr(feature = "serde", serde(skip))]
    enum_index: HashMap<String, usize>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Parse and validate `.proto` source text.
    pub fn parse(source: &str) -> Result<Arc<Self>, SchemaError> {
        super::parser::parse(source)
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Messages in declaration order (outer before nested).
    pub fn messages(&self) -> &[Arc<MessageDescriptor>] {
        &self.messages
    }

    pub fn enums(&self) -> &[Arc<EnumDescriptor>] {
        &self.enums
    }

    /// Look up a message by fully-qualified name (a leading `.` is accepted).
    pub fn message(&self, full_name: &str) -> Option<&Arc<MessageDescriptor>> {
        let full_name = full_name.strip_prefix('.').unwrap_or(full_name);
        self.message_index
            .get(full_name)
            .map(|&index| &self.messages[index])
    }

    pub fn enum_type(&self, full_name: &str) -> Option<&Arc<EnumDescriptor>> {
        let full_name = full_name.strip_prefix('.').unwrap_or(full_name);
        self.enum_index.get(full_name).map(|&index| &self.enums[index])
    }
}

/// Collects descriptors and validates them as a whole.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    package: Option<String>,
    syntax: Syntax,
    messages: Vec<MessageDescriptor>,
    enums: Vec<EnumDescriptor>,
}

impl SchemaBuilder {
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn message(mut self, descriptor: MessageDescriptor) -> Self {
        self.messages.push(descriptor);
        self
    }

    pub fn enumeration(mut self, descriptor: EnumDescriptor) -> Self {
        self.enums.push(descriptor);
        self
    }

    /// Reject duplicate type names and dangling type references.
    pub fn build(self) -> Result<Arc<Schema>, SchemaError> {
        let mut message_index = HashMap::with_capacity(self.messages.len());
        let mut enum_index = HashMap::with_capacity(self.enums.len());

        for (index, message) in self.messages.iter().enumerate() {
            if message_index
                .insert(message.full_name().to_owned(), index)
                .is_some()
            {
                return Err(SchemaError::DuplicateTypeName(message.full_name().to_owned()));
            }
        }
        for (index, enumeration) in self.enums.iter().enumerate() {
            let name = enumeration.full_name();
            if message_index.contains_key(name)
                || enum_index.insert(name.to_owned(), index).is_some()
            {
                return Err(SchemaError::DuplicateTypeName(name.to_owned()));
            }
        }

        for message in &self.messages {
            for field in message.fields() {
                let Some((type_name, expected)) = referenced_type(&field.kind) else {
                    continue;
                };
                let is_message = message_index.contains_key(type_name);
                let is_enum = enum_index.contains_key(type_name);
                let resolved = match expected {
                    TypeRef::Message => is_message,
                    TypeRef::Enum => is_enum,
                };
                if resolved {
                    continue;
                }
                if is_message || is_enum {
                    return Err(SchemaError::TypeKindMismatch {
                        message: message.full_name().to_owned(),
                        field: field.name.clone(),
                        type_name: type_name.to_owned(),
                        expected: expected.as_str(),
                    });
                }
                return Err(SchemaError::UnresolvedType {
                    message: message.full_name().to_owned(),
                    field: field.name.clone(),
                    type_name: type_name.to_owned(),
                });
            }
            log::debug!(
                "[schema] registered message {} ({} fields)",
                message.full_name(),
                message.fields().len()
            );
        }
        for enumeration in &self.enums {
            log::debug!(
                "[schema] registered enum {} ({} values)",
                enumeration.full_name(),
                enumeration.values().len()
            );
        }

        Ok(Arc::new(Schema {
            package: self.package,
            syntax: self.syntax,
            messages: self.messages.into_iter().map(Arc::new).collect(),
            enums: self.enums.into_iter().map(Arc::new).collect(),
            message_index,
            enum_index,
        }))
    }
}

#[derive(Debug, Clone, Copy)]
enum TypeRef {
    Message,
    Enum,
}

impl TypeRef {
    fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Enum => "enum",
        }
    }
}

fn referenced_type(kind: &FieldKind) -> Option<(&str, TypeRef)> {
    let element = match kind {
        FieldKind::Scalar(ScalarType::Enum(name)) => return Some((name, TypeRef::Enum)),
        FieldKind::Message(name) => return Some((name, TypeRef::Message)),
        FieldKind::Scalar(_) => return None,
        FieldKind::Repeated(element) | FieldKind::PackedRepeated(element) => element,
    };
    match element {
        ElementType::Scalar(ScalarType::Enum(name)) => Some((name, TypeRef::Enum)),
        ElementType::Message(name) => Some((name, TypeRef::Message)),
        ElementType::Scalar(_) => None,
    }
}
