// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema-driven message instances.

use super::{AccessorError, Value};
use crate::message::Message;
use crate::schema::{ElementType, FieldDescriptor, FieldKind, MessageDescriptor, Schema, ScalarType};
use crate::wire::UnknownFields;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A message whose shape is known only at runtime.
///
/// Holds only explicitly set fields; an absent field reads as its default.
/// Setting a scalar to its default or a repeated field to an empty list
/// clears it, so the instance never distinguishes "default" from "unset"
/// for those kinds. Singular message fields track presence.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    schema: Arc<Schema>,
    descriptor: Arc<MessageDescriptor>,
    fields: BTreeMap<u32, Value>,
    unknown: UnknownFields,
}

impl DynamicMessage {
    /// Empty instance of `type_name` from `schema`.
    pub fn new(schema: &Arc<Schema>, type_name: &str) -> Result<Self, AccessorError> {
        let descriptor = schema
            .message(type_name)
            .ok_or_else(|| AccessorError::UnknownMessageType(type_name.to_owned()))?;
        Ok(Self::of(Arc::clone(schema), Arc::clone(descriptor)))
    }

    pub(crate) fn of(schema: Arc<Schema>, descriptor: Arc<MessageDescriptor>) -> Self {
        Self {
            schema,
            descriptor,
            fields: BTreeMap::new(),
            unknown: UnknownFields::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    pub(crate) fn shared_descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        self.descriptor.full_name()
    }

    pub fn unknown_fields(&self) -> &UnknownFields {
        &self.unknown
    }

    pub fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
        &mut self.unknown
    }

    /// True when no field is set and nothing unknown is held.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.unknown.is_empty()
    }

    /// Set fields in declaration order.
    pub fn present_fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.descriptor
            .fields()
            .iter()
            .filter_map(move |field| self.fields.get(&field.tag).map(|value| (field, value)))
    }

    pub fn field_descriptor(&self, name: &str) -> Result<&FieldDescriptor, AccessorError> {
        self.descriptor
            .field_by_name(name)
            .ok_or_else(|| AccessorError::UnknownField {
                message: self.type_name().to_owned(),
                field: name.to_owned(),
            })
    }

    /// Whether `name` is explicitly set.
    pub fn has(&self, name: &str) -> Result<bool, AccessorError> {
        let tag = self.field_descriptor(name)?.tag;
        Ok(self.fields.contains_key(&tag))
    }

    /// The explicitly set value of `name`, if any.
    pub fn field(&self, name: &str) -> Result<Option<&Value>, AccessorError> {
        let tag = self.field_descriptor(name)?.tag;
        Ok(self.fields.get(&tag))
    }

    /// Value of `name`, falling back to the field's default.
    ///
    /// An absent message field yields an empty instance of its type.
    pub fn get(&self, name: &str) -> Result<Value, AccessorError> {
        let field = self.field_descriptor(name)?.clone();
        self.value_of(&field)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AccessorError> {
        let field = self.field_descriptor(name)?.clone();
        self.set_field(&field, value.into())
    }

    /// Fluent [`set`](Self::set).
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, AccessorError> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn clear(&mut self, name: &str) -> Result<(), AccessorError> {
        let tag = self.field_descriptor(name)?.tag;
        self.fields.remove(&tag);
        Ok(())
    }

    /// Append to a repeated field.
    pub fn push(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AccessorError> {
        let field = self.field_descriptor(name)?.clone();
        let element = field
            .kind
            .element()
            .ok_or_else(|| AccessorError::TypeMismatch {
                field: field.name.clone(),
                expected: field.kind.to_string(),
                found: "list element",
            })?;
        let value = self.check_element(&field, element, value.into())?;
        match self
            .fields
            .entry(field.tag)
            .or_insert_with(|| Value::List(Vec::new()))
        {
            Value::List(items) => items.push(value),
            other => *other = Value::List(vec![value]),
        }
        Ok(())
    }

    /// Nested message `name`, materialised if absent.
    pub fn message_mut(&mut self, name: &str) -> Result<&mut DynamicMessage, AccessorError> {
        let field = self.field_descriptor(name)?.clone();
        self.nested_mut(&field)
    }

    /// Convert into a typed message via the wire format.
    pub fn to_message<M: Message>(&self) -> Result<M, AccessorError> {
        if self.type_name() != M::TYPE_NAME {
            return Err(AccessorError::WrongMessageType {
                expected: M::TYPE_NAME.to_owned(),
                found: self.type_name().to_owned(),
            });
        }
        Ok(M::decode(&self.encode())?)
    }

    /// Convert a typed message via the wire format.
    pub fn from_message<M: Message>(schema: &Arc<Schema>, message: &M) -> Result<Self, AccessorError> {
        if schema.message(M::TYPE_NAME).is_none() {
            return Err(AccessorError::UnknownMessageType(M::TYPE_NAME.to_owned()));
        }
        Ok(super::decode(schema, M::TYPE_NAME, &message.encode_to_vec())?)
    }

    pub fn encode(&self) -> Vec<u8> {
        super::encode(self)
    }

    pub(crate) fn stored(&self, tag: u32) -> Option<&Value> {
        self.fields.get(&tag)
    }

    pub(crate) fn stored_mut(&mut self) -> &mut BTreeMap<u32, Value> {
        &mut self.fields
    }

    /// Empty instance of a nested message type from the same schema.
    pub(crate) fn empty_nested(&self, type_name: &str) -> Result<DynamicMessage, AccessorError> {
        DynamicMessage::new(&self.schema, type_name)
    }

    pub(crate) fn value_of(&self, field: &FieldDescriptor) -> Result<Value, AccessorError> {
        if let Some(value) = self.fields.get(&field.tag) {
            return Ok(value.clone());
        }
        match &field.kind {
            FieldKind::Message(type_name) => Ok(Value::from(self.empty_nested(type_name)?)),
            _ => Ok(field.default_value().unwrap_or(Value::List(Vec::new()))),
        }
    }

    /// Validate and store; defaults and empty lists clear the field.
    pub(crate) fn set_field(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), AccessorError> {
        let value = match &field.kind {
            FieldKind::Scalar(scalar) => {
                let value = check_scalar(field, scalar, value)?;
                if value == scalar.default_value() {
                    self.fields.remove(&field.tag);
                    return Ok(());
                }
                value
            }
            FieldKind::Message(type_name) => check_message(field, type_name, value)?,
            FieldKind::Repeated(element) | FieldKind::PackedRepeated(element) => {
                let items = match value {
                    Value::List(items) => items,
                    other => {
                        return Err(AccessorError::TypeMismatch {
                            field: field.name.clone(),
                            expected: field.kind.to_string(),
                            found: other.kind_name(),
                        })
                    }
                };
                if items.is_empty() {
                    self.fields.remove(&field.tag);
                    return Ok(());
                }
                let items = items
                    .into_iter()
                    .map(|item| self.check_element(field, element, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Value::List(items)
            }
        };
        self.fields.insert(field.tag, value);
        Ok(())
    }

    pub(crate) fn nested_mut(&mut self, field: &FieldDescriptor) -> Result<&mut DynamicMessage, AccessorError> {
        let type_name = field
            .kind
            .message_type()
            .ok_or_else(|| AccessorError::NotAMessage {
                field: field.name.clone(),
            })?;
        if !matches!(self.fields.get(&field.tag), Some(Value::Message(_))) {
            let empty = self.empty_nested(type_name)?;
            self.fields.insert(field.tag, Value::from(empty));
        }
        match self.fields.get_mut(&field.tag) {
            Some(Value::Message(nested)) => Ok(nested),
            _ => Err(AccessorError::NotAMessage {
                field: field.name.clone(),
            }),
        }
    }

    fn check_element(
        &self,
        field: &FieldDescriptor,
        element: &ElementType,
        value: Value,
    ) -> Result<Value, AccessorError> {
        match element {
            ElementType::Scalar(scalar) => check_scalar(field, scalar, value),
            ElementType::Message(type_name) => check_message(field, type_name, value),
        }
    }
}

fn check_scalar(field: &FieldDescriptor, scalar: &ScalarType, value: Value) -> Result<Value, AccessorError> {
    match (scalar, value) {
        // Plain numbers are accepted for enum fields.
        (ScalarType::Enum(_), Value::I32(number)) => Ok(Value::Enum(number)),
        (scalar, value) if value.fits_scalar(scalar) => Ok(value),
        (scalar, value) => Err(AccessorError::TypeMismatch {
            field: field.name.clone(),
            expected: scalar.to_string(),
            found: value.kind_name(),
        }),
    }
}

fn check_message(field: &FieldDescriptor, type_name: &str, value: Value) -> Result<Value, AccessorError> {
    match value {
        Value::Message(message) if message.type_name() == type_name => Ok(Value::Message(message)),
        Value::Message(message) => Err(AccessorError::WrongMessageType {
            expected: type_name.to_owned(),
            found: message.type_name().to_owned(),
        }),
        other => Err(AccessorError::TypeMismatch {
            field: field.name.clone(),
            expected: type_name.to_owned(),
            found: other.kind_name(),
        }),
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.full_name() == other.descriptor.full_name()
            && self.fields == other.fields
            && self.unknown == other.unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Arc<Schema> {
        Schema::parse(
            r#"
            syntax = "proto3";
            package t;
            enum Kind { NONE = 0; SOME = 1; }
            message Address { string street = 1; string city = 2; }
            message Person {
              string name = 1;
              int32 age = 2;
              Address address = 3;
              repeated int32 scores = 4;
              Kind kind = 5;
              repeated Address previous = 6;
            }
            "#,
        )
        .expect("schema")
    }

    #[test]
    fn test_defaults_and_presence() {
        let schema = schema();
        let person = DynamicMessage::new(&schema, "t.Person").expect("person");
        assert!(person.is_empty());
        assert_eq!(person.get("name"), Ok(Value::String(String::new())));
        assert_eq!(person.get("scores"), Ok(Value::List(Vec::new())));
        let address = person.get("address").expect("address");
        assert_eq!(address.as_message().map(DynamicMessage::type_name), Some("t.Address"));
        assert_eq!(person.has("address"), Ok(false));
    }

    #[test]
    fn test_default_value_clears() {
        let schema = schema();
        let mut person = DynamicMessage::new(&schema, "t.Person")
            .and_then(|p| p.with("age", 5))
            .expect("person");
        assert_eq!(person.has("age"), Ok(true));
        person.set("age", 0).expect("set");
        assert_eq!(person.has("age"), Ok(false));

        person.set("scores", vec![Value::I32(1)]).expect("scores");
        person.set("scores", Vec::<Value>::new()).expect("clear");
        assert_eq!(person.has("scores"), Ok(false));
    }

    #[test]
    fn test_type_checks() {
        let schema = schema();
        let mut person = DynamicMessage::new(&schema, "t.Person").expect("person");
        assert!(matches!(
            person.set("age", "old"),
            Err(AccessorError::TypeMismatch { .. })
        ));
        assert!(matches!(
            person.set("missing", 1),
            Err(AccessorError::UnknownField { .. })
        ));
        let other = DynamicMessage::new(&schema, "t.Person").expect("person");
        assert!(matches!(
            person.set("address", other),
            Err(AccessorError::WrongMessageType { .. })
        ));
        assert!(matches!(
            person.push("scores", 1.5f64),
            Err(AccessorError::TypeMismatch { .. })
        ));
        assert!(matches!(
            person.message_mut("name"),
            Err(AccessorError::NotAMessage { .. })
        ));
    }

    #[test]
    fn test_enum_accepts_number() {
        let schema = schema();
        let person = DynamicMessage::new(&schema, "t.Person")
            .and_then(|p| p.with("kind", 1))
            .expect("person");
        assert_eq!(person.get("kind"), Ok(Value::Enum(1)));
    }

    #[test]
    fn test_nested_materialise_and_push() {
        let schema = schema();
        let mut person = DynamicMessage::new(&schema, "t.Person").expect("person");
        person
            .message_mut("address")
            .and_then(|a| a.set("city", "Paris"))
            .expect("city");
        assert_eq!(person.has("address"), Ok(true));

        let old = DynamicMessage::new(&schema, "t.Address")
            .and_then(|a| a.with("city", "Rome"))
            .expect("old");
        person.push("previous", old.clone()).expect("push");
        person.push("previous", old).expect("push");
        assert_eq!(
            person.get("previous").map(|v| v.as_list().map(<[Value]>::len)),
            Ok(Some(2))
        );
    }
}
