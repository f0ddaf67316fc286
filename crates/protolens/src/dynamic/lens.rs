// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime lenses addressing a field path by name.

use super::{AccessorError, DynamicMessage, Value};
use crate::schema::{FieldDescriptor, MessageDescriptor, Schema};

/// A field path validated against descriptors at construction.
///
/// Misuse that the typed lenses reject at compile time (unknown field,
/// composing through a non-message) is reported here as [`AccessorError`]
/// when the lens is built; value type errors surface on `set`.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicLens {
    root: String,
    path: Vec<FieldDescriptor>,
    target: FieldDescriptor,
}

impl DynamicLens {
    /// Lens on field `name` of `descriptor`.
    pub fn new(descriptor: &MessageDescriptor, name: &str) -> Result<Self, AccessorError> {
        let target = lookup(descriptor, name)?.clone();
        Ok(Self {
            root: descriptor.full_name().to_owned(),
            path: Vec::new(),
            target,
        })
    }

    /// Focus on field `name` of the message this lens points at.
    pub fn then(mut self, schema: &Schema, name: &str) -> Result<Self, AccessorError> {
        let nested = self.nested_type()?;
        let descriptor = schema
            .message(nested)
            .ok_or_else(|| AccessorError::UnknownMessageType(nested.to_owned()))?;
        let target = lookup(descriptor, name)?.clone();
        self.path.push(std::mem::replace(&mut self.target, target));
        Ok(self)
    }

    /// Append `inner`, whose root must be the message this lens points at.
    pub fn compose(mut self, inner: DynamicLens) -> Result<Self, AccessorError> {
        let nested = self.nested_type()?;
        if nested != inner.root {
            return Err(AccessorError::WrongMessageType {
                expected: nested.to_owned(),
                found: inner.root,
            });
        }
        self.path.push(self.target);
        self.path.extend(inner.path);
        self.target = inner.target;
        Ok(self)
    }

    /// Message type this lens applies to.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn target(&self) -> &FieldDescriptor {
        &self.target
    }

    /// Dotted field path, e.g. `address.street`.
    pub fn path(&self) -> String {
        self.path
            .iter()
            .chain(std::iter::once(&self.target))
            .map(|field| field.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Value at the path; absent intermediate messages read as defaults.
    pub fn get(&self, message: &DynamicMessage) -> Result<Value, AccessorError> {
        self.check_root(message)?;
        let mut current = message;
        for step in &self.path {
            match current.stored(step.tag) {
                Some(Value::Message(nested)) => current = &**nested,
                _ => return self.absent_default(message),
            }
        }
        current.value_of(&self.target)
    }

    /// `message` with the focus replaced, materialising the path.
    pub fn set(
        &self,
        mut message: DynamicMessage,
        value: impl Into<Value>,
    ) -> Result<DynamicMessage, AccessorError> {
        self.check_root(&message)?;
        let mut current = &mut message;
        for step in &self.path {
            current = current.nested_mut(step)?;
        }
        current.set_field(&self.target, value.into())?;
        Ok(message)
    }

    /// `message` with `f` applied to the focus.
    pub fn modify(
        &self,
        message: DynamicMessage,
        f: impl FnOnce(Value) -> Value,
    ) -> Result<DynamicMessage, AccessorError> {
        let value = self.get(&message)?;
        self.set(message, f(value))
    }

    fn nested_type(&self) -> Result<&str, AccessorError> {
        self.target
            .kind
            .message_type()
            .ok_or_else(|| AccessorError::NotAMessage {
                field: self.target.name.clone(),
            })
    }

    fn check_root(&self, message: &DynamicMessage) -> Result<(), AccessorError> {
        if message.type_name() == self.root {
            Ok(())
        } else {
            Err(AccessorError::WrongMessageType {
                expected: self.root.clone(),
                found: message.type_name().to_owned(),
            })
        }
    }

    fn absent_default(&self, message: &DynamicMessage) -> Result<Value, AccessorError> {
        match self.target.kind.message_type() {
            Some(type_name) => Ok(Value::from(message.empty_nested(type_name)?)),
            None => Ok(self
                .target
                .default_value()
                .unwrap_or(Value::List(Vec::new()))),
        }
    }
}

fn lookup<'a>(descriptor: &'a MessageDescriptor, name: &str) -> Result<&'a FieldDescriptor, AccessorError> {
    descriptor
        .field_by_name(name)
        .ok_or_else(|| AccessorError::UnknownField {
            message: descriptor.full_name().to_owned(),
            field: name.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn schema() -> Arc<Schema> {
        Schema::parse(
            r#"
            syntax = "proto3";
            package t;
            message Address { string street = 1; string city = 2; }
            message Person { string name = 1; int32 age = 2; Address address = 3; }
            "#,
        )
        .expect("schema")
    }

    fn person_lens(schema: &Arc<Schema>, name: &str) -> DynamicLens {
        let person = schema.message("t.Person").expect("person");
        DynamicLens::new(person, name).expect("lens")
    }

    #[test]
    fn test_get_through_absent_nested() {
        let schema = schema();
        let street = person_lens(&schema, "address")
            .then(&schema, "street")
            .expect("street");
        assert_eq!(street.path(), "address.street");

        let person = DynamicMessage::new(&schema, "t.Person").expect("person");
        assert_eq!(street.get(&person), Ok(Value::String(String::new())));
    }

    #[test]
    fn test_set_leaves_siblings() {
        let schema = schema();
        let city = person_lens(&schema, "address")
            .then(&schema, "city")
            .expect("city");
        let street = person_lens(&schema, "address")
            .then(&schema, "street")
            .expect("street");

        let person = DynamicMessage::new(&schema, "t.Person")
            .and_then(|p| p.with("name", "Ada"))
            .and_then(|p| street.set(p, "Old Rd"))
            .expect("person");
        let moved = city.set(person.clone(), "London").expect("set");

        assert_eq!(city.get(&moved), Ok(Value::from("London")));
        assert_eq!(street.get(&moved), Ok(Value::from("Old Rd")));
        assert_eq!(moved.get("name"), Ok(Value::from("Ada")));
        assert_eq!(city.get(&person), Ok(Value::from("")));
    }

    #[test]
    fn test_compose_and_modify() {
        let schema = schema();
        let address = schema.message("t.Address").expect("address");
        let street = person_lens(&schema, "address")
            .compose(DynamicLens::new(address, "street").expect("street"))
            .expect("composed");
        let person = DynamicMessage::new(&schema, "t.Person").expect("person");
        let person = street.set(person, "main st").expect("set");
        let person = street
            .modify(person, |v| Value::from(v.as_str().unwrap_or_default().to_uppercase()))
            .expect("modify");
        assert_eq!(street.get(&person), Ok(Value::from("MAIN ST")));
    }

    #[test]
    fn test_construction_errors() {
        let schema = schema();
        let person = schema.message("t.Person").expect("person");
        assert!(matches!(
            DynamicLens::new(person, "nope"),
            Err(AccessorError::UnknownField { .. })
        ));
        assert!(matches!(
            person_lens(&schema, "name").then(&schema, "street"),
            Err(AccessorError::NotAMessage { .. })
        ));
        assert!(matches!(
            person_lens(&schema, "address").then(&schema, "nope"),
            Err(AccessorError::UnknownField { .. })
        ));
        assert!(matches!(
            person_lens(&schema, "address").compose(person_lens(&schema, "name")),
            Err(AccessorError::WrongMessageType { .. })
        ));
    }

    #[test]
    fn test_type_mismatch_on_set() {
        let schema = schema();
        let age = person_lens(&schema, "age");
        let person = DynamicMessage::new(&schema, "t.Person").expect("person");
        assert!(matches!(
            age.set(person, "old"),
            Err(AccessorError::TypeMismatch { .. })
        ));

        let address = DynamicMessage::new(&schema, "t.Address").expect("address");
        assert!(matches!(
            age.get(&address),
            Err(AccessorError::WrongMessageType { .. })
        ));
    }
}
