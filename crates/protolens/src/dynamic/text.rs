// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Text-format printing and reflection-based diffing.
//!
//! `{}` renders a message on one line (`name: "Ada" address { city: "Paris" }`),
//! `{:#}` renders one field per line with two-space indentation.

use super::{AccessorError, DynamicMessage, Value};
use crate::schema::{FieldDescriptor, FieldKind};
use std::fmt::{self, Write as _};

impl fmt::Display for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = if f.alternate() { Some(0) } else { None };
        write_fields(f, self, indent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{}", v),
            Self::I32(v) | Self::Enum(v) => write!(f, "{}", v),
            Self::I64(v) => write!(f, "{}", v),
            Self::U32(v) => write!(f, "{}", v),
            Self::U64(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{}", v),
            Self::F64(v) => write!(f, "{}", v),
            Self::String(v) => write_quoted(f, v.as_bytes()),
            Self::Bytes(v) => write_quoted(f, v),
            Self::Message(v) => write!(f, "{{ {} }}", v),
            Self::List(items) => {
                f.write_char('[')?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_char(']')
            }
        }
    }
}

/// `indent` is `None` for single-line output.
fn write_fields(f: &mut fmt::Formatter<'_>, message: &DynamicMessage, indent: Option<usize>) -> fmt::Result {
    let mut first = true;
    for (field, value) in message.present_fields() {
        let items: &[Value] = match value {
            Value::List(items) => items,
            single => std::slice::from_ref(single),
        };
        for item in items {
            match indent {
                Some(level) => write!(f, "{:width$}", "", width = level * 2)?,
                None if !first => f.write_char(' ')?,
                None => {}
            }
            first = false;
            write_entry(f, message, field, item, indent)?;
            if indent.is_some() {
                f.write_char('\n')?;
            }
        }
    }
    Ok(())
}

fn write_entry(
    f: &mut fmt::Formatter<'_>,
    message: &DynamicMessage,
    field: &FieldDescriptor,
    value: &Value,
    indent: Option<usize>,
) -> fmt::Result {
    match value {
        Value::Message(nested) => match indent {
            Some(level) => {
                writeln!(f, "{} {{", field.name)?;
                write_fields(f, nested, Some(level + 1))?;
                write!(f, "{:width$}}}", "", width = level * 2)
            }
            None if nested.is_empty() => write!(f, "{} {{}}", field.name),
            None => {
                write!(f, "{} {{ ", field.name)?;
                write_fields(f, nested, None)?;
                f.write_str(" }")
            }
        },
        Value::Enum(number) => {
            write!(f, "{}: ", field.name)?;
            match enum_value_name(message, field, *number) {
                Some(name) => f.write_str(name),
                None => write!(f, "{}", number),
            }
        }
        other => write!(f, "{}: {}", field.name, other),
    }
}

fn enum_value_name<'a>(message: &'a DynamicMessage, field: &FieldDescriptor, number: i32) -> Option<&'a str> {
    let enum_name = match field.kind.type_name() {
        Some(name) if !matches!(field.kind, FieldKind::Message(_)) => name,
        _ => return None,
    };
    let descriptor = message.schema().enum_type(enum_name)?;
    descriptor
        .value_by_number(number)
        .map(|value| value.name.as_str())
}

/// Quote with C-style escapes; non-printable bytes become octal.
fn write_quoted(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_char('"')?;
    match std::str::from_utf8(bytes) {
        Ok(text) => {
            for ch in text.chars() {
                match ch {
                    '"' => f.write_str("\\\"")?,
                    '\\' => f.write_str("\\\\")?,
                    '\n' => f.write_str("\\n")?,
                    '\r' => f.write_str("\\r")?,
                    '\t' => f.write_str("\\t")?,
                    c if c.is_control() => write!(f, "\\{:03o}", u32::from(c))?,
                    c => f.write_char(c)?,
                }
            }
        }
        Err(_) => {
            for &byte in bytes {
                match byte {
                    b'"' => f.write_str("\\\"")?,
                    b'\\' => f.write_str("\\\\")?,
                    0x20..=0x7E => f.write_char(char::from(byte))?,
                    _ => write!(f, "\\{:03o}", byte)?,
                }
            }
        }
    }
    f.write_char('"')
}

/// One differing field between two messages of the same type.
///
/// `None` means the field is unset (reads as its default).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDiff {
    /// Dotted path from the compared root, e.g. `address.city`.
    pub path: String,
    pub left: Option<Value>,
    pub right: Option<Value>,
}

impl fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |value: &Option<Value>| match value {
            Some(value) => value.to_string(),
            None => "<unset>".to_owned(),
        };
        write!(f, "{}: {} -> {}", self.path, side(&self.left), side(&self.right))
    }
}

impl DynamicMessage {
    /// Field-by-field differences, descending into nested messages present
    /// on both sides. Unknown fields are not compared.
    pub fn diff(&self, other: &DynamicMessage) -> Result<Vec<FieldDiff>, AccessorError> {
        if self.type_name() != other.type_name() {
            return Err(AccessorError::WrongMessageType {
                expected: self.type_name().to_owned(),
                found: other.type_name().to_owned(),
            });
        }
        let mut diffs = Vec::new();
        diff_into(self, other, "", &mut diffs);
        Ok(diffs)
    }
}

fn diff_into(left: &DynamicMessage, right: &DynamicMessage, prefix: &str, out: &mut Vec<FieldDiff>) {
    for field in left.descriptor().fields() {
        let path = if prefix.is_empty() {
            field.name.clone()
        } else {
            format!("{}.{}", prefix, field.name)
        };
        match (left.stored(field.tag), right.stored(field.tag)) {
            (Some(Value::Message(l)), Some(Value::Message(r))) => diff_into(l, r, &path, out),
            (l, r) if l != r => out.push(FieldDiff {
                path,
                left: l.cloned(),
                right: r.cloned(),
            }),
            _ => {}
        }
    }
}
