// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema validation failures.

use thiserror::Error;

/// A schema (text or builder input) that cannot produce descriptors.
///
/// Always fatal for the schema being loaded; no partial descriptor escapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("unsupported construct '{construct}' at line {line}")]
    Unsupported { construct: String, line: usize },
    #[error("{message}: tag {tag} used by both '{first}' and '{second}'")]
    DuplicateTag {
        message: String,
        tag: u32,
        first: String,
        second: String,
    },
    #[error("{message}: duplicate field name '{name}'")]
    DuplicateFieldName { message: String, name: String },
    #[error("{message}.{field}: invalid tag {tag}")]
    InvalidTag {
        message: String,
        field: String,
        tag: i64,
    },
    #[error("{message}.{field}: tag {tag} is reserved")]
    ReservedTag {
        message: String,
        field: String,
        tag: u32,
    },
    #[error("{message}: field name '{field}' is reserved")]
    ReservedName { message: String, field: String },
    #[error("{message}: invalid reserved range {start} to {end}")]
    InvalidReservedRange { message: String, start: u32, end: u32 },
    #[error("{message}.{field}: '{element}' cannot be packed")]
    InvalidPacked {
        message: String,
        field: String,
        element: String,
    },
    #[error("type '{0}' is defined more than once")]
    DuplicateTypeName(String),
    #[error("{message}.{field}: unresolved type '{type_name}'")]
    UnresolvedType {
        message: String,
        field: String,
        type_name: String,
    },
    #[error("{message}.{field}: '{type_name}' is not a {expected}")]
    TypeKindMismatch {
        message: String,
        field: String,
        type_name: String,
        expected: &'static str,
    },
    #[error("enum {name}: {reason}")]
    InvalidEnum { name: String, reason: String },
}
