// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::wire::DecodeError;
use thiserror::Error;

/// Misuse of a dynamic accessor.
///
/// The typed API reports the same mistakes at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessorError {
    #[error("{message} has no field '{field}'")]
    UnknownField { message: String, field: String },
    #[error("field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: &'static str,
    },
    #[error("field '{field}' is not a singular message")]
    NotAMessage { field: String },
    #[error("expected a {expected} message, got {found}")]
    WrongMessageType { expected: String, found: String },
    #[error("schema has no message type '{0}'")]
    UnknownMessageType(String),
    #[error("re-decoding failed: {0}")]
    Decode(#[from] DecodeError),
}
