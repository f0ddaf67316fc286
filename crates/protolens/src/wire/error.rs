// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decode failures.

use super::WireType;
use thiserror::Error;

/// Malformed wire bytes. Always recoverable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended inside a key, varint or payload.
    #[error("truncated input: need {needed} bytes, have {remaining}")]
    Truncated { needed: usize, remaining: usize },
    /// Varint longer than 10 bytes or overflowing 64 bits.
    #[error("invalid varint")]
    InvalidVarint,
    /// Wire type 6 or 7.
    #[error("invalid wire type {value}")]
    InvalidWireType { value: u8 },
    /// Tag 0 or above the 29-bit maximum.
    #[error("invalid field tag {tag}")]
    InvalidTag { tag: u64 },
    /// A known field arrived with a wire type its kind cannot have.
    #[error("field {tag}: expected wire type {expected}, found {found}")]
    WireTypeMismatch {
        tag: u32,
        expected: WireType,
        found: WireType,
    },
    /// Packed payload of fixed-width elements has a trailing partial element.
    #[error("field {tag}: packed length {length} is not a multiple of {width}")]
    PackedLengthMismatch { tag: u32, length: usize, width: usize },
    /// String field payload is not UTF-8.
    #[error("invalid UTF-8 in string field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// End-group key without a matching start-group.
    #[error("unexpected end-group for field {tag}")]
    UnexpectedEndGroup { tag: u32 },
    /// Message nesting (or group nesting) exceeded the configured limit.
    #[error("recursion limit of {limit} exceeded")]
    RecursionLimitExceeded { limit: u32 },
    /// Dynamic decode referenced a message type the schema does not define.
    #[error("unknown message type '{0}'")]
    UnknownMessageType(String),
}
