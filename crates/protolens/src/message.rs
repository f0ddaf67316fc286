// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The typed message contract implemented by `#[derive(Message)]`.

use crate::schema::{FieldDescriptor, MessageDescriptor};
use crate::wire::{DecodeError, UnknownField, UnknownFields, WireReader, WireType};
use std::fmt;

/// Default nesting limit for decoding.
pub const DEFAULT_RECURSION_LIMIT: u32 = 100;

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum depth of nested messages.
    pub recursion_limit: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl DecodeOptions {
    #[must_use]
    pub fn with_recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }
}

/// Per-level decoding state threaded through nested messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeContext {
    depth: u32,
    limit: u32,
}

impl DecodeContext {
    pub fn new(options: &DecodeOptions) -> Self {
        Self {
            depth: 0,
            limit: options.recursion_limit,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Context for one nesting level deeper.
    pub fn enter(self) -> Result<Self, DecodeError> {
        if self.depth >= self.limit {
            return Err(DecodeError::RecursionLimitExceeded { limit: self.limit });
        }
        Ok(Self {
            depth: self.depth + 1,
            limit: self.limit,
        })
    }
}

impl Default for DecodeContext {
    fn default() -> Self {
        Self::new(&DecodeOptions::default())
    }
}

/// A strongly-typed protobuf message.
///
/// Implementations are generated by `#[derive(protolens::Message)]`; the
/// provided methods implement the codec on top of the generated field hooks.
///
/// Tags and proto field names must be unique within a message:
///
/// ```compile_fail
/// mod fields {
///     protolens::field_lenses!(first, second);
/// }
///
/// #[derive(Debug, Clone, Default, PartialEq, protolens::Message)]
/// struct Clash {
///     #[proto(tag = 1, name = "a")]
///     first: i32,
///     #[proto(tag = 2, name = "a")]
///     second: i32,
///     #[proto(unknown)]
///     unknown_fields: protolens::UnknownFields,
/// }
/// ```
///
/// ```compile_fail
/// mod fields {
///     protolens::field_lenses!(first, second);
/// }
///
/// #[derive(Debug, Clone, Default, PartialEq, protolens::Message)]
/// struct Clash {
///     #[proto(tag = 1)]
///     first: i32,
///     #[proto(tag = 1)]
///     second: i32,
///     #[proto(unknown)]
///     unknown_fields: protolens::UnknownFields,
/// }
/// ```
pub trait Message: Default + Clone + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Fully-qualified type name (`package.Outer.Inner`).
    const TYPE_NAME: &'static str;

    /// Process-wide descriptor of this type.
    fn descriptor() -> &'static MessageDescriptor;

    /// Shared all-defaults instance.
    fn default_instance() -> &'static Self;

    /// Append every known non-default field, in declaration order.
    fn encode_fields(&self, buf: &mut Vec<u8>);

    /// Bytes `encode_fields` would append.
    fn fields_encoded_len(&self) -> usize;

    /// Merge one field whose key was just read.
    ///
    /// Returns `Ok(false)` when `tag` is not a field of this message.
    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        reader: &mut WireReader<'_>,
        ctx: DecodeContext,
    ) -> Result<bool, DecodeError>;

    fn unknown_fields(&self) -> &UnknownFields;

    fn unknown_fields_mut(&mut self) -> &mut UnknownFields;

    /// Append the full encoding (known fields, then unknown fields verbatim).
    fn encode_to(&self, buf: &mut Vec<u8>) {
        self.encode_fields(buf);
        self.unknown_fields().write_to(buf);
    }

    /// Size of the full encoding in bytes.
    fn encoded_len(&self) -> usize {
        self.fields_encoded_len() + self.unknown_fields().encoded_len()
    }

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_to(&mut buf);
        buf
    }

    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with(bytes, &DecodeOptions::default())
    }

    fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        message.merge_from(&mut WireReader::new(bytes), DecodeContext::new(options))?;
        Ok(message)
    }

    /// Merge every field remaining in `reader` into `self`.
    fn merge_from(
        &mut self,
        reader: &mut WireReader<'_>,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        while !reader.is_empty() {
            let start = reader.position();
            let (tag, wire_type) = reader.read_key()?;
            if !self.merge_field(tag, wire_type, reader, ctx)? {
                reader.skip_field(tag, wire_type)?;
                let raw = reader.consumed_since(start).to_vec();
                log::trace!(
                    "{}: retaining unknown field {} ({}, {} bytes)",
                    Self::TYPE_NAME,
                    tag,
                    wire_type,
                    raw.len()
                );
                self.unknown_fields_mut()
                    .push(UnknownField::new(tag, wire_type, raw));
            }
        }
        Ok(())
    }

    /// True when every field equals its default and nothing unknown is held.
    fn is_default(&self) -> bool {
        self == Self::default_instance()
    }
}

/// Storage of a singular nested message of type `M`: `Option<M>` or
/// `Option<Box<M>>`.
///
/// `M` is a trait parameter so the two storage impls never overlap.
pub trait MessageField<M: Message> {
    fn as_message(&self) -> Option<&M>;

    /// Materialise the nested message if absent.
    fn get_or_insert_default(&mut self) -> &mut M;

    /// The nested message, or the type's default instance when absent.
    fn view_or_default(&self) -> &M {
        self.as_message().unwrap_or_else(|| M::default_instance())
    }
}

impl<M: Message> MessageField<M> for Option<M> {
    fn as_message(&self) -> Option<&M> {
        self.as_ref()
    }

    fn get_or_insert_default(&mut self) -> &mut M {
        self.get_or_insert_with(M::default)
    }
}

impl<M: Message> MessageField<M> for Option<Box<M>> {
    fn as_message(&self) -> Option<&M> {
        self.as_deref()
    }

    fn get_or_insert_default(&mut self) -> &mut M {
        self.get_or_insert_with(Box::default)
    }
}

/// Ordered field descriptors of `M`, for generic tooling.
pub fn fields_of<M: Message>() -> &'static [FieldDescriptor] {
    M::descriptor().fields()
}
