// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque storage for fields a descriptor does not know about.

use super::WireType;

/// One unrecognised field, kept as the exact bytes it arrived as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnknownField {
    tag: u32,
    wire_type: WireType,
    raw: Vec<u8>,
}

impl UnknownField {
    /// `raw` holds the key and the payload.
    pub fn new(tag: u32, wire_type: WireType, raw: Vec<u8>) -> Self {
        Self {
            tag,
            wire_type,
            raw,
        }
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

/// Unknown fields of one message, in arrival order.
///
/// Re-emitted verbatim after the known fields on encode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UnknownFields {
    fields: Vec<UnknownField>,
}

impl UnknownFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn push(&mut self, field: UnknownField) {
        self.fields.push(field);
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnknownField> {
        self.fields.iter()
    }

    /// All entries carrying `tag`.
    pub fn by_tag(&self, tag: u32) -> impl Iterator<Item = &UnknownField> {
        self.fields.iter().filter(move |f| f.tag == tag)
    }

    pub fn encoded_len(&self) -> usize {
        self.fields.iter().map(|f| f.raw.len()).sum()
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        for field in &self.fields {
            buf.extend_from_slice(&field.raw);
        }
    }
}

impl<'a> IntoIterator for &'a UnknownFields {
    type Item = &'a UnknownField;
    type IntoIter = std::slice::Iter<'a, UnknownField>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
