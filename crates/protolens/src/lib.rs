// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # protolens
//!
//! Schema-driven protobuf messages with composable field accessors.
//!
//! - [`schema`]: descriptors, a validating builder and a `.proto` parser.
//! - [`wire`] / [`encoding`]: the binary format, packed and unpacked
//!   repeated fields, unknown-field passthrough.
//! - [`Message`] and `#[derive(Message)]`: strongly-typed records.
//! - [`lens`]: `HasField`-based lenses shared across message types.
//! - [`Builder`]: fluent construction from defaults.
//! - [`dynamic`]: reflection messages, codec, lenses, text format and diff.
//!
//! ## Quick Start
//!
//! ```
//! use protolens::{lens, LensExt, Message};
//!
//! mod fields {
//!     protolens::field_lenses!(name, id, address, city);
//! }
//!
//! #[derive(Debug, Clone, Default, PartialEq, Message)]
//! #[proto(name = "tutorial.Address")]
//! struct Address {
//!     #[proto(tag = 1)]
//!     city: String,
//!     #[proto(unknown)]
//!     unknown_fields: protolens::UnknownFields,
//! }
//!
//! #[derive(Debug, Clone, Default, PartialEq, Message)]
//! #[proto(name = "tutorial.Person")]
//! struct Person {
//!     #[proto(tag = 1)]
//!     name: String,
//!     #[proto(tag = 2)]
//!     id: i32,
//!     #[proto(tag = 3)]
//!     address: Option<Address>,
//!     #[proto(unknown)]
//!     unknown_fields: protolens::UnknownFields,
//! }
//!
//! let person = protolens::Builder::<Person>::new()
//!     .set(fields::name, "Ada")
//!     .set(fields::id, 1)
//!     .set(fields::address.then(fields::city), "London")
//!     .build();
//!
//! let bytes = person.encode_to_vec();
//! let decoded = Person::decode(&bytes).unwrap();
//! assert_eq!(lens::get(fields::address.then(fields::city), &decoded), "London");
//! ```

// Lets `#[derive(Message)]` expand to `::protolens::` paths inside this crate.
extern crate self as protolens;

pub mod builder;
pub mod dynamic;
pub mod encoding;
pub mod lens;
pub mod message;
pub mod schema;
pub mod wire;

pub use builder::{build, Builder};
pub use dynamic::{AccessorError, DynamicLens, DynamicMessage, FieldDiff, Value};
pub use lens::{compose, get, modify, set, Compose, FieldLens, HasField, Lens, LensExt};
pub use message::{fields_of, DecodeContext, DecodeOptions, Message, MessageField};
pub use protolens_derive::Message;
pub use schema::{
    ElementType, EnumDescriptor, FieldDescriptor, FieldKind, MessageDescriptor, ScalarType,
    Schema, SchemaError, Syntax,
};
pub use wire::{DecodeError, UnknownField, UnknownFields, WireType};

/// Re-exports used by `#[derive(Message)]` expansions.
#[doc(hidden)]
pub mod __private {
    pub use crate::encoding::*;
    pub use std::sync::OnceLock;
}
