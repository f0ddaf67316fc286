// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Schema model: message, field and enum descriptors.
//!
//! Descriptors come from three places:
//!
//! - [`MessageDescriptor::builder`] / [`EnumDescriptor::builder`] for
//!   hand-built schemas,
//! - [`Schema::parse`] for `.proto` text,
//! - `#[derive(Message)]`, which validates tags at compile time and exposes
//!   the descriptor through [`Message::descriptor`](crate::Message::descriptor).
//!
//! Descriptors are immutable once built and shared process-wide.

mod builder;
mod descriptor;
mod error;
mod parser;
mod registry;

pub use builder::{EnumDescriptorBuilder, MessageDescriptorBuilder};
pub use descriptor::{
    ElementType, EnumDescriptor, EnumValue, FieldDescriptor, FieldKind, MessageDescriptor,
    ReservedRange, ScalarType,
};
pub use error::SchemaError;
pub use registry::{Schema, SchemaBuilder, Syntax};
