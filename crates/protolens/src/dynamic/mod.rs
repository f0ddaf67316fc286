// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic (reflection) messages.
//!
//! Schema-driven counterparts of the typed API: [`DynamicMessage`] instances
//! built against a [`Schema`](crate::schema::Schema), the [`encode`] /
//! [`decode`] codec producing the same bytes as typed messages,
//! [`DynamicLens`] field paths, text-format `Display` and [`FieldDiff`].

mod codec;
mod error;
mod lens;
mod message;
mod text;
mod value;

pub use codec::{decode, decode_with, encode, encode_to, merge_from};
pub use error::AccessorError;
pub use lens::DynamicLens;
pub use message::DynamicMessage;
pub use text::FieldDiff;
pub use value::Value;
