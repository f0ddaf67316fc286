// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

pub mod rust_backend;

pub use rust_backend::{emit_module, field_ident, rust_type_name};
