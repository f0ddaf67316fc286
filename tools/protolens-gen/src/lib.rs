// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rust code generation for protolens schemas.

pub mod codegen;
pub mod config;

pub use config::GenConfig;
