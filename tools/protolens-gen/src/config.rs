// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generator configuration (`gen.yaml`).
//!
//! ```yaml
//! extra_derives: [Hash]
//! fields_module: fields
//! header: |
//!   // @generated by protolens-gen {{ version }} from {{ source }}
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default file header; a Tera template with `source`, `package` and `version`.
pub const DEFAULT_HEADER: &str = "// @generated by protolens-gen {{ version }} from {{ source }}. Do not edit.\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// Derives added to every generated struct, after the built-in ones.
    pub extra_derives: Vec<String>,
    /// Module holding the field lens markers.
    pub fields_module: String,
    /// Tera template rendered at the top of the output.
    pub header: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            extra_derives: Vec::new(),
            fields_module: "fields".to_string(),
            header: DEFAULT_HEADER.to_string(),
        }
    }
}

impl GenConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("invalid generator config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("loading config {}", path.display()))
    }

    /// Command-line flags win over the file.
    #[must_use]
    pub fn with_overrides(mut self, fields_module: Option<String>, derives: &[String]) -> Self {
        if let Some(module) = fields_module {
            self.fields_module = module;
        }
        self.extra_derives.extend(derives.iter().cloned());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !is_rust_ident(&self.fields_module) {
            bail!("fields_module '{}' is not a Rust identifier", self.fields_module);
        }
        for derive in &self.extra_derives {
            if derive.is_empty() || !derive.split("::").all(|part| part.is_empty() || is_rust_ident(part)) {
                bail!("extra derive '{}' is not a Rust path", derive);
            }
        }
        Ok(())
    }
}

fn is_rust_ident(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
