// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::Lens;
use std::fmt;

/// A lens built from a getter/setter pair supplied at the call site.
///
/// Useful for ad-hoc focuses that have no marker, such as a field of a
/// plain struct or a computed projection.
pub struct FieldLens<S, T> {
    name: &'static str,
    get: fn(&S) -> &T,
    get_mut: fn(&mut S) -> &mut T,
}

impl<S, T> FieldLens<S, T> {
    pub const fn new(name: &'static str, get: fn(&S) -> &T, get_mut: fn(&mut S) -> &mut T) -> Self {
        Self { name, get, get_mut }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<S, T> Clone for FieldLens<S, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, T> Copy for FieldLens<S, T> {}

impl<S, T> fmt::Debug for FieldLens<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldLens").field("name", &self.name).finish()
    }
}

impl<S, T> Lens<S> for FieldLens<S, T> {
    type Target = T;

    fn view<'a>(&self, source: &'a S) -> &'a T {
        (self.get)(source)
    }

    fn view_mut<'a>(&self, source: &'a mut S) -> &'a mut T {
        (self.get_mut)(source)
    }
}
