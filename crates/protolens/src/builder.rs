// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent construction of typed messages.

use crate::lens::Lens;
use crate::message::Message;

/// Builds a message starting from its defaults.
///
/// Every intermediate state is a valid message; `build` just hands it over.
///
/// ```
/// use protolens::{Builder, LensExt, Message, UnknownFields};
///
/// mod fields {
///     protolens::field_lenses!(address, city, name, tags);
/// }
///
/// #[derive(Debug, Clone, Default, PartialEq, Message)]
/// #[proto(name = "demo.Address")]
/// struct Address {
///     #[proto(tag = 1)]
///     city: String,
///     #[proto(unknown)]
///     unknown_fields: UnknownFields,
/// }
///
/// #[derive(Debug, Clone, Default, PartialEq, Message)]
/// #[proto(name = "demo.Person")]
/// struct Person {
///     #[proto(tag = 1)]
///     name: String,
///     #[proto(tag = 2)]
///     address: Option<Address>,
///     #[proto(tag = 3)]
///     tags: Vec<String>,
///     #[proto(unknown)]
///     unknown_fields: UnknownFields,
/// }
///
/// let person = Builder::<Person>::new()
///     .set(fields::name, "Ada")
///     .set(fields::address.then(fields::city), "London")
///     .push(fields::tags, "maths")
///     .build();
///
/// assert_eq!(person.address.as_ref().map(|a| a.city.as_str()), Some("London"));
/// assert_eq!(person.tags, ["maths"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Builder<M: Message> {
    message: M,
}

impl<M: Message> Builder<M> {
    pub fn new() -> Self {
        Self {
            message: M::default(),
        }
    }

    /// Continue from an existing message.
    pub fn from_message(message: M) -> Self {
        Self { message }
    }

    /// Set the field focused by `lens`.
    pub fn set<L>(mut self, lens: L, value: impl Into<L::Target>) -> Self
    where
        L: Lens<M>,
    {
        *lens.view_mut(&mut self.message) = value.into();
        self
    }

    /// Update the field focused by `lens` in place.
    pub fn modify<L>(mut self, lens: L, f: impl FnOnce(&mut L::Target)) -> Self
    where
        L: Lens<M>,
    {
        f(lens.view_mut(&mut self.message));
        self
    }

    /// Append to a repeated field.
    pub fn push<L, T>(mut self, lens: L, value: impl Into<T>) -> Self
    where
        L: Lens<M, Target = Vec<T>>,
    {
        lens.view_mut(&mut self.message).push(value.into());
        self
    }

    /// Inspect the message being built.
    pub fn peek(&self) -> &M {
        &self.message
    }

    pub fn build(self) -> M {
        self.message
    }
}

impl<M: Message> Default for Builder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Message> From<M> for Builder<M> {
    fn from(message: M) -> Self {
        Self::from_message(message)
    }
}

/// Build a message by running `f` on a fresh [`Builder`].
pub fn build<M: Message>(f: impl FnOnce(Builder<M>) -> Builder<M>) -> M {
    f(Builder::new()).build()
}
