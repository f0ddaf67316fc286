// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Composable field accessors.
//!
//! A message type advertises each field through [`HasField<F>`], where `F` is
//! a zero-sized marker declared with [`field_lenses!`](crate::field_lenses).
//! Every marker is a [`Lens`] for any type that has the field, so one marker
//! (e.g. `fields::name`) addresses `name` on `Person`, `Pet` and any other
//! message declaring it. Using a marker on a type without that field does
//! not compile.
//!
//! ```
//! use protolens::lens::{self, HasField, LensExt};
//!
//! mod fields {
//!     protolens::field_lenses!(name, street, address);
//! }
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Address { street: String }
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Person { name: String, address: Address }
//!
//! impl HasField<fields::street> for Address {
//!     type Value = String;
//!     fn field(&self) -> &String { &self.street }
//!     fn field_mut(&mut self) -> &mut String { &mut self.street }
//! }
//! impl HasField<fields::address> for Person {
//!     type Value = Address;
//!     fn field(&self) -> &Address { &self.address }
//!     fn field_mut(&mut self) -> &mut Address { &mut self.address }
//! }
//!
//! let street = fields::address.then(fields::street);
//! let person = lens::set(street, Person::default(), "Main St");
//! assert_eq!(lens::get(street, &person), "Main St");
//! ```

mod field;

pub use field::FieldLens;

use std::mem;

/// Capability: the implementing message has a field named by marker `F`.
pub trait HasField<F> {
    type Value;

    fn field(&self) -> &Self::Value;

    fn field_mut(&mut self) -> &mut Self::Value;
}

/// A get/set pair focused on one `Target` inside `S`.
pub trait Lens<S> {
    type Target;

    fn view<'a>(&self, source: &'a S) -> &'a Self::Target;

    /// Mutable view. Absent nested messages are materialised.
    fn view_mut<'a>(&self, source: &'a mut S) -> &'a mut Self::Target;

    /// Replace the focus, returning the updated source.
    fn set(&self, mut source: S, value: Self::Target) -> S {
        *self.view_mut(&mut source) = value;
        source
    }

    /// Apply `f` to the focus, returning the updated source.
    fn over(&self, mut source: S, f: impl FnOnce(Self::Target) -> Self::Target) -> S
    where
        Self::Target: Default,
    {
        let slot = self.view_mut(&mut source);
        *slot = f(mem::take(slot));
        source
    }
}

/// Composition for any lens value.
///
/// Kept apart from [`Lens`] because a marker is a lens for many source
/// types; `then` must not need to know which one.
pub trait LensExt: Sized {
    /// Focus further into the target with `next`.
    fn then<B>(self, next: B) -> Compose<Self, B> {
        Compose::new(self, next)
    }
}

impl<L> LensExt for L {}

impl<S, L> Lens<S> for &L
where
    L: Lens<S> + ?Sized,
{
    type Target = L::Target;

    fn view<'a>(&self, source: &'a S) -> &'a Self::Target {
        (**self).view(source)
    }

    fn view_mut<'a>(&self, source: &'a mut S) -> &'a mut Self::Target {
        (**self).view_mut(source)
    }
}

/// `outer` followed by `inner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Compose<A, B> {
    outer: A,
    inner: B,
}

impl<A, B> Compose<A, B> {
    pub fn new(outer: A, inner: B) -> Self {
        Self { outer, inner }
    }
}

impl<S, A, B> Lens<S> for Compose<A, B>
where
    A: Lens<S>,
    A::Target: 'static,
    B: Lens<A::Target>,
{
    type Target = B::Target;

    fn view<'a>(&self, source: &'a S) -> &'a Self::Target {
        self.inner.view(self.outer.view(source))
    }

    fn view_mut<'a>(&self, source: &'a mut S) -> &'a mut Self::Target {
        self.inner.view_mut(self.outer.view_mut(source))
    }
}

/// Read the focus of `lens` in `source`.
pub fn get<S, L: Lens<S>>(lens: L, source: &S) -> &L::Target {
    lens.view(source)
}

/// Functional update: `source` with the focus replaced by `value`.
pub fn set<S, L: Lens<S>>(lens: L, source: S, value: impl Into<L::Target>) -> S {
    lens.set(source, value.into())
}

/// Functional update: `source` with `f` applied to the focus.
pub fn modify<S, L>(lens: L, source: S, f: impl FnOnce(L::Target) -> L::Target) -> S
where
    L: Lens<S>,
    L::Target: Default,
{
    lens.over(source, f)
}

/// `outer` followed by `inner`; same as `outer.then(inner)`.
pub fn compose<A, B>(outer: A, inner: B) -> Compose<A, B> {
    Compose::new(outer, inner)
}

/// Declare zero-sized field markers usable as lenses on any type with a
/// matching [`HasField`] impl.
///
/// ```
/// mod fields {
///     protolens::field_lenses!(name, id, r#type);
/// }
/// let _ = fields::r#type;
/// ```
#[macro_export]
macro_rules! field_lenses {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[allow(non_camel_case_types)]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub struct $name;

            impl<S> $crate::lens::Lens<S> for $name
            where
                S: $crate::lens::HasField<$name>,
            {
                type Target = <S as $crate::lens::HasField<$name>>::Value;

                #[inline]
                fn view<'a>(&self, source: &'a S) -> &'a Self::Target {
                    <S as $crate::lens::HasField<$name>>::field(source)
                }

                #[inline]
                fn view_mut<'a>(&self, source: &'a mut S) -> &'a mut Self::Target {
                    <S as $crate::lens::HasField<$name>>::field_mut(source)
                }
            }
        )*
    };
}
