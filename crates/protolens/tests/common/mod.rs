// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed messages shared by the integration tests.
//!
//! Mirrors `proto/tutorial.proto` and `proto/foo.proto` the way
//! `protolens-gen generate` would emit them.

#![allow(dead_code)]

use protolens::{Message, Schema, UnknownFields};
use std::sync::Arc;

pub const TUTORIAL_PROTO: &str = include_str!("../../proto/tutorial.proto");
pub const FOO_PROTO: &str = include_str!("../../proto/foo.proto");

pub mod fields {
    protolens::field_lenses!(
        addresses,
        age,
        email,
        lucky_numbers,
        name,
        num,
        number,
        owner,
        people,
        phones,
        street,
        r#type,
        zip_code,
    );
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "tutorial.Person")]
pub struct Person {
    #[proto(tag = 1)]
    pub name: String,
    #[proto(tag = 2)]
    pub age: i32,
    #[proto(tag = 3)]
    pub addresses: Vec<Address>,
    #[proto(tag = 4)]
    pub email: String,
    #[proto(tag = 5)]
    pub phones: Vec<PersonPhoneNumber>,
    #[proto(tag = 6, packed)]
    pub lucky_numbers: Vec<i32>,
    #[proto(unknown)]
    pub unknown_fields: UnknownFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum PersonPhoneType {
    #[default]
    PhoneTypeUnspecified = 0,
    PhoneTypeMobile = 1,
    PhoneTypeHome = 2,
    PhoneTypeWork = 3,
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "tutorial.Person.PhoneNumber")]
pub struct PersonPhoneNumber {
    #[proto(tag = 1)]
    pub number: String,
    #[proto(tag = 2, enumeration = "tutorial.Person.PhoneType")]
    pub r#type: i32,
    #[proto(unknown)]
    pub unknown_fields: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "tutorial.Address")]
pub struct Address {
    #[proto(tag = 1)]
    pub street: String,
    #[proto(tag = 2)]
    pub zip_code: String,
    #[proto(unknown)]
    pub unknown_fields: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "tutorial.AddressBook")]
pub struct AddressBook {
    #[proto(tag = 1)]
    pub people: Vec<Person>,
    #[proto(tag = 2)]
    pub owner: Option<Box<Person>>,
    #[proto(unknown)]
    pub unknown_fields: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "foo.FooPacked")]
pub struct FooPacked {
    #[proto(tag = 1, packed)]
    pub num: Vec<i32>,
    #[proto(unknown)]
    pub unknown_fields: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "foo.FooUnpacked")]
pub struct FooUnpacked {
    #[proto(tag = 1)]
    pub num: Vec<i32>,
    #[proto(unknown)]
    pub unknown_fields: UnknownFields,
}

pub fn tutorial_schema() -> Arc<Schema> {
    Schema::parse(TUTORIAL_PROTO).expect("tutorial.proto parses")
}

pub fn foo_schema() -> Arc<Schema> {
    Schema::parse(FOO_PROTO).expect("foo.proto parses")
}

pub fn address(street: &str, zip_code: &str) -> Address {
    Address {
        street: street.to_owned(),
        zip_code: zip_code.to_owned(),
        ..Address::default()
    }
}

/// The tutorial's example person.
pub fn fintan() -> Person {
    Person {
        name: "Fintan".to_owned(),
        age: 24,
        addresses: vec![address("Yolo street", "D8")],
        ..Person::default()
    }
}

/// A random person; strings, lists and nesting vary in size.
pub fn random_person(rng: &mut fastrand::Rng) -> Person {
    let word = |rng: &mut fastrand::Rng| -> String {
        let len = rng.usize(0..12);
        (0..len).map(|_| rng.alphanumeric()).collect()
    };
    let addresses = (0..rng.usize(0..4))
        .map(|_| Address {
            street: word(rng),
            zip_code: word(rng),
            ..Address::default()
        })
        .collect();
    let phones = (0..rng.usize(0..3))
        .map(|_| PersonPhoneNumber {
            number: word(rng),
            r#type: rng.i32(0..4),
            ..PersonPhoneNumber::default()
        })
        .collect();
    Person {
        name: word(rng),
        age: if rng.bool() { rng.i32(..) } else { 0 },
        addresses,
        email: word(rng),
        phones,
        lucky_numbers: (0..rng.usize(0..8)).map(|_| rng.i32(-1000..1000)).collect(),
        ..Person::default()
    }
}
