// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Address book walkthrough.
//!
//! Run with: `RUST_LOG=debug cargo run -p protolens --example tutorial`

use protolens::{dynamic, lens, Builder, Lens, Message, Schema, UnknownFields};

mod fields {
    protolens::field_lenses!(addresses, age, name, street, zip_code);
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "tutorial.Address")]
struct Address {
    #[proto(tag = 1)]
    street: String,
    #[proto(tag = 2)]
    zip_code: String,
    #[proto(unknown)]
    unknown_fields: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "tutorial.Person")]
struct Person {
    #[proto(tag = 1)]
    name: String,
    #[proto(tag = 2)]
    age: i32,
    #[proto(tag = 3)]
    addresses: Vec<Address>,
    #[proto(unknown)]
    unknown_fields: UnknownFields,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let home = Builder::<Address>::new()
        .set(fields::street, "Yolo street")
        .set(fields::zip_code, "D8")
        .build();
    let person = Builder::<Person>::new()
        .set(fields::name, "Fintan")
        .set(fields::age, 24)
        .push(fields::addresses, home)
        .build();

    println!("name = {}", lens::get(fields::name, &person));
    println!("age  = {}", fields::age.view(&person));

    let bytes = person.encode_to_vec();
    println!("encoded {} bytes: {:02x?}", bytes.len(), bytes);
    println!(
        "default Person encodes to {} bytes",
        Person::default().encode_to_vec().len()
    );

    let decoded = Person::decode(&bytes)?;
    assert_eq!(decoded, person);

    let birthday = lens::modify(fields::age, decoded, |age| age + 1);
    println!("after birthday: age = {}", birthday.age);

    // Same bytes, read through the schema instead of generated types.
    let schema = Schema::parse(include_str!("../proto/tutorial.proto"))?;
    let before = dynamic::decode(&schema, "tutorial.Person", &bytes)?;
    let after = dynamic::decode(&schema, "tutorial.Person", &birthday.encode_to_vec())?;
    println!("{:#}", after);
    for change in before.diff(&after)? {
        println!("changed {}", change);
    }

    Ok(())
}
