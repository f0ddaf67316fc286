// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters

//! Randomised round trips, typed/dynamic agreement and unknown fields.

mod common;

use common::{fintan, random_person, tutorial_schema, AddressBook, Person};
use protolens::{
    dynamic, lens, DecodeError, DecodeOptions, DynamicMessage, Message, UnknownFields, Value,
    WireType,
};

const SEED: u64 = 0x5EED_1E45;

/// Older revision of `tutorial.Person` that only knows `name`.
#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "tutorial.Person", fields = "common::fields")]
struct PersonV1 {
    #[proto(tag = 1)]
    name: String,
    #[proto(unknown)]
    unknown_fields: UnknownFields,
}

#[test]
fn test_random_typed_round_trip() {
    let mut rng = fastrand::Rng::with_seed(SEED);
    for _ in 0..500 {
        let person = random_person(&mut rng);
        let bytes = person.encode_to_vec();
        let decoded = Person::decode(&bytes).expect("decode");
        assert_eq!(decoded, person);
        // Encoding is deterministic.
        assert_eq!(decoded.encode_to_vec(), bytes);
    }
}

#[test]
fn test_typed_and_dynamic_agree() {
    let schema = tutorial_schema();
    let mut rng = fastrand::Rng::with_seed(SEED ^ 1);
    for _ in 0..200 {
        let person = random_person(&mut rng);
        let typed_bytes = person.encode_to_vec();

        let dynamic = dynamic::decode(&schema, "tutorial.Person", &typed_bytes).expect("dynamic");
        assert_eq!(dynamic::encode(&dynamic), typed_bytes);

        let back: Person = dynamic.to_message().expect("typed");
        assert_eq!(back, person);
        assert_eq!(DynamicMessage::from_message(&schema, &person).expect("bridge"), dynamic);
    }
}

#[test]
fn test_dynamic_construction_matches_typed() {
    let schema = tutorial_schema();
    let mut person = DynamicMessage::new(&schema, "tutorial.Person")
        .and_then(|p| p.with("name", "Fintan"))
        .and_then(|p| p.with("age", 24))
        .expect("person");
    let address = DynamicMessage::new(&schema, "tutorial.Address")
        .and_then(|a| a.with("street", "Yolo street"))
        .and_then(|a| a.with("zip_code", "D8"))
        .expect("address");
    person.push("addresses", address).expect("push");

    assert_eq!(person.encode(), fintan().encode_to_vec());
    assert_eq!(person.to_message::<Person>().expect("typed"), fintan());
    assert_eq!(person.get("age"), Ok(Value::I32(24)));
}

#[test]
fn test_unknown_fields_pass_through() {
    let person = Person {
        email: "fintan@example.com".into(),
        lucky_numbers: vec![3, 7],
        ..fintan()
    };
    let bytes = person.encode_to_vec();

    let old = PersonV1::decode(&bytes).expect("old reader");
    assert_eq!(old.name, "Fintan");
    assert_eq!(
        old.unknown_fields.iter().map(|f| f.tag()).collect::<Vec<_>>(),
        [2, 3, 4, 6]
    );
    assert_eq!(
        old.unknown_fields.by_tag(6).next().map(|f| f.wire_type()),
        Some(WireType::Len)
    );

    // The old revision re-emits what it did not understand, byte for byte.
    let renamed = lens::set(common::fields::name, old, "Fintan");
    assert_eq!(renamed.encode_to_vec(), bytes);
    assert_eq!(Person::decode(&renamed.encode_to_vec()).expect("new"), person);
}

#[test]
fn test_unknown_fields_follow_known_fields() {
    let person = Person {
        name: "Ada".into(),
        age: 36,
        ..Person::default()
    };
    let mut old = PersonV1::decode(&person.encode_to_vec()).expect("old");
    old.name = "Grace".into();

    let bytes = old.encode_to_vec();
    let decoded = Person::decode(&bytes).expect("decode");
    assert_eq!(decoded.name, "Grace");
    assert_eq!(decoded.age, 36);
    // name (tag 1) first, then the retained age entry.
    assert_eq!(&bytes[..2], [0x0A, 0x05]);
}

#[test]
fn test_dynamic_unknown_fields() {
    let person = Person {
        email: "a@b.c".into(),
        ..fintan()
    };
    let bytes = person.encode_to_vec();

    let schema = protolens::Schema::parse(
        r#"
        syntax = "proto3";
        package tutorial;
        message Person { string name = 1; }
        "#,
    )
    .expect("schema");
    let old = dynamic::decode(&schema, "tutorial.Person", &bytes).expect("decode");
    assert_eq!(old.unknown_fields().len(), 3);
    assert_eq!(dynamic::encode(&old), bytes);
}

#[test]
fn test_recursion_limit() {
    // owner (depth 1) -> addresses (depth 2).
    let book = AddressBook {
        owner: Some(Box::new(fintan())),
        ..AddressBook::default()
    };
    let bytes = book.encode_to_vec();

    let shallow = DecodeOptions::default().with_recursion_limit(1);
    let err = AddressBook::decode_with(&bytes, &shallow).expect_err("too deep");
    assert_eq!(err, DecodeError::RecursionLimitExceeded { limit: 1 });

    let enough = DecodeOptions::default().with_recursion_limit(2);
    assert_eq!(AddressBook::decode_with(&bytes, &enough).expect("fits"), book);
}

#[test]
fn test_malformed_input_is_an_error() {
    // Key for tag 1 as varint, but `name` is a string.
    assert!(matches!(
        Person::decode(&[0x08, 0x01]),
        Err(DecodeError::WireTypeMismatch { tag: 1, .. })
    ));
    // Varint that never terminates.
    assert!(Person::decode(&[0x10, 0xFF, 0xFF]).is_err());
    // Invalid UTF-8 in a string field.
    assert!(matches!(
        Person::decode(&[0x0A, 0x01, 0xFF]),
        Err(DecodeError::InvalidUtf8(_))
    ));
    // Tag zero.
    assert!(matches!(
        Person::decode(&[0x00, 0x01]),
        Err(DecodeError::InvalidTag { tag: 0 })
    ));
}

#[test]
fn test_random_bytes_never_panic() {
    let mut rng = fastrand::Rng::with_seed(SEED ^ 2);
    let schema = tutorial_schema();
    for _ in 0..2_000 {
        let len = rng.usize(0..64);
        let bytes: Vec<u8> = (0..len).map(|_| rng.u8(..)).collect();
        let _ = Person::decode(&bytes);
        let _ = AddressBook::decode(&bytes);
        let _ = dynamic::decode(&schema, "tutorial.AddressBook", &bytes);
    }
}
