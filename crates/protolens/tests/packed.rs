// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::cast_possible_truncation)] // Test parameters

//! Packed versus unpacked repeated scalars.

mod common;

use common::{foo_schema, FooPacked, FooUnpacked};
use protolens::{dynamic, DecodeError, DynamicMessage, Message, Value};

const COUNT: usize = 10_000;

fn fives(count: usize) -> Vec<i32> {
    vec![5; count]
}

#[test]
fn test_ten_thousand_fives() {
    let packed = FooPacked {
        num: fives(COUNT),
        ..FooPacked::default()
    };
    let unpacked = FooUnpacked {
        num: fives(COUNT),
        ..FooUnpacked::default()
    };

    let packed_bytes = packed.encode_to_vec();
    let unpacked_bytes = unpacked.encode_to_vec();

    // One key, a two-byte length, then one byte per element.
    assert_eq!(packed_bytes.len(), 1 + 2 + COUNT);
    // A key and a one-byte value per element.
    assert_eq!(unpacked_bytes.len(), 2 * COUNT);
    assert!(packed_bytes.len() < unpacked_bytes.len());

    let packed_back = FooPacked::decode(&packed_bytes).expect("packed");
    let unpacked_back = FooUnpacked::decode(&unpacked_bytes).expect("unpacked");
    assert_eq!(packed_back.num.len(), COUNT);
    assert_eq!(packed_back.num, unpacked_back.num);
    assert!(packed_back.num.iter().all(|&n| n == 5));
}

#[test]
fn test_packed_is_never_larger_and_smaller_from_three_elements() {
    for count in [1usize, 2, 3, 10, 100, 1_000] {
        let packed = FooPacked {
            num: fives(count),
            ..FooPacked::default()
        };
        let unpacked = FooUnpacked {
            num: fives(count),
            ..FooUnpacked::default()
        };
        let packed_len = packed.encode_to_vec().len();
        let unpacked_len = unpacked.encode_to_vec().len();
        // Unpacked pays one key byte per element, packed a key and a length once.
        assert_eq!(unpacked_len, 2 * count, "count = {}", count);
        match count {
            1 => assert!(packed_len > unpacked_len),
            2 => assert_eq!(packed_len, unpacked_len),
            _ => assert!(packed_len < unpacked_len, "count = {}", count),
        }
    }
}

#[test]
fn test_empty_list_emits_nothing() {
    assert!(FooPacked::default().encode_to_vec().is_empty());
    assert!(FooUnpacked::default().encode_to_vec().is_empty());
}

#[test]
fn test_decoders_accept_either_layout() {
    let values = vec![0, 1, -1, 300, i32::MAX, i32::MIN];
    let packed = FooPacked {
        num: values.clone(),
        ..FooPacked::default()
    };
    let unpacked = FooUnpacked {
        num: values.clone(),
        ..FooUnpacked::default()
    };

    let from_packed = FooUnpacked::decode(&packed.encode_to_vec()).expect("packed into unpacked");
    let from_unpacked = FooPacked::decode(&unpacked.encode_to_vec()).expect("unpacked into packed");
    assert_eq!(from_packed.num, values);
    assert_eq!(from_unpacked.num, values);
}

#[test]
fn test_concatenated_entries_append() {
    let first = FooPacked {
        num: vec![1, 2],
        ..FooPacked::default()
    };
    let second = FooUnpacked {
        num: vec![3],
        ..FooUnpacked::default()
    };
    let mut bytes = first.encode_to_vec();
    bytes.extend(second.encode_to_vec());
    let merged = FooPacked::decode(&bytes).expect("merge");
    assert_eq!(merged.num, [1, 2, 3]);
}

#[test]
fn test_truncated_packed_payload() {
    let bytes = FooPacked {
        num: fives(10),
        ..FooPacked::default()
    }
    .encode_to_vec();
    let err = FooPacked::decode(&bytes[..bytes.len() - 1]).expect_err("truncated");
    assert!(matches!(err, DecodeError::Truncated { .. }), "{err:?}");
}

#[test]
fn test_dynamic_matches_typed_layout() {
    let schema = foo_schema();
    for (type_name, typed) in [
        (
            "foo.FooPacked",
            FooPacked {
                num: fives(100),
                ..FooPacked::default()
            }
            .encode_to_vec(),
        ),
        (
            "foo.FooUnpacked",
            FooUnpacked {
                num: fives(100),
                ..FooUnpacked::default()
            }
            .encode_to_vec(),
        ),
    ] {
        let message = DynamicMessage::new(&schema, type_name)
            .and_then(|m| m.with("num", fives(100).into_iter().map(Value::I32).collect::<Vec<_>>()))
            .expect("dynamic");
        assert_eq!(dynamic::encode(&message), typed, "{}", type_name);

        let decoded = dynamic::decode(&schema, type_name, &typed).expect("decode");
        assert_eq!(decoded, message);
    }
}
