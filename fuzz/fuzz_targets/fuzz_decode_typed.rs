// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use protolens::{Message, UnknownFields};

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "fuzz.Leaf")]
struct Leaf {
    #[proto(tag = 1)]
    text: String,
    #[proto(tag = 2, kind = "sint64")]
    delta: i64,
    #[proto(tag = 3, packed)]
    values: Vec<u32>,
    #[proto(unknown)]
    unknown_fields: UnknownFields,
}

#[derive(Debug, Clone, Default, PartialEq, Message)]
#[proto(name = "fuzz.Node")]
struct Node {
    #[proto(tag = 1)]
    id: u64,
    #[proto(tag = 2)]
    leaves: Vec<Leaf>,
    #[proto(tag = 3)]
    next: Option<Box<Node>>,
    #[proto(tag = 4, kind = "fixed32")]
    flags: Vec<u32>,
    #[proto(unknown)]
    unknown_fields: UnknownFields,
}

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must re-encode to something that decodes to the same value
    if let Ok(node) = Node::decode(data) {
        let bytes = node.encode_to_vec();
        let again = Node::decode(&bytes).expect("re-encoded message must decode");
        assert_eq!(node, again);
    }
});
