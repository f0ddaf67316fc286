// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use protolens::{dynamic, Schema};
use std::sync::{Arc, OnceLock};

fn schema() -> &'static Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::parse(include_str!("../../crates/protolens/proto/tutorial.proto"))
            .expect("bundled schema")
    })
}

fuzz_target!(|data: &[u8]| {
    // Fuzz dynamic decode, then text rendering of whatever came out
    if let Ok(book) = dynamic::decode(schema(), "tutorial.AddressBook", data) {
        let _ = format!("{book:#}");
        let bytes = book.encode();
        let again = dynamic::decode(schema(), "tutorial.AddressBook", &bytes)
            .expect("re-encoded message must decode");
        assert_eq!(book, again);
    }
});
