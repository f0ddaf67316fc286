// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use protolens::Schema;

fuzz_target!(|data: &[u8]| {
    // Fuzz the .proto lexer and parser (errors are fine, panics are not)
    if let Ok(source) = std::str::from_utf8(data) {
        let _ = Schema::parse(source);
    }
});
