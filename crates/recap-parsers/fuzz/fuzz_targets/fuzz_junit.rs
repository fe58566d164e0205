// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the JUnit XML parser
//!
//! `parse` must never panic and never fail: malformed or adversarial XML
//! (including entity-expansion attempts) degrades to the text-scan fallback.

#![no_main]

use libfuzzer_sys::fuzz_target;

use recap_parsers::junit;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let result = junit::parse(input);
        // Always structurally valid
        assert_eq!(result.total_files, result.file_results.len());
    }
});
