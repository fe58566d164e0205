// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the JSON report parser

#![no_main]

use libfuzzer_sys::fuzz_target;

use recap_parsers::rspec;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let result = rspec::parse(input);
        assert_eq!(result.total_files, result.file_results.len());
    }
});
