// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Fuzz target for the heuristic console-log parser and format detection

#![no_main]

use libfuzzer_sys::fuzz_target;

use recap_parsers::{console, detect_format};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Detection is pure and total
        let _ = detect_format(input);

        let result = console::parse(input);
        assert_eq!(result.total_files, result.file_results.len());
    }
});
