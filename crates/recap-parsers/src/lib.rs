// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! recap-parsers: test-output parsing for recap
//!
//! This library crate normalizes four unrelated test-output formats — JUnit
//! XML, TAP, RSpec-style JSON reports, and free-form console logs — into one
//! canonical in-memory model for the recap encoders.
//!
//! Parsers never fail: malformed input degrades to a best-effort text scan
//! tagged with the parse error, so the pipeline always terminates with a
//! usable aggregate.
//!
//! # Example
//!
//! ```
//! use recap_parsers::{detect_format, parse, InputFormat};
//!
//! let content = "1..2\nok 1 - a\nnot ok 2 - b";
//! assert_eq!(detect_format(content), InputFormat::Tap);
//!
//! let data = parse(content, InputFormat::Tap);
//! assert_eq!(data.total_tests, 2);
//! assert_eq!(data.failed_tests, 1);
//! ```

pub mod console;
pub mod detect;
pub mod error;
pub mod extract;
pub mod junit;
pub mod rspec;
pub mod schema;
pub mod tap;

pub use detect::{InputFormat, detect_format, parse, parse_auto};
pub use error::ParseError;
pub use schema::{ParsedFileResult, ParsedTestData, ParsedTestResult, TestStatus};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::detect::{InputFormat, detect_format, parse, parse_auto};
    pub use crate::schema::{ParsedFileResult, ParsedTestData, ParsedTestResult, TestStatus};
}
