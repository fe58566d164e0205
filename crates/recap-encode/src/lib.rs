// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! recap-encode: token-budgeted report encoding for recap
//!
//! Consumes the canonical model from `recap-parsers` and builds a bounded
//! output tree: a focus mode selects which subset of results is emitted, a
//! token budget caps the total size, and per-field sub-budgets keep any
//! single value from starving the rest of the report. Budget exhaustion is
//! a normal terminal condition, never an error.
//!
//! # Example
//!
//! ```
//! use recap_encode::{FocusMode, ReportEncoder, TokenBudget};
//! use recap_parsers::{InputFormat, parse};
//!
//! let data = parse("1..1\nnot ok 1 - math", InputFormat::Tap);
//! let report = ReportEncoder::new(FocusMode::Failures, TokenBudget::new(2000)).encode(&data);
//! assert_eq!(report.summary.tests.failed, 1);
//! ```

pub mod budget;
pub mod context;
pub mod encoder;
pub mod encoder_v3;
pub mod paths;
pub mod report;

pub use budget::TokenBudget;
pub use context::{ContextInfo, ExecutionContext, ProjectType};
pub use encoder::ReportEncoder;
pub use encoder_v3::ReportEncoderV3;
pub use paths::normalize_path;
pub use report::{FocusMode, Report, ReportV3};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::budget::TokenBudget;
    pub use crate::context::{ContextInfo, ExecutionContext, ProjectType};
    pub use crate::encoder::ReportEncoder;
    pub use crate::encoder_v3::ReportEncoderV3;
    pub use crate::report::{FocusMode, Report, ReportV3};
}
