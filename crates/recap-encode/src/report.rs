// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Output-tree types for both report schema versions
//!
//! Optional fields carry `skip_serializing_if` so absent values are omitted
//! from serialized output rather than emitted empty. Field declaration
//! order is the serialization order, which is part of the shape contract:
//! summary before detail, context before everything in v0.3.

use serde::Serialize;

use crate::context::ExecutionContext;
use recap_parsers::TestStatus;

/// Which subset and shape of results an encoder emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FocusMode {
    /// Aggregate counts plus per-file issue counts, no test detail
    Summary,
    /// Error-classified results only
    Critical,
    /// Every non-passed result
    #[default]
    Failures,
    /// Only the first non-passed result per file
    FirstFailure,
    /// Alias of failures covering every non-passed result
    All,
}

impl FocusMode {
    /// Stable kebab-case name, matching the CLI vocabulary
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Critical => "critical",
            Self::Failures => "failures",
            Self::FirstFailure => "first-failure",
            Self::All => "all",
        }
    }
}

/// Whether an emitted result is an assertion failure or an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Assertion failure
    Failure,
    /// Error/exception
    Error,
}

/// Test execution statistics
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TestCounts {
    /// Total tests run
    pub total: usize,
    /// Tests passed
    pub passed: usize,
    /// Assertion failures
    pub failed: usize,
    /// Errors/exceptions
    pub errors: usize,
}

/// File-level statistics
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FileCounts {
    /// Total file results
    pub total: usize,
    /// Files carrying at least one failure or error
    pub with_failures: usize,
}

/// High-level run summary
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Overall status
    pub status: TestStatus,
    /// Test counts
    pub tests: TestCounts,
    /// File counts
    pub files: FileCounts,
    /// Normalized elapsed time, omitted when unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed: Option<String>,
}

/// One emitted failure or error
#[derive(Debug, Clone, Serialize)]
pub struct IssueDetail {
    /// Source line (0 when unknown)
    pub line: u32,
    /// Test name, possibly truncated
    pub name: String,
    /// Failure vs error classification
    #[serde(rename = "type")]
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Best-effort single-line diff between expected and actual
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// One file's emitted issues
#[derive(Debug, Clone, Serialize)]
pub struct FileFailures {
    /// Normalized display path
    pub file: String,
    /// Emitted results
    pub tests: Vec<IssueDetail>,
    /// Count of additional non-passed results elided from this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<usize>,
}

/// Per-file issue count for summary mode
#[derive(Debug, Clone, Serialize)]
pub struct FileIssues {
    /// Normalized display path
    pub file: String,
    /// Failure plus error count
    pub issues: usize,
}

/// Complete v0.2 report
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Schema version
    pub version: String,
    /// Run summary, always present
    pub summary: RunSummary,
    /// Failure detail, present in non-summary modes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failures: Option<Vec<FileFailures>>,
    /// Per-file issue counts, present in summary mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_with_issues: Option<Vec<FileIssues>>,
}

/// Per-file issue description line for v0.3 summary mode
#[derive(Debug, Clone, Serialize)]
pub struct FileIssueLine {
    /// Normalized display path
    pub file: String,
    /// Compact description, e.g. "2 failed, 1 errors"
    pub issues: String,
}

/// One emitted v0.3 failure
#[derive(Debug, Clone, Serialize)]
pub struct IssueDetailV3 {
    /// Source line (0 when unknown)
    pub line: u32,
    /// Short classification phrase
    pub description: String,
    /// Test name, possibly truncated
    pub test_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One file's emitted v0.3 issues
#[derive(Debug, Clone, Serialize)]
pub struct FileFailuresV3 {
    /// Normalized display path
    pub file: String,
    /// Emitted results
    pub tests: Vec<IssueDetailV3>,
    /// Count of additional non-passed results elided from this file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<usize>,
}

/// Complete v0.3 report: execution context first, then mode content
#[derive(Debug, Clone, Serialize)]
pub struct ReportV3 {
    /// Schema version
    pub version: String,
    /// Execution context block, always first
    pub context: ExecutionContext,
    /// Focus mode the report was built with
    pub focus: FocusMode,
    /// Compact summary line, present in summary mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_line: Option<String>,
    /// Per-file issue lines, present in summary mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_issues: Option<Vec<FileIssueLine>>,
    /// Failure detail, present in non-summary modes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failures: Option<Vec<FileFailuresV3>>,
}
