// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Execution-context shapes for the v0.3 report
//!
//! The encoder owns only the placement and omission rules: every value here
//! arrives already computed by the caller. Detection (process id, git
//! probing, project markers) lives in the binary, not in this crate.

use std::collections::BTreeMap;

use serde::Serialize;

/// Detected project flavor, by marker files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Rust,
    Python,
    JavaScript,
    Ruby,
    Java,
    Go,
    #[default]
    Generic,
}

/// Caller-supplied context values, all optional
#[derive(Debug, Clone, Default)]
pub struct ContextInfo {
    /// Process id of the run being reported
    pub pid: Option<u32>,
    /// Working directory
    pub pwd: Option<String>,
    /// Runtime description, e.g. "recap 0.3.0 (linux-x86_64)"
    pub runtime: Option<String>,
    /// Test framework description
    pub test_framework: Option<String>,
    /// Package manager and version
    pub package_manager: Option<String>,
    /// Version-control description, e.g. "git main@abc1234"
    pub vcs: Option<String>,
    /// Relevant environment variables
    pub environment: Option<BTreeMap<String, String>>,
    /// Command-line flags extracted from the invocation
    pub flags: Option<Vec<String>>,
    /// Detected project type
    pub project_type: Option<ProjectType>,
}

/// The serialized context block. Field order is the output order; optional
/// fields with no value are omitted entirely.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionContext {
    /// The command whose output is being reported
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pwd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_framework: Option<String>,
    /// Number of files under test in this run
    pub files_under_test: usize,
    /// Protocol line: schema version, focus mode, token limit
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,
}
