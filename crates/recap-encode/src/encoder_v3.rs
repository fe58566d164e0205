// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! v0.3 report encoder
//!
//! Shares the selection and budget algorithm with the v0.2 encoder, and
//! additionally places an execution-context block first in the output. The
//! context values arrive already computed from the caller; this encoder
//! only decides placement and omission.

use tracing::debug;

use crate::budget::TokenBudget;
use crate::context::{ContextInfo, ExecutionContext};
use crate::paths::normalize_path;
use crate::report::{
    FileFailuresV3, FileIssueLine, FocusMode, IssueDetailV3, ReportV3,
};
use recap_parsers::{ParsedTestData, ParsedTestResult};

/// Sub-budget for test names
const NAME_TOKENS: usize = 30;
/// Sub-budget for error text
const ERROR_TOKENS: usize = 50;
/// Sub-budget for each of expected/actual
const VALUE_TOKENS: usize = 25;
/// In exhaustive modes, stop mid-file past this consumption percentage
const MID_FILE_STOP_PERCENT: f64 = 80.0;

/// Encodes parsed test data into the v0.3 report shape
#[derive(Debug)]
pub struct ReportEncoderV3 {
    mode: FocusMode,
    budget: TokenBudget,
    command: String,
    info: ContextInfo,
}

impl ReportEncoderV3 {
    /// Schema version emitted by this encoder
    pub const VERSION: &'static str = "0.3";

    /// Create an encoder. `command` is the invocation being reported;
    /// `info` carries the caller-detected context values.
    #[must_use]
    pub fn new(mode: FocusMode, budget: TokenBudget, command: String, info: ContextInfo) -> Self {
        Self {
            mode,
            budget,
            command,
            info,
        }
    }

    /// Build the report: context block first, then mode-specific content
    #[must_use]
    pub fn encode(mut self, data: &ParsedTestData) -> ReportV3 {
        let context = self.build_context(data);

        let mut report = ReportV3 {
            version: Self::VERSION.to_string(),
            context,
            focus: self.mode,
            summary_line: None,
            file_issues: None,
            failures: None,
        };

        if self.mode == FocusMode::Summary {
            report.summary_line = Some(build_summary_line(data));
            report.file_issues = Some(self.build_file_issues(data));
        } else {
            report.failures = Some(self.build_failures(data));
        }

        report
    }

    fn build_context(&self, data: &ParsedTestData) -> ExecutionContext {
        let info = self.info.clone();
        ExecutionContext {
            command: self.command.clone(),
            pid: info.pid,
            pwd: info.pwd,
            runtime: info.runtime,
            test_framework: info.test_framework,
            files_under_test: data.total_files,
            protocol: format!(
                "RECAP v{} | focus: {} | limit: {}",
                Self::VERSION,
                self.mode.as_str(),
                self.budget.limit()
            ),
            package_manager: info.package_manager,
            vcs: info.vcs,
            environment: info.environment,
            flags: info.flags,
            project_type: info.project_type,
        }
    }

    /// Summary mode: per issue-file, a compact "N failed, M errors" line
    fn build_file_issues(&mut self, data: &ParsedTestData) -> Vec<FileIssueLine> {
        let mut file_issues = Vec::new();

        for file_result in &data.file_results {
            if !file_result.has_issues() {
                continue;
            }

            let failed = file_result.failure_count();
            let errors = file_result.error_count();

            let mut parts = Vec::new();
            if failed > 0 {
                parts.push(format!("{failed} failed"));
            }
            if errors > 0 {
                parts.push(format!("{errors} errors"));
            }

            let file = normalize_path(&file_result.file_path);
            let issues = parts.join(", ");
            self.budget.consume(&file);
            self.budget.consume(&issues);
            file_issues.push(FileIssueLine { file, issues });

            if !self.budget.has_budget(None) {
                debug!("budget exhausted after file issue lines");
                break;
            }
        }

        file_issues
    }

    /// Non-summary modes: failure detail filtered per focus mode
    fn build_failures(&mut self, data: &ParsedTestData) -> Vec<FileFailuresV3> {
        let mut failures = Vec::new();

        for file_result in &data.file_results {
            let failed: Vec<&ParsedTestResult> = file_result
                .test_results
                .iter()
                .filter(|t| !t.passed)
                .collect();

            if failed.is_empty() {
                continue;
            }

            let (selected, truncated) = match self.mode {
                FocusMode::Critical => {
                    let errors: Vec<&ParsedTestResult> =
                        failed.iter().copied().filter(|t| t.is_error()).collect();
                    (errors, None)
                }
                FocusMode::FirstFailure => {
                    let truncated = (failed.len() > 1).then(|| failed.len() - 1);
                    (failed[..1].to_vec(), truncated)
                }
                _ => (failed, None),
            };

            if selected.is_empty() {
                continue;
            }

            let exhaustive = matches!(self.mode, FocusMode::Failures | FocusMode::All);
            let mut tests = Vec::new();

            for test in selected {
                tests.push(self.build_detail(test));

                if exhaustive && self.budget.used_percentage() > MID_FILE_STOP_PERCENT {
                    debug!(
                        file = %file_result.file_path,
                        "stopping mid-file to reserve budget"
                    );
                    break;
                }
                if !self.budget.has_budget(None) {
                    break;
                }
            }

            if !tests.is_empty() {
                let file = normalize_path(&file_result.file_path);
                self.budget.consume(&file);
                failures.push(FileFailuresV3 {
                    file,
                    tests,
                    truncated,
                });
            }

            if !self.budget.has_budget(None) {
                break;
            }
        }

        failures
    }

    /// Shape one result under the per-field sub-budgets and charge it
    fn build_detail(&mut self, test: &ParsedTestResult) -> IssueDetailV3 {
        let description = if test.is_error() {
            "error occurred"
        } else {
            "test failed"
        };

        let detail = IssueDetailV3 {
            line: test.line.unwrap_or(0),
            description: description.to_string(),
            test_name: self.budget.smart_truncate(&test.name, Some(NAME_TOKENS)),
            expected: test
                .expected
                .as_deref()
                .map(|e| self.budget.smart_truncate(e, Some(VALUE_TOKENS))),
            actual: test
                .actual
                .as_deref()
                .map(|a| self.budget.smart_truncate(a, Some(VALUE_TOKENS))),
            error: test
                .error_message
                .as_deref()
                .map(|e| self.budget.smart_truncate(e, Some(ERROR_TOKENS))),
        };

        self.budget.consume(&detail.test_name);
        for field in [&detail.expected, &detail.actual, &detail.error] {
            if let Some(text) = field {
                self.budget.consume(text);
            }
        }

        detail
    }
}

/// Compact summary line, e.g. "3 passed, 2 failed in 4 files"
fn build_summary_line(data: &ParsedTestData) -> String {
    let mut parts = vec![format!("{} passed", data.passed_tests)];
    if data.failed_tests > 0 {
        parts.push(format!("{} failed", data.failed_tests));
    }
    if data.error_tests > 0 {
        parts.push(format!("{} errors", data.error_tests));
    }

    format!("{} in {} files", parts.join(", "), data.total_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recap_parsers::ParsedFileResult;
    use similar_asserts::assert_eq;

    fn failing(name: &str) -> ParsedTestResult {
        ParsedTestResult {
            name: name.to_string(),
            passed: false,
            expected: Some("5".to_string()),
            actual: Some("3".to_string()),
            ..Default::default()
        }
    }

    fn erroring(name: &str) -> ParsedTestResult {
        ParsedTestResult {
            name: name.to_string(),
            passed: false,
            error_message: Some("RuntimeError: boom".to_string()),
            ..Default::default()
        }
    }

    fn sample_data() -> ParsedTestData {
        ParsedTestData::from_file_results(vec![
            ParsedFileResult::new("tests/a_test.rb", vec![
                ParsedTestResult::passed("ok one"),
                failing("bad math"),
                erroring("crashes"),
            ]),
            ParsedFileResult::new("tests/b_test.rb", vec![failing("also bad")]),
        ])
    }

    fn encoder(mode: FocusMode) -> ReportEncoderV3 {
        ReportEncoderV3::new(
            mode,
            TokenBudget::new(5000),
            "cargo test".to_string(),
            ContextInfo::default(),
        )
    }

    #[test]
    fn test_context_block_present_with_required_fields() {
        let report = encoder(FocusMode::Failures).encode(&sample_data());

        assert_eq!(report.version, "0.3");
        assert_eq!(report.context.command, "cargo test");
        assert_eq!(report.context.files_under_test, 2);
        assert_eq!(
            report.context.protocol,
            "RECAP v0.3 | focus: failures | limit: 5000"
        );
    }

    #[test]
    fn test_context_is_first_in_serialized_output() {
        let report = encoder(FocusMode::Failures).encode(&sample_data());
        let value = serde_json::to_value(&report).expect("serialize");
        let keys: Vec<&String> = value.as_object().expect("object").keys().collect();

        let context_pos = keys.iter().position(|k| *k == "context").expect("context");
        let failures_pos = keys.iter().position(|k| *k == "failures").expect("failures");
        assert!(context_pos < failures_pos);
    }

    #[test]
    fn test_summary_mode_line_and_issues() {
        let report = encoder(FocusMode::Summary).encode(&sample_data());

        assert_eq!(
            report.summary_line.as_deref(),
            Some("1 passed, 2 failed, 1 errors in 2 files")
        );
        let issues = report.file_issues.expect("file issues");
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].issues, "1 failed, 1 errors");
        assert_eq!(issues[1].issues, "1 failed");
        assert!(report.failures.is_none());
    }

    #[test]
    fn test_critical_mode_filters_to_errors() {
        let report = encoder(FocusMode::Critical).encode(&sample_data());

        let failures = report.failures.expect("failures");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].tests[0].description, "error occurred");
        assert_eq!(
            failures[0].tests[0].error.as_deref(),
            Some("RuntimeError: boom")
        );
    }

    #[test]
    fn test_first_failure_mode_truncated_count() {
        let data = ParsedTestData::from_file_results(vec![ParsedFileResult::new(
            "tests/many.rb",
            vec![failing("one"), failing("two"), failing("three")],
        )]);

        let report = encoder(FocusMode::FirstFailure).encode(&data);
        let failures = report.failures.expect("failures");
        assert_eq!(failures[0].tests.len(), 1);
        assert_eq!(failures[0].truncated, Some(2));
    }

    #[test]
    fn test_failure_detail_carries_expected_actual() {
        let report = encoder(FocusMode::Failures).encode(&sample_data());

        let failures = report.failures.expect("failures");
        let failure = failures[0]
            .tests
            .iter()
            .find(|t| t.description == "test failed")
            .expect("failure detail");
        assert_eq!(failure.expected.as_deref(), Some("5"));
        assert_eq!(failure.actual.as_deref(), Some("3"));
        assert!(failure.error.is_none());
    }

    #[test]
    fn test_optional_context_fields_omitted_when_absent() {
        let report = encoder(FocusMode::Summary).encode(&sample_data());
        let value = serde_json::to_value(&report.context).expect("serialize");
        let map = value.as_object().expect("object");

        assert!(!map.contains_key("pid"));
        assert!(!map.contains_key("vcs"));
        assert!(!map.contains_key("environment"));
        assert!(map.contains_key("command"));
    }

    #[test]
    fn test_supplied_context_fields_pass_through() {
        let info = ContextInfo {
            pid: Some(4242),
            vcs: Some("git main@abc1234".to_string()),
            ..Default::default()
        };
        let report = ReportEncoderV3::new(
            FocusMode::Summary,
            TokenBudget::new(5000),
            "rspec".to_string(),
            info,
        )
        .encode(&sample_data());

        assert_eq!(report.context.pid, Some(4242));
        assert_eq!(report.context.vcs.as_deref(), Some("git main@abc1234"));
    }

    #[test]
    fn test_tight_budget_stops_file_emission() {
        let mut files = Vec::new();
        for i in 0..40 {
            files.push(ParsedFileResult::new(
                format!("tests/long_directory_name/file_{i}.rb"),
                vec![failing(&format!("failing test with a fairly long name {i}"))],
            ));
        }
        let data = ParsedTestData::from_file_results(files);

        let report = ReportEncoderV3::new(
            FocusMode::Failures,
            TokenBudget::new(120),
            "run".to_string(),
            ContextInfo::default(),
        )
        .encode(&data);

        let failures = report.failures.expect("failures");
        assert!(!failures.is_empty());
        assert!(failures.len() < 40);
    }
}
