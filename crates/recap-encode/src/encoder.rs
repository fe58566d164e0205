// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! v0.2 report encoder
//!
//! Builds the output tree from parsed data under a token budget. Each
//! emitted unit (a test within a file, then the file itself) is charged
//! against the budget; once it is exhausted emission stops, but nothing
//! already emitted is revoked. In the exhaustive modes an earlier stop
//! kicks in once most of the budget is consumed, reserving room for
//! subsequent files.

use tracing::debug;

use crate::budget::TokenBudget;
use crate::paths::normalize_path;
use crate::report::{
    FileCounts, FileFailures, FileIssues, FocusMode, IssueDetail, IssueKind, Report, RunSummary,
    TestCounts,
};
use recap_parsers::{ParsedTestData, ParsedTestResult};

/// Sub-budget for test names
const NAME_TOKENS: usize = 30;
/// Sub-budget for error text
const ERROR_TOKENS: usize = 50;
/// Sub-budget for each of expected/actual
const VALUE_TOKENS: usize = 25;
/// Minimum remaining tokens before a diff is even attempted
const DIFF_MIN_REMAINING: usize = 100;
/// Tokens a diff is expected to need
const DIFF_RESERVE: usize = 50;
/// In exhaustive modes, stop mid-file past this consumption percentage
const MID_FILE_STOP_PERCENT: f64 = 80.0;

/// Encodes parsed test data into the v0.2 report shape
#[derive(Debug)]
pub struct ReportEncoder {
    mode: FocusMode,
    budget: TokenBudget,
}

impl ReportEncoder {
    /// Schema version emitted by this encoder
    pub const VERSION: &'static str = "0.2";

    /// Create an encoder. The budget is owned for the duration of one
    /// `encode` call and discarded with the encoder.
    #[must_use]
    pub fn new(mode: FocusMode, budget: TokenBudget) -> Self {
        Self { mode, budget }
    }

    /// Build the report for one parsed run
    #[must_use]
    pub fn encode(mut self, data: &ParsedTestData) -> Report {
        let summary = build_summary(data);

        let mut report = Report {
            version: Self::VERSION.to_string(),
            summary,
            failures: None,
            files_with_issues: None,
        };

        match self.mode {
            FocusMode::Summary => {
                report.files_with_issues = Some(self.build_files_with_issues(data));
            }
            FocusMode::Critical => {
                report.failures = Some(self.build_critical_failures(data));
            }
            FocusMode::FirstFailure => {
                report.failures = Some(self.build_first_failure_details(data));
            }
            FocusMode::Failures | FocusMode::All => {
                report.failures = Some(self.build_all_failure_details(data));
            }
        }

        report
    }

    /// Summary mode: per issue-file, only a count
    fn build_files_with_issues(&mut self, data: &ParsedTestData) -> Vec<FileIssues> {
        let mut files_with_issues = Vec::new();

        for file_result in &data.file_results {
            if !file_result.has_issues() {
                continue;
            }

            let file = normalize_path(&file_result.file_path);
            self.budget.consume(&file);
            files_with_issues.push(FileIssues {
                file,
                issues: file_result.failure_count() + file_result.error_count(),
            });

            if !self.budget.has_budget(None) {
                debug!("budget exhausted after file issue counts");
                break;
            }
        }

        files_with_issues
    }

    /// Critical mode: error-classified results only, grouped by file
    fn build_critical_failures(&mut self, data: &ParsedTestData) -> Vec<FileFailures> {
        let mut failures = Vec::new();

        for file_result in &data.file_results {
            let mut tests = Vec::new();

            for test in file_result.test_results.iter().filter(|t| t.is_error()) {
                let error = self.budget.smart_truncate(
                    test.error_message.as_deref().unwrap_or("unknown error"),
                    Some(ERROR_TOKENS),
                );
                self.budget.consume(&test.name);
                self.budget.consume(&error);

                tests.push(IssueDetail {
                    line: test.line.unwrap_or(0),
                    name: test.name.clone(),
                    kind: IssueKind::Error,
                    expected: None,
                    actual: None,
                    error: Some(error),
                    diff: None,
                });

                if !self.budget.has_budget(None) {
                    break;
                }
            }

            if !tests.is_empty() {
                let file = normalize_path(&file_result.file_path);
                self.budget.consume(&file);
                failures.push(FileFailures {
                    file,
                    tests,
                    truncated: None,
                });
            }

            if !self.budget.has_budget(None) {
                break;
            }
        }

        failures
    }

    /// First-failure mode: one result per file plus an elided count
    fn build_first_failure_details(&mut self, data: &ParsedTestData) -> Vec<FileFailures> {
        let mut failures = Vec::new();

        for file_result in &data.file_results {
            let failed: Vec<&ParsedTestResult> = file_result
                .test_results
                .iter()
                .filter(|t| !t.passed)
                .collect();

            let Some(first) = failed.first() else {
                continue;
            };

            let detail = self.build_issue_detail(first);
            let truncated = (failed.len() > 1).then(|| failed.len() - 1);

            let file = normalize_path(&file_result.file_path);
            self.budget.consume(&file);
            failures.push(FileFailures {
                file,
                tests: vec![detail],
                truncated,
            });

            if !self.budget.has_budget(None) {
                break;
            }
        }

        failures
    }

    /// Failures/all modes: every non-passed result, errors before failures
    fn build_all_failure_details(&mut self, data: &ParsedTestData) -> Vec<FileFailures> {
        let mut failures = Vec::new();

        for file_result in &data.file_results {
            if !file_result.has_issues() {
                continue;
            }

            let errors = file_result.test_results.iter().filter(|t| t.is_error());
            let assertion_failures = file_result.test_results.iter().filter(|t| t.is_failure());

            let mut tests = Vec::new();
            for test in errors.chain(assertion_failures) {
                tests.push(self.build_issue_detail(test));

                // Reserve room for at least one more file
                if self.budget.used_percentage() > MID_FILE_STOP_PERCENT {
                    debug!(
                        file = %file_result.file_path,
                        "stopping mid-file to reserve budget"
                    );
                    break;
                }
            }

            if !tests.is_empty() {
                let file = normalize_path(&file_result.file_path);
                self.budget.consume(&file);
                failures.push(FileFailures {
                    file,
                    tests,
                    truncated: None,
                });
            }

            if !self.budget.has_budget(None) {
                break;
            }
        }

        failures
    }

    /// Shape one result under the per-field sub-budgets and charge it
    fn build_issue_detail(&mut self, test: &ParsedTestResult) -> IssueDetail {
        let name = self.budget.smart_truncate(&test.name, Some(NAME_TOKENS));

        let mut detail = if test.is_error() {
            IssueDetail {
                line: test.line.unwrap_or(0),
                name,
                kind: IssueKind::Error,
                expected: None,
                actual: None,
                error: Some(self.budget.smart_truncate(
                    test.error_message.as_deref().unwrap_or("unknown error"),
                    Some(ERROR_TOKENS),
                )),
                diff: None,
            }
        } else {
            IssueDetail {
                line: test.line.unwrap_or(0),
                name,
                kind: IssueKind::Failure,
                expected: test
                    .expected
                    .as_deref()
                    .map(|e| self.budget.smart_truncate(e, Some(VALUE_TOKENS))),
                actual: test
                    .actual
                    .as_deref()
                    .map(|a| self.budget.smart_truncate(a, Some(VALUE_TOKENS))),
                error: None,
                diff: None,
            }
        };

        if detail.kind == IssueKind::Failure
            && self.budget.remaining() > DIFF_MIN_REMAINING
            && test.expected.is_some()
            && test.actual.is_some()
        {
            detail.diff = self.generate_simple_diff(
                test.expected.as_deref().unwrap_or_default(),
                test.actual.as_deref().unwrap_or_default(),
            );
        }

        self.charge(&detail);
        detail
    }

    /// Best-effort single-line diff when budget allows
    fn generate_simple_diff(&self, expected: &str, actual: &str) -> Option<String> {
        if !self.budget.has_budget(Some(DIFF_RESERVE)) {
            return None;
        }

        let first_or_empty = |s: &str| {
            s.lines()
                .next()
                .filter(|l| !l.is_empty())
                .unwrap_or("(empty)")
                .to_string()
        };

        let diff = format!("- {}\n+ {}", first_or_empty(actual), first_or_empty(expected));

        if self.budget.would_exceed(&diff) {
            return None;
        }

        Some(diff)
    }

    /// Charge every emitted field of a detail against the budget
    fn charge(&mut self, detail: &IssueDetail) {
        self.budget.consume(&detail.name);
        for field in [&detail.expected, &detail.actual, &detail.error, &detail.diff] {
            if let Some(text) = field {
                self.budget.consume(text);
            }
        }
    }
}

/// Build the always-present summary block
fn build_summary(data: &ParsedTestData) -> RunSummary {
    RunSummary {
        status: data.overall_status(),
        tests: TestCounts {
            total: data.total_tests,
            passed: data.passed_tests,
            failed: data.failed_tests,
            errors: data.error_tests,
        },
        files: FileCounts {
            total: data.total_files,
            with_failures: data.files_with_failures(),
        },
        elapsed: data.elapsed_time.clone(),
    }
}
