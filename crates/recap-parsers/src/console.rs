// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Heuristic console-log parser
//!
//! No single format to rely on: scans for FAILED/ERROR/PASSED sentinel
//! lines (pytest-style), honors a count-and-duration summary line as
//! authoritative when present, and looks ahead a bounded window after each
//! failure for assertion-style comparison text. When a summary line exists
//! but no per-test lines were found, placeholder results are synthesized so
//! downstream consumers still see the right totals.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::extract;
use crate::schema::{ParsedFileResult, ParsedTestData, ParsedTestResult};

static FAILURE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^FAILED\s+([^:\s]+(?:\.py)?):?:?(\w+)?\s*-?\s*(.*)$").expect("failure pattern")
});
static ERROR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ERROR\s+([^:\s]+(?:\.py)?):?:?(\w+)?\s*-?\s*(.*)$").expect("error pattern")
});
static PASSED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PASSED\s+([^:\s]+(?:\.py)?):?:?(\w+)?").expect("passed pattern")
});
static SUMMARY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"=+\s*(\d+)\s+failed(?:,\s*(\d+)\s+passed)?(?:,\s*(\d+)\s+error)?.*?in\s+([\d.]+s?)")
        .expect("summary pattern")
});
static PATH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*?::").expect("path prefix pattern"));

/// Bounded look-ahead window after a failure line
const LOOKAHEAD_LINES: usize = 10;

/// Parse free-form console output. Never fails.
#[must_use]
pub fn parse(content: &str) -> ParsedTestData {
    if content.trim().is_empty() {
        return ParsedTestData::default();
    }

    let lines: Vec<&str> = content.lines().collect();

    // Results grouped by file, first-seen order preserved
    let mut file_groups: Vec<(String, Vec<ParsedTestResult>)> = Vec::new();

    let mut total_tests = 0usize;
    let mut failed_count = 0usize;
    let mut passed_count = 0usize;
    let mut error_count = 0usize;
    let mut elapsed_time = None;

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        // The summary line is authoritative over any derived counts
        if let Some(summary) = SUMMARY_LINE.captures(line) {
            failed_count = summary[1].parse().unwrap_or(0);
            passed_count = summary
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            error_count = summary
                .get(3)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0);
            total_tests = failed_count + passed_count + error_count;
            elapsed_time = extract::normalize_time(&summary[4]);
            continue;
        }

        if let Some(failure) = FAILURE_LINE.captures(line) {
            let file_path = failure[1].to_string();
            let test_name = failure.get(2).map_or("unknown", |m| m.as_str());
            let reason = failure.get(3).map_or("", |m| m.as_str());

            let mut result = ParsedTestResult {
                name: extract::normalize_test_name(test_name),
                line: extract::extract_line_number(reason),
                passed: false,
                ..Default::default()
            };

            if let Some((expected, actual)) = lookahead_assertion(&lines, i + 1) {
                result.expected = Some(expected);
                result.actual = Some(actual);
            } else if !reason.is_empty() {
                if extract::is_error_message(reason) {
                    result.error_message = Some(reason.to_string());
                } else {
                    result.expected = Some("assertion to pass".to_string());
                    result.actual = Some(reason.to_string());
                }
            }

            push_grouped(&mut file_groups, file_path, result);
            continue;
        }

        if let Some(error) = ERROR_LINE.captures(line) {
            let file_path = error[1].to_string();
            let test_name = error.get(2).map_or("unknown", |m| m.as_str());
            let reason = error
                .get(3)
                .map(|m| m.as_str())
                .filter(|r| !r.is_empty())
                .unwrap_or("unknown error");

            let result = ParsedTestResult {
                name: extract::normalize_test_name(test_name),
                line: extract::extract_line_number(reason),
                passed: false,
                error_message: Some(reason.to_string()),
                ..Default::default()
            };

            push_grouped(&mut file_groups, file_path, result);
            continue;
        }

        if let Some(passed) = PASSED_LINE.captures(line) {
            let file_path = passed[1].to_string();
            let test_name = passed.get(2).map_or("unknown", |m| m.as_str());

            push_grouped(
                &mut file_groups,
                file_path,
                ParsedTestResult::passed(extract::normalize_test_name(test_name)),
            );
        }

        // Everything else is noise
    }

    // No summary line found: derive counts from what was parsed
    if total_tests == 0 {
        let all = || file_groups.iter().flat_map(|(_, tests)| tests.iter());
        total_tests = all().count();
        passed_count = all().filter(|t| t.passed).count();
        failed_count = all().filter(|t| t.is_failure()).count();
        error_count = all().filter(|t| t.is_error()).count();
    }

    let mut file_results: Vec<ParsedFileResult> = file_groups
        .into_iter()
        .map(|(path, tests)| ParsedFileResult::new(clean_file_path(&path), tests))
        .collect();

    // Summary without per-test lines: synthesize placeholders so totals and
    // the classification mix survive
    if total_tests > 0 && file_results.is_empty() {
        debug!(total_tests, "summary-only console output, synthesizing placeholders");
        let mut generic = Vec::with_capacity(total_tests);

        for i in 0..failed_count {
            generic.push(ParsedTestResult {
                name: format!("failed test {}", i + 1),
                passed: false,
                expected: Some("test to pass".to_string()),
                actual: Some("test failed".to_string()),
                ..Default::default()
            });
        }
        for i in 0..error_count {
            generic.push(ParsedTestResult {
                name: format!("error test {}", i + 1),
                passed: false,
                error_message: Some("test error occurred".to_string()),
                ..Default::default()
            });
        }
        for i in 0..passed_count {
            generic.push(ParsedTestResult::passed(format!("passed test {}", i + 1)));
        }

        file_results.push(ParsedFileResult::new("pytest_output", generic));
    }

    ParsedTestData {
        total_tests,
        passed_tests: passed_count,
        failed_tests: failed_count,
        error_tests: error_count,
        total_files: file_results.len(),
        elapsed_time,
        file_results,
    }
}

fn push_grouped(
    groups: &mut Vec<(String, Vec<ParsedTestResult>)>,
    path: String,
    result: ParsedTestResult,
) {
    if let Some((_, tests)) = groups.iter_mut().find(|(p, _)| *p == path) {
        tests.push(result);
    } else {
        groups.push((path, vec![result]));
    }
}

/// Scan a bounded window of following lines for assertion comparison text
fn lookahead_assertion(lines: &[&str], start: usize) -> Option<(String, String)> {
    let end = (start + LOOKAHEAD_LINES).min(lines.len());

    for raw in &lines[start..end] {
        let line = raw.trim();

        // Stop at the next result line
        if FAILURE_LINE.is_match(line) || ERROR_LINE.is_match(line) || PASSED_LINE.is_match(line) {
            break;
        }
        if line.is_empty() {
            continue;
        }

        if line.to_lowercase().contains("assert") {
            if let Some(values) = extract::extract_assertion_values(line) {
                return Some(values);
            }
        }

        if ["==", "!=", "Expected:", "Actual:"].iter().any(|op| line.contains(op)) {
            if let Some(values) = extract::extract_assertion_values(line) {
                return Some(values);
            }
        }
    }

    None
}

/// Strip runner prefixes and restore a plausible extension
fn clean_file_path(path: &str) -> String {
    if path.is_empty() {
        return "unknown".to_string();
    }

    let path = PATH_PREFIX.replace(path, "").to_string();

    let test_like = path.contains('/') || path.contains("_test") || path.contains("test_");
    if test_like && !path.ends_with(".py") {
        return format!("{path}.py");
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_parse_empty_input() {
        let data = parse("");
        assert_eq!(data.total_tests, 0);
        assert_eq!(data.file_results.len(), 0);
    }

    #[test]
    fn test_failed_and_passed_lines() {
        let input = "PASSED tests/test_auth.py::test_login\n\
                     FAILED tests/test_auth.py::test_logout - assert result == True";
        let data = parse(input);

        assert_eq!(data.total_tests, 2);
        assert_eq!(data.passed_tests, 1);
        assert_eq!(data.failed_tests, 1);
        assert_eq!(data.total_files, 1);
        assert_eq!(data.file_results[0].file_path, "tests/test_auth.py");
    }

    #[test]
    fn test_summary_line_is_authoritative() {
        let input = "FAILED tests/test_a.py::test_x - boom\n\
                     ===== 2 failed, 3 passed in 1.24s =====";
        let data = parse(input);

        // One failure was parsed, but the summary declares two
        assert_eq!(data.failed_tests, 2);
        assert_eq!(data.passed_tests, 3);
        assert_eq!(data.total_tests, 5);
        assert_eq!(data.elapsed_time.as_deref(), Some("1.2s"));
    }

    #[test]
    fn test_error_line_classified_as_error() {
        let input = "ERROR tests/test_db.py::test_conn - ConnectionError: refused";
        let data = parse(input);
        assert_eq!(data.error_tests, 1);
        assert!(data.file_results[0].test_results[0].is_error());
    }

    #[test]
    fn test_lookahead_recovers_assertion_values() {
        let input = "FAILED tests/test_math.py::test_add\n\
                     >       assert total == 10\n\
                     E       AssertionError";
        let data = parse(input);

        let result = &data.file_results[0].test_results[0];
        assert_eq!(result.expected.as_deref(), Some("10"));
        assert_eq!(result.actual.as_deref(), Some("total"));
    }

    #[test]
    fn test_failure_reason_without_assertion() {
        let input = "FAILED tests/test_x.py::test_y - widget count off";
        let data = parse(input);

        let result = &data.file_results[0].test_results[0];
        assert!(result.is_failure());
        assert_eq!(result.expected.as_deref(), Some("assertion to pass"));
        assert_eq!(result.actual.as_deref(), Some("widget count off"));
    }

    #[test]
    fn test_summary_only_synthesizes_placeholders() {
        let input = "===== 2 failed, 1 passed, 1 error in 0.5s =====";
        let data = parse(input);

        assert_eq!(data.total_tests, 4);
        assert_eq!(data.failed_tests, 2);
        assert_eq!(data.passed_tests, 1);
        assert_eq!(data.error_tests, 1);
        assert_eq!(data.total_files, 1);
        assert_eq!(data.file_results[0].file_path, "pytest_output");

        let tests = &data.file_results[0].test_results;
        assert_eq!(tests.len(), 4);
        assert_eq!(tests[0].name, "failed test 1");
        assert!(tests[2].is_error());
        assert!(tests[3].passed);
    }

    #[test]
    fn test_multiple_files_first_seen_order() {
        let input = "FAILED tests/test_b.py::test_one - x\n\
                     FAILED tests/test_a.py::test_two - y\n\
                     FAILED tests/test_b.py::test_three - z";
        let data = parse(input);

        assert_eq!(data.total_files, 2);
        assert_eq!(data.file_results[0].file_path, "tests/test_b.py");
        assert_eq!(data.file_results[0].test_results.len(), 2);
        assert_eq!(data.file_results[1].file_path, "tests/test_a.py");
    }

    #[test]
    fn test_clean_file_path() {
        assert_eq!(clean_file_path(""), "unknown");
        assert_eq!(clean_file_path("tests/test_a.py"), "tests/test_a.py");
        assert_eq!(clean_file_path("suite::tests/helpers"), "tests/helpers.py");
        assert_eq!(clean_file_path("test_widget"), "test_widget.py");
        assert_eq!(clean_file_path("plain"), "plain");
    }

    #[test]
    fn test_noise_lines_ignored() {
        let input = "collecting ...\nrandom chatter\nPASSED tests/test_a.py::test_x";
        let data = parse(input);
        assert_eq!(data.total_tests, 1);
        assert_eq!(data.passed_tests, 1);
    }
}
