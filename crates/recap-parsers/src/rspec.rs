// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! JSON test-report parser (RSpec style)
//!
//! Requires a root object with a `summary` object and an `examples` array;
//! anything else degrades to the text-scan fallback. Summary counts are
//! authoritative: passed is computed as total minus failed minus errors,
//! with pending examples counted as passed. Error vs failure classification
//! uses an allow-list of known assertion exception classes — anything not
//! on the list is an error.

use serde::Deserialize;
use tracing::warn;

use crate::error::ParseError;
use crate::extract;
use crate::schema::{ParsedFileResult, ParsedTestData, ParsedTestResult};

/// Exception classes that represent assertion failures, not errors
const ASSERTION_CLASSES: &[&str] = &[
    "RSpec::Expectations::ExpectationNotMetError",
    "ExpectationNotMetError",
    "Failure",
];

#[derive(Debug, Deserialize)]
struct JsonReport {
    #[serde(default)]
    summary: ReportSummary,
    examples: Vec<ReportExample>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportSummary {
    #[serde(default)]
    example_count: usize,
    #[serde(default)]
    failure_count: usize,
    #[serde(default)]
    error_count: usize,
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ReportExample {
    description: Option<String>,
    full_description: Option<String>,
    status: Option<String>,
    line_number: Option<u32>,
    file_path: Option<String>,
    exception: Option<ReportException>,
}

#[derive(Debug, Deserialize)]
struct ReportException {
    #[serde(rename = "class")]
    class_name: Option<String>,
    message: Option<String>,
}

/// Parse a JSON test report. Never fails; malformed JSON or a missing
/// report structure degrades to a text scan tagged with the parse error.
#[must_use]
pub fn parse(content: &str) -> ParsedTestData {
    if content.trim().is_empty() {
        return ParsedTestData::default();
    }

    match parse_report(content) {
        Ok(data) => data,
        Err(err) => {
            warn!(error = %err, "JSON report parsing failed, degrading to text scan");
            extract::text_scan(content, &err.to_string(), "rspec_parse_error.json", &[
                "example", "spec", "test", "failure", "error",
            ])
        }
    }
}

fn parse_report(content: &str) -> Result<ParsedTestData, ParseError> {
    let report: JsonReport = serde_json::from_str(content)?;

    let total_tests = report.summary.example_count;
    let failed_tests = report.summary.failure_count;
    let error_tests = report.summary.error_count;
    // Pending examples count as passed
    let passed_tests = total_tests.saturating_sub(failed_tests + error_tests);

    let elapsed_time = report
        .summary
        .duration
        .and_then(|d| extract::normalize_time(&format!("{d}s")));

    // Group by file path, first-seen order preserved
    let mut file_groups: Vec<(String, Vec<ParsedTestResult>)> = Vec::new();
    for example in &report.examples {
        let result = parse_example(example);
        let path = clean_file_path(example.file_path.as_deref().unwrap_or("unknown_spec.rb"));

        if let Some((_, tests)) = file_groups.iter_mut().find(|(p, _)| *p == path) {
            tests.push(result);
        } else {
            file_groups.push((path, vec![result]));
        }
    }

    let file_results: Vec<ParsedFileResult> = file_groups
        .into_iter()
        .map(|(path, tests)| ParsedFileResult::new(path, tests))
        .collect();

    Ok(ParsedTestData {
        total_tests,
        passed_tests,
        failed_tests,
        error_tests,
        total_files: file_results.len(),
        elapsed_time,
        file_results,
    })
}

fn parse_example(example: &ReportExample) -> ParsedTestResult {
    let description = example
        .full_description
        .as_deref()
        .or(example.description.as_deref())
        .unwrap_or("unnamed example");

    let status = example.status.as_deref().unwrap_or("unknown");
    let passed = status == "passed" || status == "pending";

    let mut result = ParsedTestResult {
        name: normalize_description(description),
        line: example.line_number,
        passed,
        ..Default::default()
    };

    if !passed {
        if let Some(exception) = &example.exception {
            let class_name = exception.class_name.as_deref().unwrap_or("");
            let message = exception.message.as_deref().unwrap_or("");
            let combined = format!("{class_name}: {message}");
            let combined = combined.trim_matches([':', ' ']).to_string();

            if is_assertion_class(class_name) {
                match extract::extract_assertion_values(message) {
                    Some((expected, actual)) => {
                        result.expected = Some(expected);
                        result.actual = Some(actual);
                    }
                    None => {
                        result.expected = Some("assertion to pass".to_string());
                        result.actual = Some(combined);
                    }
                }
            } else {
                result.error_message = Some(combined);
            }
        }
    }

    result
}

/// Descriptions are usually already prose; just collapse whitespace
fn normalize_description(description: &str) -> String {
    let collapsed = description.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        "unnamed example".to_string()
    } else {
        collapsed
    }
}

fn is_assertion_class(class_name: &str) -> bool {
    ASSERTION_CLASSES.contains(&class_name)
}

fn clean_file_path(path: &str) -> String {
    if path.is_empty() {
        return "unknown_spec.rb".to_string();
    }
    if path.to_lowercase().contains("spec") && !path.ends_with(".rb") {
        return format!("{path}.rb");
    }
    path.to_string()
}
