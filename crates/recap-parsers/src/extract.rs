// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Shared extraction helpers
//!
//! Lexical heuristics used by every parser: line numbers, test-name
//! normalization, elapsed-time canonicalization, file-path recovery,
//! error-vs-failure keyword classification, expected/actual extraction,
//! and the degraded text-scan fallback for malformed input.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::schema::{ParsedFileResult, ParsedTestData, ParsedTestResult};

static LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:line|:)?\s*(\d+)").expect("line number pattern"));

static NAME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(test_?|it_?)").expect("name prefix pattern"));

static NAME_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)_test$").expect("name suffix pattern"));

// Ordered: seconds, milliseconds, microseconds (two spellings)
static TIME_SECONDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*s(?:ec(?:onds?)?)?").expect("seconds pattern"));
static TIME_MILLIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*ms(?:ec(?:onds?)?)?").expect("millis pattern"));
static TIME_MICROS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*(?:μs|us)").expect("micros pattern"));

static FILE_WITH_EXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z0-9_./\\-]+\.(?:rb|py|js|ts|java|php|go|rs|cpp|c|h))(?:\s|:|\[)")
        .expect("file extension pattern")
});
static FILE_PATH_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z0-9_./\\-]+/[a-zA-Z0-9_./\\-]+)").expect("path-like pattern")
});

// Comparison-phrase patterns, in precedence order. The assert form reverses
// which side is expected vs actual.
static EXPECTED_GOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)expected:\s*([^,\n]+).*?(?:got|actual):\s*([^,\n]+)")
        .expect("expected/got pattern")
});
static ASSERT_EQ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)assert\s+([^=\n]+)\s*==\s*([^,\n]+)").expect("assert pattern")
});
static EXPECTED_BUT_WAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)expected\s+([^,\n]+).*?(?:but\s+(?:was|got)|actual)\s+([^,\n]+)")
        .expect("expected/but-was pattern")
});

/// Keywords that classify free text as an error rather than a failure
const ERROR_INDICATORS: &[&str] = &[
    "error",
    "exception",
    "traceback",
    "stack trace",
    "undefined method",
    "no method",
    "null pointer",
    "syntax error",
    "runtime error",
    "fatal",
];

/// Extract a source line number from free text, if present
#[must_use]
pub fn extract_line_number(text: &str) -> Option<u32> {
    LINE_NUMBER
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Normalize a test name for display.
///
/// Strips `test_`/`it_` prefixes and `_test` suffixes, converts underscores
/// to spaces and collapses whitespace. Empty input becomes "unnamed test".
#[must_use]
pub fn normalize_test_name(name: &str) -> String {
    if name.is_empty() {
        return "unnamed test".to_string();
    }

    let name = NAME_PREFIX.replace(name, "");
    let name = NAME_SUFFIX.replace(&name, "");
    let name = name.replace('_', " ");
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

    if name.is_empty() {
        "unnamed test".to_string()
    } else {
        name
    }
}

/// Canonicalize an elapsed-time string into the smallest sensible unit.
///
/// Seconds below one become milliseconds, milliseconds below one become
/// microseconds. Strings with no recognizable unit are returned as-is.
#[must_use]
pub fn normalize_time(time_str: &str) -> Option<String> {
    if time_str.is_empty() {
        return None;
    }

    let time_str = time_str.trim().to_lowercase();

    if let Some(value) = first_number(&TIME_SECONDS, &time_str) {
        if value < 1.0 {
            return Some(format!("{}ms", (value * 1000.0) as u64));
        }
        return Some(format!("{value:.1}s"));
    }
    if let Some(value) = first_number(&TIME_MILLIS, &time_str) {
        if value < 1.0 {
            return Some(format!("{}μs", (value * 1000.0) as u64));
        }
        return Some(format!("{}ms", value as u64));
    }
    if let Some(value) = first_number(&TIME_MICROS, &time_str) {
        return Some(format!("{}μs", value as u64));
    }

    Some(time_str)
}

fn first_number(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract a file path from free text, if one appears
#[must_use]
pub fn extract_file_path(text: &str) -> Option<String> {
    if let Some(c) = FILE_WITH_EXT.captures(text) {
        return Some(c[1].to_string());
    }
    if let Some(c) = FILE_PATH_LIKE.captures(text) {
        return Some(c[1].to_string());
    }
    None
}

/// Whether free text reads like an error (exception) message
#[must_use]
pub fn is_error_message(text: &str) -> bool {
    let lower = text.to_lowercase();
    ERROR_INDICATORS.iter().any(|kw| lower.contains(kw))
}

/// Extract (expected, actual) values from assertion-failure text.
///
/// Patterns are tried in precedence order; the `assert X == Y` form puts the
/// actual value first, so its sides are swapped.
#[must_use]
pub fn extract_assertion_values(text: &str) -> Option<(String, String)> {
    if let Some(c) = EXPECTED_GOT.captures(text) {
        return Some((c[1].trim().to_string(), c[2].trim().to_string()));
    }
    if let Some(c) = ASSERT_EQ.captures(text) {
        // assert actual == expected
        return Some((c[2].trim().to_string(), c[1].trim().to_string()));
    }
    if let Some(c) = EXPECTED_BUT_WAS.captures(text) {
        return Some((c[1].trim().to_string(), c[2].trim().to_string()));
    }
    None
}

/// Degraded text-scan fallback for malformed structured input.
///
/// Keeps lines that mention any of `keywords`, classifies each by the error
/// keyword heuristic, and manufactures a single synthetic file result tagged
/// with the original parse-error text so the pipeline always terminates with
/// a usable aggregate.
#[must_use]
pub fn text_scan(
    content: &str,
    error_context: &str,
    fallback_path: &str,
    keywords: &[&str],
) -> ParsedTestData {
    debug!(fallback_path, error_context, "degrading to text scan");

    let mut test_results = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let lower = line.to_lowercase();
        if !keywords.iter().any(|kw| lower.contains(kw)) {
            continue;
        }

        let passed = !lower.contains("failure") && !lower.contains("error");
        let is_error = lower.contains("error");

        test_results.push(ParsedTestResult {
            name: normalize_test_name(line),
            line: None,
            passed,
            expected: (!passed && !is_error).then(|| "parse error".to_string()),
            actual: (!passed && !is_error).then(|| error_context.to_string()),
            error_message: is_error.then(|| line.to_string()),
        });
    }

    ParsedTestData::from_file_results(vec![ParsedFileResult::new(fallback_path, test_results)])
}
