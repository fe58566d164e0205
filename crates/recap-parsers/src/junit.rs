// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! XML test-suite report parser (JUnit style)
//!
//! Repairs common encoding defects (byte-order mark, unescaped ampersands,
//! double-encoded entities) before parsing, accepts either a single
//! `<testsuite>` or a `<testsuites>` collection root, and treats the
//! declared per-suite counts as authoritative over any recount. Input that
//! declares DOCTYPE entities is refused and degraded to the text-scan
//! fallback rather than expanded.

use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use tracing::warn;

use crate::error::ParseError;
use crate::extract;
use crate::schema::{ParsedFileResult, ParsedTestData, ParsedTestResult};

static DOUBLE_ENCODED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&amp;(amp|lt|gt|quot|apos);").expect("double-encoded pattern"));

static VALID_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:amp|lt|gt|quot|apos|#\d+|#x[0-9a-fA-F]+);").expect("entity pattern")
});

/// File extensions recognized when a suite name already looks like a filename
const KNOWN_EXTENSIONS: &[&str] = &[
    "java", "py", "rb", "js", "ts", "go", "rs", "cpp", "c", "h", "php",
];

/// Parse JUnit XML content. Never fails; malformed or entity-bearing XML
/// degrades to a text scan tagged with the parse-error context.
#[must_use]
pub fn parse(content: &str) -> ParsedTestData {
    if content.trim().is_empty() {
        return ParsedTestData::default();
    }

    match parse_document(content) {
        Ok(data) => data,
        Err(err) => {
            warn!(error = %err, "XML parsing failed, degrading to text scan");
            extract::text_scan(content, &err.to_string(), "junit_parse_error.xml", &[
                "test", "failure", "error",
            ])
        }
    }
}

/// Repair common XML defects: BOM, double-encoded entities, bare ampersands
fn clean_xml(content: &str) -> String {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    // "&amp;amp;" -> "&amp;", "&amp;lt;" -> "&lt;"
    let content = DOUBLE_ENCODED.replace_all(content, "&$1;");

    // Escape ampersands that do not start a valid entity reference
    let mut repaired = String::with_capacity(content.len());
    let mut rest = content.as_ref();
    while let Some(pos) = rest.find('&') {
        repaired.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        if VALID_ENTITY.is_match(after) {
            repaired.push('&');
        } else {
            repaired.push_str("&amp;");
        }
        rest = after;
    }
    repaired.push_str(rest);

    repaired.trim().to_string()
}

/// A testcase in flight: at most one failure and one error child
#[derive(Default)]
struct CaseState {
    name: String,
    line: Option<u32>,
    failure: Option<(String, String)>,
    error: Option<(String, String)>,
}

/// Which child element body text is currently being collected
enum ChildKind {
    Failure,
    Error,
}

fn parse_document(content: &str) -> Result<ParsedTestData, ParseError> {
    let cleaned = clean_xml(content);
    let mut reader = Reader::from_str(&cleaned);
    reader.config_mut().trim_text(true);

    let mut seen_root = false;
    let mut file_results: Vec<ParsedFileResult> = Vec::new();
    let mut total_tests = 0usize;
    let mut total_failures = 0usize;
    let mut total_errors = 0usize;
    let mut total_time = 0.0f64;

    let mut suite_path: Option<String> = None;
    let mut suite_tests: Vec<ParsedTestResult> = Vec::new();
    let mut case: Option<CaseState> = None;
    let mut child: Option<ChildKind> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::Xml(e.to_string()))?;

        match event {
            Event::DocType(text) => {
                let doctype = String::from_utf8_lossy(&text).to_uppercase();
                if doctype.contains("ENTITY") {
                    return Err(ParseError::ForbiddenEntities);
                }
            }
            Event::Start(ref e) | Event::Empty(ref e) => {
                let empty = matches!(event, Event::Empty(_));
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if !seen_root {
                    if tag != "testsuites" && tag != "testsuite" {
                        return Err(ParseError::UnexpectedRoot { tag });
                    }
                    seen_root = true;
                }

                match tag.as_str() {
                    "testsuite" => {
                        let name = attr(e, "name").unwrap_or_else(|| "unknown".to_string());
                        total_tests += attr_count(e, "tests");
                        total_failures += attr_count(e, "failures");
                        total_errors += attr_count(e, "errors");
                        total_time += attr(e, "time")
                            .and_then(|t| t.parse::<f64>().ok())
                            .unwrap_or(0.0);

                        suite_path = Some(suite_file_path(e, &name));
                        suite_tests = Vec::new();

                        if empty {
                            if let Some(path) = suite_path.take() {
                                file_results
                                    .push(ParsedFileResult::new(path, std::mem::take(&mut suite_tests)));
                            }
                        }
                    }
                    "testcase" => {
                        let state = CaseState {
                            name: attr(e, "name").unwrap_or_else(|| "unnamed test".to_string()),
                            line: attr(e, "line").and_then(|l| l.parse().ok()),
                            ..Default::default()
                        };
                        if empty {
                            suite_tests.push(finish_case(state));
                        } else {
                            case = Some(state);
                        }
                    }
                    "failure" if case.is_some() => {
                        let message = attr(e, "message").unwrap_or_default();
                        if let Some(c) = case.as_mut() {
                            c.failure = Some((message, String::new()));
                        }
                        if !empty {
                            child = Some(ChildKind::Failure);
                        }
                    }
                    "error" if case.is_some() => {
                        let message = attr(e, "message").unwrap_or_default();
                        if let Some(c) = case.as_mut() {
                            c.error = Some((message, String::new()));
                        }
                        if !empty {
                            child = Some(ChildKind::Error);
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(text) => {
                if let (Some(kind), Some(c)) = (&child, case.as_mut()) {
                    let decoded = text
                        .decode()
                        .map_err(|e| ParseError::Xml(e.to_string()))?;
                    let body = quick_xml::escape::unescape(&decoded)
                        .map_err(|e| ParseError::Xml(e.to_string()))?;
                    let slot = match kind {
                        ChildKind::Failure => c.failure.as_mut(),
                        ChildKind::Error => c.error.as_mut(),
                    };
                    if let Some((_, existing)) = slot {
                        existing.push_str(&body);
                    }
                }
            }
            Event::End(ref e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match tag.as_str() {
                    "failure" | "error" => child = None,
                    "testcase" => {
                        if let Some(state) = case.take() {
                            suite_tests.push(finish_case(state));
                        }
                    }
                    "testsuite" => {
                        if let Some(path) = suite_path.take() {
                            file_results
                                .push(ParsedFileResult::new(path, std::mem::take(&mut suite_tests)));
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(ParseError::Xml("no root element".to_string()));
    }

    let elapsed_time = if total_time > 0.0 {
        extract::normalize_time(&format!("{total_time}s"))
    } else {
        None
    };

    Ok(ParsedTestData {
        total_tests,
        passed_tests: total_tests.saturating_sub(total_failures + total_errors),
        failed_tests: total_failures,
        error_tests: total_errors,
        total_files: file_results.len(),
        elapsed_time,
        file_results,
    })
}

/// Build the final result for a closed testcase. An `<error>` child wins
/// over `<failure>` (mutually exclusive by format contract).
fn finish_case(state: CaseState) -> ParsedTestResult {
    let name = extract::normalize_test_name(&state.name);

    if let Some((message, body)) = state.error {
        let full = format!("{message}: {body}");
        let full = full.trim_matches([':', ' ']).to_string();
        return ParsedTestResult {
            name,
            line: state.line,
            passed: false,
            error_message: Some(full),
            ..Default::default()
        };
    }

    if let Some((message, body)) = state.failure {
        let full = format!("{message} {body}");
        let full = full.trim();
        let values = extract::extract_assertion_values(full);
        let (expected, actual) = match values {
            Some((e, a)) => (Some(e), Some(a)),
            None => (None, None),
        };
        return ParsedTestResult {
            name,
            line: state.line,
            passed: false,
            expected,
            actual,
            ..Default::default()
        };
    }

    ParsedTestResult {
        name,
        line: state.line,
        passed: true,
        ..Default::default()
    }
}

fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

fn attr_count(e: &BytesStart<'_>, name: &str) -> usize {
    attr(e, name).and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Recover a file path for a suite, by priority: explicit file attribute,
/// separator-bearing name, dotted package name converted to a path, bare
/// name with a default extension.
fn suite_file_path(e: &BytesStart<'_>, suite_name: &str) -> String {
    for key in ["file", "filename", "source"] {
        if let Some(path) = attr(e, key) {
            if !path.is_empty() {
                return path;
            }
        }
    }

    if suite_name.contains('/') || suite_name.contains('\\') {
        return suite_name.to_string();
    }

    if suite_name.contains('.') {
        // Already a filename with a known extension
        if let Some((_, ext)) = suite_name.rsplit_once('.') {
            if KNOWN_EXTENSIONS.contains(&ext) {
                return suite_name.to_string();
            }
        }
        // Package-style: com.example.FooTest -> com/example/FooTest.java
        let parts: Vec<&str> = suite_name.split('.').collect();
        if parts.len() > 1 {
            return format!("{}/{}.java", parts[..parts.len() - 1].join("/"), parts[parts.len() - 1]);
        }
    }

    format!("{suite_name}.java")
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
    fn test_parse_single_suite() {
        let xml = r#"<testsuite name="S" tests="2" failures="1"><testcase name="a"/><testcase name="b"><failure message="m">t</failure></testcase></testsuite>"#;
        let data = parse(xml);

        assert_eq!(data.total_tests, 2);
        assert_eq!(data.passed_tests, 1);
        assert_eq!(data.failed_tests, 1);
        assert_eq!(data.error_tests, 0);
        assert_eq!(data.file_results.len(), 1);
        assert_eq!(data.file_results[0].test_results.len(), 2);

        let second = &data.file_results[0].test_results[1];
        assert!(!second.passed);
        assert!(second.error_message.is_none());
    }

    #[test]
    fn test_parse_testsuites_collection_sums_declared_counts() {
        let xml = r#"<?xml version="1.0"?>
<testsuites>
  <testsuite name="a" tests="3" failures="1" errors="0" time="0.5">
    <testcase name="x"/>
    <testcase name="y"/>
    <testcase name="z"><failure message="nope"/></testcase>
  </testsuite>
  <testsuite name="b" tests="2" failures="0" errors="1" time="1.0">
    <testcase name="p"/>
    <testcase name="q"><error message="boom">trace</error></testcase>
  </testsuite>
</testsuites>"#;
        let data = parse(xml);

        assert_eq!(data.total_tests, 5);
        assert_eq!(data.passed_tests, 3);
        assert_eq!(data.failed_tests, 1);
        assert_eq!(data.error_tests, 1);
        assert_eq!(data.total_files, 2);
        assert_eq!(data.elapsed_time.as_deref(), Some("1.5s"));
    }

    #[test]
    fn test_declared_counts_win_over_recount() {
        // Declares 10 tests but carries only one testcase
        let xml = r#"<testsuite name="S" tests="10" failures="2" errors="1"><testcase name="a"/></testsuite>"#;
        let data = parse(xml);
        assert_eq!(data.total_tests, 10);
        assert_eq!(data.passed_tests, 7);
        assert_eq!(data.file_results[0].test_results.len(), 1);
    }

    #[test]
    fn test_error_child_classified_as_error() {
        let xml = r#"<testsuite name="S" tests="1" errors="1"><testcase name="t"><error message="NullPointerException">at Foo.java:3</error></testcase></testsuite>"#;
        let data = parse(xml);
        let result = &data.file_results[0].test_results[0];
        assert!(result.is_error());
        assert_eq!(
            result.error_message.as_deref(),
            Some("NullPointerException: at Foo.java:3")
        );
    }

    #[test]
    fn test_failure_extracts_expected_actual() {
        let xml = r#"<testsuite name="S" tests="1" failures="1"><testcase name="t"><failure message="expected: 5, got: 3"/></testcase></testsuite>"#;
        let data = parse(xml);
        let result = &data.file_results[0].test_results[0];
        assert!(result.is_failure());
        assert_eq!(result.expected.as_deref(), Some("5"));
        assert_eq!(result.actual.as_deref(), Some("3"));
    }

    #[test]
    fn test_file_attribute_preferred() {
        let xml = r#"<testsuite name="S" file="spec/foo_spec.rb" tests="1"><testcase name="a"/></testsuite>"#;
        let data = parse(xml);
        assert_eq!(data.file_results[0].file_path, "spec/foo_spec.rb");
    }

    #[test]
    fn test_package_name_converted_to_path() {
        let xml = r#"<testsuite name="com.example.FooTest" tests="1"><testcase name="a"/></testsuite>"#;
        let data = parse(xml);
        assert_eq!(data.file_results[0].file_path, "com/example/FooTest.java");
    }

    #[test]
    fn test_bare_name_gets_default_extension() {
        let xml = r#"<testsuite name="Widget" tests="1"><testcase name="a"/></testsuite>"#;
        let data = parse(xml);
        assert_eq!(data.file_results[0].file_path, "Widget.java");
    }

    #[test]
    fn test_malformed_xml_degrades_to_text_scan() {
        let content = "<testsuite><broken\nfailure in widget test";
        let data = parse(content);
        assert_eq!(data.total_files, 1);
        assert_eq!(data.file_results[0].file_path, "junit_parse_error.xml");
        assert!(data.failed_tests > 0 || data.error_tests > 0 || data.total_tests > 0);
    }

    #[test]
    fn test_entity_expansion_refused() {
        let xml = r#"<?xml version="1.0"?><!DOCTYPE testsuite [<!ENTITY x "boom">]><testsuite name="S" tests="1"><testcase name="&x;"/></testsuite>"#;
        let data = parse(xml);
        // Degraded, not expanded: the synthetic fallback file is present
        assert_eq!(data.file_results[0].file_path, "junit_parse_error.xml");
    }

    #[test]
    fn test_unexpected_root_degrades() {
        let xml = r#"<?xml version="1.0"?><report><item/></report>"#;
        let data = parse(xml);
        assert_eq!(data.file_results[0].file_path, "junit_parse_error.xml");
    }

    #[test]
    fn test_bom_and_bare_ampersand_repaired() {
        let xml = "\u{feff}<testsuite name=\"Tom & Jerry\" tests=\"1\"><testcase name=\"a\"/></testsuite>";
        let data = parse(xml);
        assert_eq!(data.total_tests, 1);
        assert_eq!(data.file_results[0].file_path, "Tom & Jerry.java");
    }

    #[test]
    fn test_clean_xml_double_encoded_entities() {
        assert_eq!(clean_xml("a &amp;amp; b"), "a &amp; b");
        assert_eq!(clean_xml("a &amp; b"), "a &amp; b");
        assert_eq!(clean_xml("a & b"), "a &amp; b");
        assert_eq!(clean_xml("ref &#39; ok"), "ref &#39; ok");
    }
}
