//! Input-format detection and parser dispatch
//!
//! Detection is a pure function over the raw content; it never fails and
//! never panics. When no stronger signal is found the console-log parser
//! wins, since its heuristics tolerate anything.

use serde_json::Value;

use crate::schema::ParsedTestData;
use crate::{console, junit, rspec, tap};

/// The four supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// XML test-suite report (JUnit style)
    Junit,
    /// TAP line protocol
    Tap,
    /// JSON report with summary and examples (RSpec style)
    Rspec,
    /// Free-form console log, parsed heuristically
    Console,
}

impl InputFormat {
    /// Stable lowercase name, matching the CLI vocabulary
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Junit => "junit",
            Self::Tap => "tap",
            Self::Rspec => "rspec",
            Self::Console => "console",
        }
    }
}

/// Lexical markers that suggest console test output
const CONSOLE_MARKERS: &[&str] = &[
    "failed",
    "passed",
    "::test_",
    "collected",
    "assertions",
    "traceback",
    "assert ",
];

/// Detect the input format from raw content.
///
/// Detection order, first match wins: XML test-suite report, TAP plan or
/// version marker, JSON report carrying both `examples` and `summary`,
/// console lexical markers, then console as the absolute fallback. A failed
/// JSON parse during detection is swallowed and detection continues.
#[must_use]
pub fn detect_format(content: &str) -> InputFormat {
    let lower = content.trim().to_lowercase();

    if lower.starts_with("<?xml") && lower.contains("<testsuite") {
        return InputFormat::Junit;
    }

    if lower.starts_with("1..") || lower.starts_with("tap version") {
        return InputFormat::Tap;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(content) {
        if map.contains_key("examples") && map.contains_key("summary") {
            return InputFormat::Rspec;
        }
    }

    if CONSOLE_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return InputFormat::Console;
    }

    InputFormat::Console
}

/// Parse content with the named format's parser.
///
/// Never fails: every parser degrades to a text-scan fallback on malformed
/// input and always returns a usable aggregate.
#[must_use]
pub fn parse(content: &str, format: InputFormat) -> ParsedTestData {
    match format {
        InputFormat::Junit => junit::parse(content),
        InputFormat::Tap => tap::parse(content),
        InputFormat::Rspec => rspec::parse(content),
        InputFormat::Console => console::parse(content),
    }
}

/// Detect the format, then parse
#[must_use]
pub fn parse_auto(content: &str) -> ParsedTestData {
    parse(content, detect_format(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_junit() {
        let content = r#"<?xml version="1.0"?><testsuite name="s" tests="1"></testsuite>"#;
        assert_eq!(detect_format(content), InputFormat::Junit);
    }

    #[test]
    fn test_detect_xml_without_testsuite_is_not_junit() {
        let content = r#"<?xml version="1.0"?><report></report>"#;
        assert_eq!(detect_format(content), InputFormat::Console);
    }

    #[test]
    fn test_detect_tap_plan() {
        assert_eq!(detect_format("1..4\nok 1 - a"), InputFormat::Tap);
    }

    #[test]
    fn test_detect_tap_version() {
        assert_eq!(detect_format("TAP version 13\nok 1"), InputFormat::Tap);
    }

    #[test]
    fn test_detect_rspec_json() {
        let content = r#"{"examples": [], "summary": {"example_count": 0}}"#;
        assert_eq!(detect_format(content), InputFormat::Rspec);
    }

    #[test]
    fn test_detect_json_missing_summary_falls_through() {
        // Valid JSON but not a report shape; "examples" also isn't a console
        // marker, so this lands on the absolute fallback.
        let content = r#"{"examples": []}"#;
        assert_eq!(detect_format(content), InputFormat::Console);
    }

    #[test]
    fn test_detect_malformed_json_is_swallowed() {
        let content = "{not json but mentions passed tests";
        assert_eq!(detect_format(content), InputFormat::Console);
    }

    #[test]
    fn test_detect_console_markers() {
        assert_eq!(
            detect_format("FAILED tests/test_a.py::test_x - boom"),
            InputFormat::Console
        );
    }

    #[test]
    fn test_detect_empty_defaults_to_console() {
        assert_eq!(detect_format(""), InputFormat::Console);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(InputFormat::Junit.as_str(), "junit");
        assert_eq!(InputFormat::Tap.as_str(), "tap");
        assert_eq!(InputFormat::Rspec.as_str(), "rspec");
        assert_eq!(InputFormat::Console.as_str(), "console");
    }
}
