//! Canonical test-run model
//!
//! Every parser produces these types and every encoder consumes them. The
//! classification rules are fixed: a non-passed result with an error message
//! is an *error*, a non-passed result without one is an assertion *failure*.

use serde::{Deserialize, Serialize};

/// Overall status of a test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    /// Every test passed
    Pass,
    /// At least one assertion failure, no errors
    Fail,
    /// At least one error (exception, crash, setup problem)
    Error,
}

/// A single test result from parsed input
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedTestResult {
    /// Test name (normalized for display)
    pub name: String,
    /// Source line number, when the input carried one
    pub line: Option<u32>,
    /// Whether the test passed
    pub passed: bool,
    /// Expected value from an assertion failure
    pub expected: Option<String>,
    /// Actual value from an assertion failure
    pub actual: Option<String>,
    /// Error text; presence classifies the result as an error
    pub error_message: Option<String>,
}

impl ParsedTestResult {
    /// Create a passing result
    #[must_use]
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            ..Self::default()
        }
    }

    /// An error (exception) rather than an assertion failure
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.passed && self.error_message.is_some()
    }

    /// An assertion failure
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.passed && self.error_message.is_none()
    }
}

/// One source file's results, in discovery order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedFileResult {
    /// File path as the input reported it (not yet sanitized for display)
    pub file_path: String,
    /// Results in insertion order; first-failure semantics depend on it
    pub test_results: Vec<ParsedTestResult>,
}

impl ParsedFileResult {
    /// Create a file result
    #[must_use]
    pub fn new(file_path: impl Into<String>, test_results: Vec<ParsedTestResult>) -> Self {
        Self {
            file_path: file_path.into(),
            test_results,
        }
    }

    /// Whether any result in this file is a failure or error
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.test_results.iter().any(|r| !r.passed)
    }

    /// Count of assertion failures (not errors)
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.test_results.iter().filter(|r| r.is_failure()).count()
    }

    /// Count of errors/exceptions
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.test_results.iter().filter(|r| r.is_error()).count()
    }
}

/// Aggregate data for one parsed test run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedTestData {
    /// Total test count (declared by the source format when available)
    pub total_tests: usize,
    /// Passed test count
    pub passed_tests: usize,
    /// Assertion-failure count
    pub failed_tests: usize,
    /// Error count
    pub error_tests: usize,
    /// Number of file results
    pub total_files: usize,
    /// Normalized elapsed-time string, e.g. "1.2s" or "525ms"
    pub elapsed_time: Option<String>,
    /// Per-file results in discovery order
    pub file_results: Vec<ParsedFileResult>,
}

impl ParsedTestData {
    /// Build an aggregate by tallying individual results.
    ///
    /// Used when the source format carries no authoritative summary counts;
    /// formats with declared counts construct the aggregate directly and
    /// those counts take precedence over any recount.
    #[must_use]
    pub fn from_file_results(file_results: Vec<ParsedFileResult>) -> Self {
        let all = || file_results.iter().flat_map(|f| f.test_results.iter());
        let total_tests = all().count();
        let passed_tests = all().filter(|r| r.passed).count();
        let failed_tests = all().filter(|r| r.is_failure()).count();
        let error_tests = all().filter(|r| r.is_error()).count();

        Self {
            total_tests,
            passed_tests,
            failed_tests,
            error_tests,
            total_files: file_results.len(),
            elapsed_time: None,
            file_results,
        }
    }

    /// Overall run status: errors dominate failures dominate pass
    #[must_use]
    pub fn overall_status(&self) -> TestStatus {
        if self.error_tests > 0 {
            TestStatus::Error
        } else if self.failed_tests > 0 {
            TestStatus::Fail
        } else {
            TestStatus::Pass
        }
    }

    /// Count of files that carry at least one failure or error
    #[must_use]
    pub fn files_with_failures(&self) -> usize {
        self.file_results.iter().filter(|f| f.has_issues()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing(name: &str) -> ParsedTestResult {
        ParsedTestResult {
            name: name.to_string(),
            passed: false,
            ..Default::default()
        }
    }

    fn erroring(name: &str) -> ParsedTestResult {
        ParsedTestResult {
            name: name.to_string(),
            passed: false,
            error_message: Some("boom".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_classification_exclusive() {
        let pass = ParsedTestResult::passed("a");
        assert!(!pass.is_error());
        assert!(!pass.is_failure());

        let fail = failing("b");
        assert!(fail.is_failure());
        assert!(!fail.is_error());

        let err = erroring("c");
        assert!(err.is_error());
        assert!(!err.is_failure());
    }

    #[test]
    fn test_tally_from_file_results() {
        let files = vec![
            ParsedFileResult::new("a.rs", vec![ParsedTestResult::passed("x"), failing("y")]),
            ParsedFileResult::new("b.rs", vec![erroring("z")]),
        ];
        let data = ParsedTestData::from_file_results(files);
        assert_eq!(data.total_tests, 3);
        assert_eq!(data.passed_tests, 1);
        assert_eq!(data.failed_tests, 1);
        assert_eq!(data.error_tests, 1);
        assert_eq!(data.total_files, 2);
        assert_eq!(
            data.total_tests,
            data.passed_tests + data.failed_tests + data.error_tests
        );
    }

    #[test]
    fn test_overall_status_precedence() {
        let mut data = ParsedTestData::default();
        assert_eq!(data.overall_status(), TestStatus::Pass);
        data.failed_tests = 1;
        assert_eq!(data.overall_status(), TestStatus::Fail);
        data.error_tests = 1;
        assert_eq!(data.overall_status(), TestStatus::Error);
    }

    #[test]
    fn test_files_with_failures() {
        let files = vec![
            ParsedFileResult::new("a.rs", vec![ParsedTestResult::passed("x")]),
            ParsedFileResult::new("b.rs", vec![failing("y")]),
        ];
        let data = ParsedTestData::from_file_results(files);
        assert_eq!(data.files_with_failures(), 1);
    }

    #[test]
    fn test_file_counts() {
        let file = ParsedFileResult::new("a.rs", vec![failing("x"), erroring("y")]);
        assert!(file.has_issues());
        assert_eq!(file.failure_count(), 1);
        assert_eq!(file.error_count(), 1);
    }
}
