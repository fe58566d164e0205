// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Integration tests: parsed input through both encoders

use recap_encode::prelude::*;
use recap_parsers::{InputFormat, parse};
use similar_asserts::assert_eq;

const JUNIT_REPORT: &str = r#"<testsuites>
  <testsuite name="widgets" tests="3" failures="1" errors="1" time="1.5">
    <testcase name="test_render"/>
    <testcase name="test_layout" line="10">
      <failure message="expected: 4, got: 7"/>
    </testcase>
    <testcase name="test_io">
      <error message="IOError">disk gone</error>
    </testcase>
  </testsuite>
</testsuites>"#;

fn parsed() -> recap_parsers::ParsedTestData {
    parse(JUNIT_REPORT, InputFormat::Junit)
}

#[test]
fn v2_failures_mode_end_to_end() {
    let report = ReportEncoder::new(FocusMode::Failures, TokenBudget::new(2000)).encode(&parsed());

    assert_eq!(report.version, "0.2");
    assert_eq!(report.summary.tests.total, 3);
    assert_eq!(report.summary.tests.failed, 1);
    assert_eq!(report.summary.tests.errors, 1);
    assert_eq!(report.summary.elapsed.as_deref(), Some("1.5s"));

    let failures = report.failures.expect("failures");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].file, "widgets.java");
    assert_eq!(failures[0].tests.len(), 2);
}

#[test]
fn v2_serialized_shape_omits_empty_fields() {
    let report = ReportEncoder::new(FocusMode::Summary, TokenBudget::new(2000)).encode(&parsed());
    let value = serde_json::to_value(&report).expect("serialize");
    let map = value.as_object().expect("object");

    assert!(map.contains_key("files_with_issues"));
    assert!(!map.contains_key("failures"));
}

#[test]
fn v3_report_places_context_before_content() {
    let report = ReportEncoderV3::new(
        FocusMode::Failures,
        TokenBudget::new(5000),
        "mvn test".to_string(),
        ContextInfo {
            pid: Some(7),
            project_type: Some(ProjectType::Java),
            ..Default::default()
        },
    )
    .encode(&parsed());

    let value = serde_json::to_value(&report).expect("serialize");
    let keys: Vec<String> = value
        .as_object()
        .expect("object")
        .keys()
        .cloned()
        .collect();

    assert_eq!(keys[0], "version");
    assert_eq!(keys[1], "context");
    assert!(keys.iter().position(|k| k == "failures").expect("failures") > 1);

    let context = value.get("context").expect("context block");
    assert_eq!(
        context.get("project_type").expect("project type"),
        "java"
    );
}

#[test]
fn both_encoders_agree_on_selection() {
    let data = parsed();

    let v2 = ReportEncoder::new(FocusMode::Critical, TokenBudget::new(2000)).encode(&data);
    let v3 = ReportEncoderV3::new(
        FocusMode::Critical,
        TokenBudget::new(2000),
        "x".to_string(),
        ContextInfo::default(),
    )
    .encode(&data);

    let v2_count: usize = v2
        .failures
        .expect("v2 failures")
        .iter()
        .map(|f| f.tests.len())
        .sum();
    let v3_count: usize = v3
        .failures
        .expect("v3 failures")
        .iter()
        .map(|f| f.tests.len())
        .sum();

    assert_eq!(v2_count, 1);
    assert_eq!(v2_count, v3_count);
}

#[test]
fn first_failure_emits_one_result_and_elided_count() {
    // Three non-passed results in one file
    let tap = "1..3\nnot ok 1 - a\nnot ok 2 - b\nnot ok 3 - c";
    let data = parse(tap, InputFormat::Tap);

    let report = ReportEncoder::new(FocusMode::FirstFailure, TokenBudget::new(2000)).encode(&data);
    let failures = report.failures.expect("failures");

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].tests.len(), 1);
    assert_eq!(failures[0].truncated, Some(2));
}
