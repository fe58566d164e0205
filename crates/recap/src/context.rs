// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Execution-context probing
//!
//! Detects the environment values that the v0.3 encoder places in its
//! context block: process id, working directory, runtime string, package
//! manager, version control, environment snapshot, flags, and project
//! type. Everything here is best-effort: a failed probe yields `None`, and
//! the encoder omits absent fields.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use recap_encode::{ContextInfo, ProjectType};

/// Environment variables worth echoing into the report
const ENVIRONMENT_KEYS: &[&str] = &[
    "CI",
    "CONTINUOUS_INTEGRATION",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "JENKINS_URL",
    "RUST_LOG",
    "LANG",
    "TZ",
];

/// Marker files per project type, checked in order
const PROJECT_MARKERS: &[(ProjectType, &[&str])] = &[
    (ProjectType::Rust, &["Cargo.toml"]),
    (ProjectType::Python, &["pyproject.toml", "requirements.txt", "setup.py"]),
    (ProjectType::JavaScript, &["package.json"]),
    (ProjectType::Ruby, &["Gemfile"]),
    (ProjectType::Java, &["pom.xml", "build.gradle"]),
    (ProjectType::Go, &["go.mod"]),
];

/// Probe the local environment for context values
#[must_use]
pub fn detect_context(command: &str) -> ContextInfo {
    let project_type = detect_project_type(Path::new("."));

    ContextInfo {
        pid: Some(std::process::id()),
        pwd: std::env::current_dir()
            .ok()
            .map(|p| p.display().to_string()),
        runtime: Some(format!(
            "recap {} ({}-{})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        )),
        test_framework: Some("recap (isolated)".to_string()),
        package_manager: detect_package_manager(project_type),
        vcs: detect_vcs(),
        environment: detect_environment(),
        flags: extract_flags(command),
        project_type: Some(project_type),
    }
}

/// Detect the project type from marker files in `dir`
#[must_use]
pub fn detect_project_type(dir: &Path) -> ProjectType {
    for (project_type, markers) in PROJECT_MARKERS {
        if markers.iter().any(|marker| dir.join(marker).exists()) {
            return *project_type;
        }
    }
    ProjectType::Generic
}

/// Probe the package manager matching the project type
fn detect_package_manager(project_type: ProjectType) -> Option<String> {
    let (program, label) = match project_type {
        ProjectType::Rust => ("cargo", "cargo"),
        ProjectType::Python => ("pip", "pip"),
        ProjectType::JavaScript => ("npm", "npm"),
        ProjectType::Ruby => ("bundle", "bundler"),
        ProjectType::Java => ("mvn", "mvn"),
        ProjectType::Go => ("go", "go"),
        ProjectType::Generic => return None,
    };

    let output = Command::new(program).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().next()?.trim();

    // Pull a version-looking token out of the first line
    let version = first_line
        .split_whitespace()
        .find(|word| word.chars().next().is_some_and(|c| c.is_ascii_digit()))?;

    debug!(program, version, "detected package manager");
    Some(format!("{label} {version}"))
}

/// Probe git for "git <branch>@<short-sha>"
fn detect_vcs() -> Option<String> {
    let branch = git_output(&["rev-parse", "--abbrev-ref", "HEAD"])?;

    match git_output(&["rev-parse", "--short", "HEAD"]) {
        Some(commit) => Some(format!("git {branch}@{commit}")),
        None => Some(format!("git {branch}")),
    }
}

fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Snapshot the allow-listed environment variables plus RECAP_* overrides
fn detect_environment() -> Option<BTreeMap<String, String>> {
    let mut snapshot = BTreeMap::new();

    for key in ENVIRONMENT_KEYS {
        if let Ok(value) = std::env::var(key) {
            snapshot.insert((*key).to_string(), value);
        }
    }
    for (key, value) in std::env::vars() {
        if key.starts_with("RECAP_") {
            snapshot.insert(key, value);
        }
    }

    (!snapshot.is_empty()).then_some(snapshot)
}

/// Extract flag-looking words from the command line
fn extract_flags(command: &str) -> Option<Vec<String>> {
    let flags: Vec<String> = command
        .split_whitespace()
        .filter(|word| word.starts_with('-') && *word != "-")
        .map(ToString::to_string)
        .collect();

    (!flags.is_empty()).then_some(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_project_type_rust_marker() {
        // The workspace root carries a Cargo.toml
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        assert_eq!(detect_project_type(root), ProjectType::Rust);
    }

    #[test]
    fn test_detect_project_type_generic() {
        let empty = std::env::temp_dir().join(format!("recap-ctx-{}", std::process::id()));
        std::fs::create_dir_all(&empty).expect("create temp dir");
        assert_eq!(detect_project_type(&empty), ProjectType::Generic);
        let _ = std::fs::remove_dir(&empty);
    }

    #[test]
    fn test_extract_flags() {
        assert_eq!(
            extract_flags("recap --mode summary -v results.xml"),
            Some(vec!["--mode".to_string(), "-v".to_string()])
        );
        assert_eq!(extract_flags("recap results.xml"), None);
        assert_eq!(extract_flags("cat - | recap"), None);
    }

    #[test]
    fn test_detect_context_fills_required_probes() {
        let info = detect_context("recap --limit 100");
        assert!(info.pid.is_some());
        assert!(info.runtime.is_some());
        assert_eq!(
            info.flags,
            Some(vec!["--limit".to_string()])
        );
    }
}
