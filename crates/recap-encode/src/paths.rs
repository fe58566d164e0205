// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Display-path normalization
//!
//! Shortens and sanitizes file-path strings for compact, safe display in
//! reports. Pure string manipulation: no filesystem or working-directory
//! probing happens here.

/// Patterns that mark a path as unsafe to echo in full
const SUSPICIOUS_PATTERNS: &[&str] = &[
    "../",
    "..\\",
    "/etc/",
    "/proc/",
    "/sys/",
    "C:\\Windows",
    "C:\\System32",
];

/// Paths shorter than this are shown unchanged when already relative
const SHORT_PATH_CHARS: usize = 50;

/// Absolute limit before falling back to the basename
const MAX_PATH_CHARS: usize = 60;

/// Normalize a file path for token-efficient, safe display
#[must_use]
pub fn normalize_path(file_path: &str) -> String {
    if file_path.is_empty() {
        return "unknown".to_string();
    }

    if SUSPICIOUS_PATTERNS.iter().any(|p| file_path.contains(p)) {
        return basename(file_path);
    }

    let absolute = is_absolute(file_path);
    if !absolute && file_path.chars().count() < SHORT_PATH_CHARS {
        return file_path.to_string();
    }

    // Keep the last two components of deep paths; forward slashes for
    // consistency across platforms
    let parts: Vec<&str> = file_path
        .split(['/', '\\'])
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() > 3 {
        return parts[parts.len() - 2..].join("/");
    }

    if file_path.chars().count() > MAX_PATH_CHARS {
        return basename(file_path);
    }

    file_path.to_string()
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
        || path.starts_with('\\')
        || path
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() && path[1..].starts_with(":\\"))
}

fn basename(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
