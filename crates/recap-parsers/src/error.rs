// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for recap-parsers
//!
//! `ParseError` is internal: the public `parse` entry points never fail.
//! When structured parsing returns an error, the caller degrades to the
//! text-scan fallback and tags the result with this error's display text.

use thiserror::Error;

/// Errors from structured parsing, prior to fallback
#[derive(Debug, Error)]
pub enum ParseError {
    /// XML is not well-formed
    #[error("XML parse error: {0}")]
    Xml(String),

    /// XML declares a DOCTYPE with entity definitions; expansion is refused
    #[error("XML security error: entity processing forbidden")]
    ForbiddenEntities,

    /// The document root is not a recognized test-suite element
    #[error("unexpected root element: {tag}")]
    UnexpectedRoot {
        /// Tag name found at the document root
        tag: String,
    },

    /// JSON is not well-formed or not the expected shape
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parsed but required report structure is missing
    #[error("invalid report structure: {message}")]
    InvalidReport {
        /// Description of the missing or malformed structure
        message: String,
    },
}
