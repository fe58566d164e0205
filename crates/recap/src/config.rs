//! Configuration for the recap CLI
//!
//! This module provides the clap-derived argument surface plus validation
//! and logging options.

use clap::{Parser, ValueEnum};

use recap_encode::FocusMode;
use recap_parsers::InputFormat;

/// recap - condense test-runner output into a token-budgeted report
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "recap")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Input file (use "-" or omit for stdin)
    #[arg(default_value = "-")]
    pub input_file: String,

    /// Input format
    ///
    /// "auto" inspects the content and picks the best parser.
    #[arg(short, long, value_enum, default_value_t = FormatArg::Auto, env = "RECAP_FORMAT")]
    pub format: FormatArg,

    /// Focus mode selecting which subset of results is emitted
    #[arg(short, long, value_enum, default_value_t = ModeArg::Failures, env = "RECAP_MODE")]
    pub mode: ModeArg,

    /// Token budget limit
    ///
    /// Zero or negative values are honored as a maximally restrictive
    /// budget rather than rejected.
    #[arg(short, long, default_value_t = 5000, env = "RECAP_LIMIT")]
    pub limit: i64,

    /// Report schema version to emit
    #[arg(long, value_enum, default_value_t = ReportVersion::V3)]
    pub report_version: ReportVersion,

    /// Maximum input size in megabytes
    #[arg(long, default_value_t = 50)]
    pub max_input_size: u64,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr to keep stdout clean for the report.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// Input format choice, including auto-detection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatArg {
    /// Inspect content and choose a parser
    #[default]
    Auto,
    /// JUnit XML test-suite report
    Junit,
    /// TAP line protocol
    Tap,
    /// RSpec-style JSON report
    Rspec,
    /// Free-form console log
    Console,
}

impl FormatArg {
    /// Resolve to a concrete format, `None` meaning auto-detect
    #[must_use]
    pub fn resolve(self) -> Option<InputFormat> {
        match self {
            Self::Auto => None,
            Self::Junit => Some(InputFormat::Junit),
            Self::Tap => Some(InputFormat::Tap),
            Self::Rspec => Some(InputFormat::Rspec),
            Self::Console => Some(InputFormat::Console),
        }
    }
}

/// Focus mode argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeArg {
    /// Aggregate counts and per-file issue counts only
    Summary,
    /// Errors only
    Critical,
    /// Every non-passed result
    #[default]
    Failures,
    /// First non-passed result per file
    FirstFailure,
    /// Alias of failures
    All,
}

impl From<ModeArg> for FocusMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Summary => FocusMode::Summary,
            ModeArg::Critical => FocusMode::Critical,
            ModeArg::Failures => FocusMode::Failures,
            ModeArg::FirstFailure => FocusMode::FirstFailure,
            ModeArg::All => FocusMode::All,
        }
    }
}

/// Output schema version
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportVersion {
    /// Legacy v0.2 schema
    V2,
    /// v0.3 schema with execution context
    #[default]
    V3,
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the input file is named but does not exist, or
    /// the size ceiling is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_file != "-" && !std::path::Path::new(&self.input_file).exists() {
            return Err(ConfigError::InputNotFound(self.input_file.clone()));
        }

        if self.max_input_size == 0 {
            return Err(ConfigError::ZeroSizeCeiling);
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input file not found
    #[error("input file not found: {0}")]
    InputNotFound(String),

    /// The input size ceiling cannot be zero
    #[error("maximum input size must be at least 1 MB")]
    ZeroSizeCeiling,
}
