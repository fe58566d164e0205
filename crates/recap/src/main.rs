//! recap: condense test-runner output into a token-budgeted report
//!
//! This binary wires the pipeline together: read raw test output, detect
//! its format, parse it into the canonical model, encode it under the
//! token budget, and print the YAML report to stdout.

use anyhow::bail;
use clap::Parser;
use tracing::debug;

use recap::config::{Config, ReportVersion};
use recap::{context, input, render};
use recap_encode::{ReportEncoder, ReportEncoderV3, TokenBudget};
use recap_parsers::detect_format;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so stdout stays clean for the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    config.validate()?;

    let content = input::read_input(&config.input_file, config.max_input_size)?;
    if content.trim().is_empty() {
        bail!("no input provided");
    }

    let format = config
        .format
        .resolve()
        .unwrap_or_else(|| detect_format(&content));
    debug!(format = format.as_str(), "input format selected");

    let data = recap_parsers::parse(&content, format);
    debug!(
        total = data.total_tests,
        failed = data.failed_tests,
        errors = data.error_tests,
        "parsed test run"
    );

    let budget = TokenBudget::new(config.limit);
    let mode = config.mode.into();

    let tree = match config.report_version {
        ReportVersion::V3 => {
            let command = std::env::args().collect::<Vec<_>>().join(" ");
            let info = context::detect_context(&command);
            serde_json::to_value(ReportEncoderV3::new(mode, budget, command, info).encode(&data))?
        }
        ReportVersion::V2 => serde_json::to_value(ReportEncoder::new(mode, budget).encode(&data))?,
    };

    print!("{}", render::to_yaml(&tree));

    Ok(())
}
