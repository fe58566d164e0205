// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Bounded input reading
//!
//! Reads the raw test output from a file or stdin, enforcing a size
//! ceiling before and after the read so adversarially large inputs are
//! rejected instead of buffered.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, bail};
use tracing::debug;

/// Read from a file or stdin (`-`), capped at `max_size_mb` megabytes
pub fn read_input(input_file: &str, max_size_mb: u64) -> anyhow::Result<String> {
    let max_bytes = max_size_mb * 1024 * 1024;

    if input_file != "-" {
        let path = Path::new(input_file);

        let metadata = fs::metadata(path)
            .with_context(|| format!("cannot read file '{input_file}'"))?;
        if metadata.len() > max_bytes {
            bail!(
                "file '{}' is too large ({:.1}MB). Maximum size is {}MB",
                input_file,
                metadata.len() as f64 / (1024.0 * 1024.0),
                max_size_mb
            );
        }

        let content = fs::read(path)
            .with_context(|| format!("cannot read file '{input_file}'"))?;
        if content.len() as u64 > max_bytes {
            bail!("file content is too large. Maximum size is {max_size_mb}MB");
        }

        debug!(bytes = content.len(), "read input file");
        String::from_utf8(content)
            .with_context(|| format!("cannot decode '{input_file}' as UTF-8"))
    } else {
        let mut buffer = Vec::new();
        std::io::stdin()
            .lock()
            .take(max_bytes + 1)
            .read_to_end(&mut buffer)
            .context("cannot read stdin")?;

        if buffer.len() as u64 > max_bytes {
            bail!("input is too large. Maximum size is {max_size_mb}MB");
        }

        debug!(bytes = buffer.len(), "read stdin");
        String::from_utf8(buffer).context("cannot decode stdin as UTF-8")
    }
}
