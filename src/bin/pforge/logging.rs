use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LoggingOptions;

pub const LOG_DIR: &str = "log";
pub const LOG_FILE: &str = "CreatePatranInputFile.log";

pub fn log_path(opts: &LoggingOptions, output_dir: &Path) -> PathBuf {
    opts.log_file
        .clone()
        .unwrap_or_else(|| output_dir.join(LOG_DIR).join(LOG_FILE))
}

/// Installs the file log (DEBUG unless `RUST_LOG` says otherwise) and, when
/// not quiet, a WARN mirror on stderr.
pub fn init(opts: &LoggingOptions, output_dir: &Path) -> Result<()> {
    let path = log_path(opts, output_dir);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory '{}'", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file '{}'", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let file_layer = fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(false);

    let stderr_layer = (!opts.quiet).then(|| {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .without_time()
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install the logger")?;

    tracing::debug!(path = %path.display(), "logging started");
    Ok(())
}
