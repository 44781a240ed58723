use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogConfig;

/// Console plus `<dir>/<file>` logging. Keep the returned guard alive until exit
/// or buffered file lines are lost.
pub fn init_logging(log: &LogConfig, verbose: bool) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&log.dir)
        .with_context(|| format!("Failed to create log directory {}", log.dir))?;

    let file_appender = tracing_appender::rolling::never(&log.dir, &log.file);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(log, verbose)?)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn env_filter(log: &LogConfig, verbose: bool) -> Result<EnvFilter> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    build_filter(rust_log.as_deref(), log, verbose)
}

/// A non-empty `RUST_LOG` wins outright; otherwise `price_checker=<level>`.
fn build_filter(rust_log: Option<&str>, log: &LogConfig, verbose: bool) -> Result<EnvFilter> {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::try_new(directives)
            .with_context(|| format!("Invalid RUST_LOG: {}", directives));
    }

    let level = if verbose { "debug" } else { log.level.as_str() };
    EnvFilter::try_new(format!("price_checker={}", level))
        .with_context(|| format!("Invalid log level: {}", level))
}
