//! `tracing` setup for the binary.
//!
//! Events go to stderr. Stdout is reserved for command output (DIDs,
//! JSON-RPC responses, JWEs) so it can be piped.

use anyhow::{Context, Result};
use clap::ValueEnum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Shape of log lines on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `level` when set. Fails on a bad filter directive
/// or when a subscriber is already installed.
pub fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log filter {level:?}"))?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };
    installed.context("logging already initialized")?;
    tracing::debug!(?format, "logging ready");
    Ok(())
}
