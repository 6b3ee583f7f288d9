//! Tracing subscriber setup for applications embedding the engine

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Variable read before `RUST_LOG`, so the engine can be tuned apart from
/// the embedding application.
pub const LOG_ENV: &str = "CONF_LOG";

/// Filter used when no variable is set. Failed parameters are logged at
/// warn, loads and merges at info.
pub const DEFAULT_DIRECTIVE: &str = "warn,conf_core=info,conf_drivers=info,conf_fs=info";

/// Install a compact subscriber writing to stderr with [`DEFAULT_DIRECTIVE`].
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_with(DEFAULT_DIRECTIVE)
}

/// Install a compact subscriber writing to stderr.
///
/// The filter comes from [`LOG_ENV`], then `RUST_LOG`, then `default`.
/// Fails if a global subscriber is already installed.
pub fn init_with(default: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter(default)?)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn filter(default: &str) -> Result<EnvFilter, ParseError> {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(default))
}
