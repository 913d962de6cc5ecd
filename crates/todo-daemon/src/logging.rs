//! Tracing subscriber setup

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Parse a configured level; anything unrecognised means `info`
pub fn level_filter(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::INFO)
}

/// Filter from `RUST_LOG`, falling back to the configured level
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_filter(level).into())
        .from_env_lossy()
}

/// Install the global subscriber
///
/// Fails if a subscriber was already installed.
pub fn init_tracing(level: &str, format: LogFormat) -> Result<(), String> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(level));

    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| error.to_string())
}
