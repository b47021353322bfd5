//! Tracing subscriber setup for the resolved log level.
//!
//! Logs go to stderr so that `--version --json` and the printed launch plan
//! stay machine-readable on stdout.

use codeport_config::LogLevel;
use tracing_subscriber::EnvFilter;

/// Filter for `level`, unless `rust_log` holds a valid directive string,
/// in which case that takes over.
pub fn env_filter(level: LogLevel, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(level.as_str()))
}

/// Install the global subscriber. Returns `false` if one was already
/// installed, which leaves the existing subscriber in place.
pub fn init(level: LogLevel) -> bool {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(level, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
