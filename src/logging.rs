//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::types::{ProfilerError, Result};

/// Installs a global `tracing` subscriber filtered by `level`.
///
/// `level` accepts any `EnvFilter` directive such as `info` or
/// `callprof=debug`.
pub fn init_logging(level: &str) -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level).map_err(|e| ProfilerError::InvalidLogLevel(e.to_string()))?,
        )
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|_| ProfilerError::LoggingInitialized)
}
