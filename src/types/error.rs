use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used by every fallible profiler operation.
pub type Result<T> = std::result::Result<T, ProfilerError>;

/// Errors surfaced by report rendering, option loading and logging setup.
///
/// Recording and snapshot operations never fail; only the outer surfaces that
/// touch I/O or parse external input return this type.
#[derive(Debug, Error)]
pub enum ProfilerError {
    /// Writing a report to its sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// JSON report serialization failed.
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// The options file could not be read.
    #[error("failed to read profiler options {path}: {source}")]
    ConfigRead {
        /// Path of the options file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The options file is not valid TOML for [`crate::ProfilerOptions`].
    #[error("failed to parse profiler options {path}: {source}")]
    ConfigParse {
        /// Path of the options file.
        path: PathBuf,
        /// Underlying parse failure.
        source: toml::de::Error,
    },
    /// A report format name was not recognised.
    #[error("unknown report format '{0}'")]
    UnknownFormat(String),
    /// The log filter directive could not be parsed.
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),
    /// A global tracing subscriber was already installed.
    #[error("logging already initialized")]
    LoggingInitialized,
}

impl ProfilerError {
    pub(crate) fn config_read(path: impl AsRef<Path>, source: io::Error) -> Self {
        ProfilerError::ConfigRead {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn config_parse(path: impl AsRef<Path>, source: toml::de::Error) -> Self {
        ProfilerError::ConfigParse {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
