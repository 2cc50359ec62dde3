//! Recorder configuration from defaults, the environment or a TOML file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::report::ReportFormat;
use crate::types::{ProfilerError, Result};

/// Presence of this variable enables the global recorder.
pub const PROFILE_ENV: &str = "CALLPROF_PROFILE";

/// Overrides [`ProfilerOptions::default_format`].
pub const FORMAT_ENV: &str = "CALLPROF_FORMAT";

/// Settings for a [`crate::Recorder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerOptions {
    /// Whether `record` and scope guards accumulate anything.
    pub enabled: bool,
    /// Format used when a caller does not pick one.
    pub default_format: ReportFormat,
    /// Name of the empty root snapshot with index zero.
    pub initial_snapshot_name: String,
    /// Name reported for the still-recording state.
    pub live_snapshot_name: String,
}

impl Default for ProfilerOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            default_format: ReportFormat::Html,
            initial_snapshot_name: "initial".to_owned(),
            live_snapshot_name: "current".to_owned(),
        }
    }
}

impl ProfilerOptions {
    /// Options for the process-wide recorder, read from the environment.
    ///
    /// Recording is enabled only when [`PROFILE_ENV`] is set. An unknown
    /// [`FORMAT_ENV`] value is logged and ignored.
    pub fn from_env() -> Self {
        let mut opts = Self {
            enabled: std::env::var_os(PROFILE_ENV).is_some(),
            ..Self::default()
        };
        if let Ok(value) = std::env::var(FORMAT_ENV) {
            match value.parse() {
                Ok(format) => opts.default_format = format,
                Err(err) => warn!(%err, "ignoring {FORMAT_ENV}"),
            }
        }
        opts
    }

    /// Reads options from a TOML file; missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|source| ProfilerError::config_read(path, source))?;
        Self::from_toml(&contents).map_err(|source| ProfilerError::config_parse(path, source))
    }

    fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
