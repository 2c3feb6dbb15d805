//! Configuration for compilation time logging
//!
//! Settings come from environment variables, optionally layered over a TOML
//! file. Nothing configured means no function gets a timing breakdown.

pub mod error;

pub use crate::error::ConfigError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Comma-separated `<module>:<qualname>` patterns to capture timings for
pub const CAPTURE_TIMES_FOR_ENV: &str = "JITLOG_CAPTURE_COMPILATION_TIMES_FOR";
/// `table` or `json`
pub const REPORT_FORMAT_ENV: &str = "JITLOG_REPORT_FORMAT";

/// How finished phase reports are written to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Aligned text table
    #[default]
    Table,
    /// One JSON document per report
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(ReportFormat::Table),
            "json" => Ok(ReportFormat::Json),
            _ => Err(ConfigError::UnknownReportFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Table => f.write_str("table"),
            ReportFormat::Json => f.write_str("json"),
        }
    }
}

/// Compilation time logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeLogConfig {
    /// Raw selector list, e.g. `__main__:foo,mymod:*`
    pub capture_compilation_times_for: String,

    /// Output format for reports
    pub report_format: ReportFormat,
}

impl TimeLogConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key/value source shaped like the
    /// process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(list) = lookup(CAPTURE_TIMES_FOR_ENV) {
            config.capture_compilation_times_for = list;
        }

        if let Some(format) = lookup(REPORT_FORMAT_ENV)
            && let Ok(format) = format.parse()
        {
            config.report_format = format;
        }

        config
    }

    /// Load configuration from TOML file
    #[cfg(feature = "toml-config")]
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Load configuration from TOML file (stub when toml feature is disabled)
    #[cfg(not(feature = "toml-config"))]
    pub fn from_file(_path: &Path) -> Result<Self, ConfigError> {
        Err(ConfigError::TomlDisabled)
    }

    /// Merge with environment variables (env vars take precedence)
    pub fn merge_with_env(self) -> Self {
        self.merge_with_lookup(|key| std::env::var(key).ok())
    }

    pub fn merge_with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let overrides = Self::from_lookup(&lookup);

        if lookup(CAPTURE_TIMES_FOR_ENV).is_some() {
            self.capture_compilation_times_for = overrides.capture_compilation_times_for;
        }

        if lookup(REPORT_FORMAT_ENV).is_some() {
            self.report_format = overrides.report_format;
        }

        self
    }

    /// True if at least one non-empty selector entry is configured
    pub fn capture_enabled(&self) -> bool {
        self.capture_compilation_times_for
            .split(',')
            .any(|entry| !entry.is_empty())
    }
}
