use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("TOML support not enabled. Enable the 'toml-config' feature.")]
    TomlDisabled,

    #[error("unknown report format: {0}")]
    UnknownReportFormat(String),
}
