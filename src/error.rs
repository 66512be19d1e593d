//! Error types for the fallible edges of the crate.
//!
//! Only configuration resolution and export can fail. Recording a trace
//! never returns an error: misuse of the tracing surface degrades to a
//! silent no-op so the traced program's control flow is never altered.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for narrativetrace operations
#[derive(Debug, Error)]
pub enum Error {
    /// A level name that is not one of `off|errors|summary|narrative|detail`
    #[error("Unknown tracing level '{0}' (expected off, errors, summary, narrative or detail)")]
    InvalidLevel(String),

    /// A configuration file that exists but cannot be parsed
    #[error("Invalid configuration in {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    /// More than one configuration file competing for the same directory
    #[error("Found multiple configuration files: {}", format_paths(.0))]
    DuplicateConfiguration(Vec<PathBuf>),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid-config error for a file
    pub fn invalid_config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check whether this error came from configuration resolution
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidLevel(_) | Self::InvalidConfig { .. } | Self::DuplicateConfiguration(_)
        )
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
