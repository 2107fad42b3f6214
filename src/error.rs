//! Crate-level error type
//!
//! [`DocError`] covers everything outside a single scan: reading the project,
//! persisting settings and writing pages. Scanner failures are
//! [`ParseError`]s, wrapped here together with the file they came from.

use crate::parser::ParseError;
use std::path::PathBuf;

pub type Result<T, E = DocError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("I/O failure on {path:?}: {operation}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Source directory {0:?} does not exist")]
    MissingDirectory(PathBuf),

    #[error("Failed to walk {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Invalid settings file {path:?}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    #[error("Output directory {0:?} is not empty")]
    OutputNotEmpty(PathBuf),

    #[error("Export worker failed: {0}")]
    Worker(String),
}

impl DocError {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
