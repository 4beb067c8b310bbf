//! Error types for the files module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while enumerating title directories.
///
/// These are fatal for a run: a directory that cannot be listed leaves no
/// reliable artifact inventory to commit or roll back.
#[derive(Debug, Error)]
pub enum FilesError {
    /// The generated glob pattern was rejected.
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A directory could not be listed.
    #[error("Failed to enumerate {path}: {source}")]
    Enumerate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Path cannot be embedded in a pattern.
    #[error("Path is not valid UTF-8: {path}")]
    NonUtf8Path { path: PathBuf },

    /// The blocking enumeration task panicked or was cancelled.
    #[error("Enumeration task failed: {0}")]
    TaskFailed(String),
}

impl FilesError {
    /// Creates a new enumeration error.
    pub fn enumerate(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Enumerate {
            path: path.into(),
            source,
        }
    }
}
