//! Error types for the obfuscator module.

use std::path::PathBuf;
use thiserror::Error;

use crate::converter::ConverterError;
use crate::files::FilesError;
use crate::scheduler::BatchError;

/// Errors that can occur while obfuscating a title.
#[derive(Debug, Error)]
pub enum ObfuscateError {
    /// Key or IV is not valid hex of the right length.
    #[error("Invalid obfuscation key: {reason}")]
    InvalidKey { reason: String },

    /// Enumerating the title's files failed.
    #[error(transparent)]
    Files(#[from] FilesError),

    /// Stale encrypted files could not be removed.
    #[error("Failed to remove stale encrypted files: {0}")]
    Cleanup(#[source] BatchError<std::io::Error>),

    /// Reading image dimensions failed.
    #[error(transparent)]
    Probe(#[from] ConverterError),

    /// Encrypting a file failed.
    #[error("Failed to encrypt {path}")]
    Encrypt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Ciphertext is malformed or was produced with another key.
    #[error("Failed to decrypt: {reason}")]
    Decrypt { reason: String },

    /// Another directory already has the obfuscated name.
    #[error("Rename target already exists: {path}")]
    RenameTargetExists { path: PathBuf },

    /// Renaming the title directory failed.
    #[error("Failed to rename {from} to {to}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the metadata record failed.
    #[error("Failed to write metadata {path}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ObfuscateError {
    /// Creates an invalid key error.
    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }
}
