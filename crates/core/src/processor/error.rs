//! Error types for the processor module.

use std::path::PathBuf;
use thiserror::Error;

use crate::converter::ConverterError;
use crate::files::FilesError;
use crate::scheduler::BatchError;

use super::types::Stage;

/// Errors that abort a stage for one title.
///
/// A stage error is never fatal for the run: the title is rolled back and
/// the next one is processed.
#[derive(Debug, Error)]
pub enum StageError {
    /// One or more tasks of the batch failed.
    #[error("{stage} stage failed: {source}")]
    Batch {
        stage: Stage,
        #[source]
        source: BatchError<ConverterError>,
    },

    /// The auto-derived thumbnail could not be created.
    #[error("Failed to derive thumbnail {path}")]
    Thumbnail {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The commit journal could not be written.
    #[error("Failed to write commit journal {path}")]
    Journal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Deleting superseded files failed during commit.
    #[error("Failed to delete superseded files: {0}")]
    Cleanup(#[source] BatchError<std::io::Error>),

    /// Renaming a compressed output to its canonical name failed.
    #[error("Failed to promote {from} to {to}")]
    Promote {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The commit marker could not be written.
    #[error("Failed to write commit marker {path}")]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Enumerating the title's files failed.
    #[error(transparent)]
    Files(#[from] FilesError),
}

impl StageError {
    /// Wraps a failed batch of the given stage.
    pub fn batch(stage: Stage, source: BatchError<ConverterError>) -> Self {
        Self::Batch { stage, source }
    }

    /// Stage the error is attributed to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Batch { stage, .. } => *stage,
            Self::Thumbnail { .. } => Stage::Upscale,
            Self::Journal { .. }
            | Self::Cleanup(_)
            | Self::Promote { .. }
            | Self::Marker { .. } => Stage::Commit,
            Self::Files(_) => Stage::Resolve,
        }
    }
}
