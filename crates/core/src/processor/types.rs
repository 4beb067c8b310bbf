//! Types for the processor module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::converter::ScaleFactor;
use crate::scheduler::PoolStatus;

/// Stage of the per-title lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Enumerating the title's files.
    Resolve,
    /// Upscaling narrow pages.
    Upscale,
    /// Transcoding and resizing.
    Compress,
    /// Promoting compressed outputs to canonical names.
    Commit,
    /// Encrypting and renaming.
    Obfuscate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolve => "resolve",
            Self::Upscale => "upscale",
            Self::Compress => "compress",
            Self::Commit => "commit",
            Self::Obfuscate => "obfuscate",
        };
        f.write_str(name)
    }
}

/// How one page is brought to the enlarged state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enlargement {
    /// Copied unchanged, already wide enough.
    Copy,
    /// Run through the upscaler.
    Upscale(ScaleFactor),
}

/// A page after the upscale stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnlargedPage {
    /// 1-based position in natural order of the original names.
    pub ordinal: usize,
    /// Original page file.
    pub source: PathBuf,
    /// Enlarged file handed to the compress stage.
    pub path: PathBuf,
    /// Width of the original page.
    pub source_width: u32,
    /// How the page was enlarged.
    pub enlargement: Enlargement,
}

/// A compress output waiting for promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedFile {
    /// File that survived the keep-smaller rule.
    pub path: PathBuf,
    /// Canonical name it is promoted to on commit.
    pub canonical: PathBuf,
    /// Whether the transcoded output was kept (otherwise the input was copied).
    pub transcoded: bool,
}

/// Final state of a title after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TitleStatus {
    /// Every stage succeeded.
    Processed,
    /// Nothing to do for this title.
    Skipped { reason: String },
    /// A stage failed and was rolled back.
    Failed { stage: Stage, error: String },
}

/// Outcome reported for each title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleOutcome {
    /// Directory name of the title when it was visited.
    pub title: String,
    /// Directory of the title after the run (renamed by obfuscation).
    pub dir: PathBuf,
    /// What happened.
    #[serde(flatten)]
    pub status: TitleStatus,
}

impl TitleOutcome {
    /// Creates a processed outcome.
    pub fn processed(title: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            dir: dir.into(),
            status: TitleStatus::Processed,
        }
    }

    /// Creates a skipped outcome.
    pub fn skipped(
        title: impl Into<String>,
        dir: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            dir: dir.into(),
            status: TitleStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    /// Creates a failed outcome.
    pub fn failed(
        title: impl Into<String>,
        dir: impl Into<PathBuf>,
        stage: Stage,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            title: title.into(),
            dir: dir.into(),
            status: TitleStatus::Failed {
                stage,
                error: error.to_string(),
            },
        }
    }

    /// Whether the title failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.status, TitleStatus::Failed { .. })
    }
}

/// Summary of a run over the content directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Per-title outcomes in visit order.
    pub titles: Vec<TitleOutcome>,
}

impl RunReport {
    /// Appends an outcome.
    pub fn push(&mut self, outcome: TitleOutcome) {
        self.titles.push(outcome);
    }

    /// Number of processed titles.
    pub fn processed(&self) -> usize {
        self.count(|s| matches!(s, TitleStatus::Processed))
    }

    /// Number of skipped titles.
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, TitleStatus::Skipped { .. }))
    }

    /// Number of failed titles.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, TitleStatus::Failed { .. }))
    }

    /// Whether any title failed.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&TitleStatus) -> bool) -> usize {
        self.titles.iter().filter(|t| pred(&t.status)).count()
    }
}

/// Overall pipeline status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStatus {
    /// Status of the upscale pool.
    pub upscale_pool: PoolStatus,
    /// Status of the compress pool.
    pub compress_pool: PoolStatus,
}
