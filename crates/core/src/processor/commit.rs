//! Commit/rollback controller for one title.
//!
//! A [`TitleTransaction`] owns every file the upscale and compress stages
//! produce for a title. On failure it deletes them, leaving only the
//! pristine originals. On success it deletes the superseded originals and
//! intermediates, promotes the compressed outputs to their canonical names
//! and writes the commit marker.
//!
//! Before anything is deleted the commit is written to a journal. A commit
//! that fails or is interrupted past that point is finished by the next
//! run from the journal instead of being cleaned up as leftovers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::files::{delete_files, file_name, remove_if_exists, search_files, write_atomic};

use super::error::StageError;

/// File written into a title once its compress stage committed.
pub const COMMIT_MARKER_FILE: &str = ".tankobon-commit.json";

/// Journal of a commit in progress, removed once the marker is written.
pub const COMMIT_JOURNAL_FILE: &str = ".tankobon-journal.json";

/// Prefix of upscale stage outputs.
pub const ENLARGED_PREFIX: &str = "enlarged_";

/// Prefix of compress stage outputs.
pub const COMPRESSED_PREFIX: &str = "compressed_";

/// Contents of the commit marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMarker {
    /// Number of canonical pages.
    pub pages: usize,
    /// Number of canonical thumbnails.
    pub thumbnails: usize,
}

/// A rename recorded in the commit journal, by file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRename {
    pub from: String,
    pub to: String,
}

/// Everything a commit does, written before it deletes anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitJournal {
    /// Marker written when the commit completes.
    pub marker: CommitMarker,
    /// File names to delete.
    pub delete: Vec<String>,
    /// Renames to canonical names, in order.
    pub promote: Vec<JournalRename>,
}

/// Outcome of a rollback.
#[derive(Debug, Clone, Default)]
pub struct RollbackResult {
    /// Files actually removed.
    pub files_removed: usize,
    /// Files that could not be removed.
    pub errors: Vec<String>,
}

impl RollbackResult {
    /// Whether every artifact is gone.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A compressed output and the canonical name it takes on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Promotion {
    from: PathBuf,
    to: PathBuf,
}

/// Ledger of the files touched by a title's stages.
#[derive(Debug)]
pub struct TitleTransaction {
    dir: PathBuf,
    produced: Vec<PathBuf>,
    superseded: Vec<PathBuf>,
    promotions: Vec<Promotion>,
}

impl TitleTransaction {
    /// Starts a transaction for the title at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            produced: Vec::new(),
            superseded: Vec::new(),
            promotions: Vec::new(),
        }
    }

    /// Title directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Records a file a stage produces (or may produce).
    ///
    /// Paths are recorded before the work is scheduled, so a file that a
    /// failed task left half-written is still covered by rollback.
    pub fn record(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.produced.contains(&path) {
            self.produced.push(path);
        }
    }

    /// Records a pristine input that is deleted on commit.
    pub fn supersede(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.superseded.contains(&path) {
            self.superseded.push(path);
        }
    }

    /// Registers a produced file to be renamed on commit.
    pub fn promote(&mut self, from: impl Into<PathBuf>, to: impl Into<PathBuf>) {
        self.promotions.push(Promotion {
            from: from.into(),
            to: to.into(),
        });
    }

    /// Files recorded as produced so far.
    pub fn produced(&self) -> &[PathBuf] {
        &self.produced
    }

    /// Deletes every produced file. Originals are never touched.
    pub async fn rollback(self) -> RollbackResult {
        let result = match delete_files(&self.produced).await {
            Ok(files_removed) => RollbackResult {
                files_removed,
                errors: Vec::new(),
            },
            Err(batch) => RollbackResult {
                files_removed: batch.succeeded(),
                errors: batch
                    .failures
                    .iter()
                    .map(|f| format!("{}: {}", self.produced[f.index].display(), f.error))
                    .collect(),
            },
        };

        if result.success() {
            tracing::info!(
                dir = %self.dir.display(),
                files_removed = result.files_removed,
                "Rolled back title"
            );
        } else {
            tracing::warn!(
                dir = %self.dir.display(),
                errors = ?result.errors,
                "Rollback left files behind"
            );
        }
        result
    }

    /// Journals the commit, then deletes superseded originals and
    /// unpromoted intermediates, promotes the compressed outputs and writes
    /// the commit marker.
    ///
    /// On error the journal stays in place for [`finish_commit`].
    pub async fn commit(self, marker: CommitMarker) -> Result<CommitMarker, StageError> {
        let promoted: HashSet<&PathBuf> = self.promotions.iter().map(|p| &p.from).collect();
        let journal = CommitJournal {
            marker,
            delete: self
                .superseded
                .iter()
                .chain(self.produced.iter().filter(|p| !promoted.contains(p)))
                .map(|p| file_name(p))
                .collect(),
            promote: self
                .promotions
                .iter()
                .map(|p| JournalRename {
                    from: file_name(&p.from),
                    to: file_name(&p.to),
                })
                .collect(),
        };

        let path = self.dir.join(COMMIT_JOURNAL_FILE);
        let body = serde_json::to_vec(&journal).map_err(|e| StageError::Journal {
            path: path.clone(),
            source: e.into(),
        })?;
        write_atomic(&path, &body)
            .await
            .map_err(|source| StageError::Journal { path, source })?;

        finish_commit(&self.dir, journal).await
    }
}

/// Applies a commit journal and writes the commit marker.
///
/// Safe to repeat: a rename whose source is gone and whose target exists
/// already happened, and its target is not deleted again.
pub async fn finish_commit(dir: &Path, journal: CommitJournal) -> Result<CommitMarker, StageError> {
    let mut done = HashSet::new();
    for rename in &journal.promote {
        let from_exists = fs::try_exists(dir.join(&rename.from)).await.unwrap_or(true);
        let to_exists = fs::try_exists(dir.join(&rename.to)).await.unwrap_or(false);
        if !from_exists && to_exists {
            done.insert(rename.to.as_str());
        }
    }

    let doomed: Vec<PathBuf> = journal
        .delete
        .iter()
        .filter(|name| !done.contains(name.as_str()))
        .map(|name| dir.join(name))
        .collect();
    let removed = delete_files(&doomed).await.map_err(StageError::Cleanup)?;

    for rename in journal.promote.iter().filter(|r| !done.contains(r.to.as_str())) {
        let from = dir.join(&rename.from);
        let to = dir.join(&rename.to);
        fs::rename(&from, &to)
            .await
            .map_err(|source| StageError::Promote { from, to, source })?;
    }

    let path = dir.join(COMMIT_MARKER_FILE);
    let body = serde_json::to_vec(&journal.marker).map_err(|e| StageError::Marker {
        path: path.clone(),
        source: e.into(),
    })?;
    write_atomic(&path, &body)
        .await
        .map_err(|source| StageError::Marker { path, source })?;

    // The marker wins over a stale journal, so a failure here is harmless.
    if let Err(e) = remove_if_exists(&dir.join(COMMIT_JOURNAL_FILE)).await {
        tracing::warn!(dir = %dir.display(), error = %e, "Failed to remove commit journal");
    }

    tracing::debug!(
        dir = %dir.display(),
        removed,
        promoted = journal.promote.len() - done.len(),
        "Committed title"
    );
    Ok(journal.marker)
}

/// Reads the journal of an unfinished commit, if any.
pub async fn read_commit_journal(dir: &Path) -> Option<CommitJournal> {
    let body = fs::read(dir.join(COMMIT_JOURNAL_FILE)).await.ok()?;
    serde_json::from_slice(&body).ok()
}

/// Reads the commit marker of a title, if any.
pub async fn read_commit_marker(dir: &Path) -> Option<CommitMarker> {
    let body = fs::read(dir.join(COMMIT_MARKER_FILE)).await.ok()?;
    serde_json::from_slice(&body).ok()
}

/// Deletes `enlarged_*` and `compressed_*` files a crashed run left behind.
pub async fn clean_leftovers(dir: &Path) -> Result<usize, StageError> {
    let patterns = vec![
        format!("{ENLARGED_PREFIX}*"),
        format!("{COMPRESSED_PREFIX}*"),
    ];
    let leftovers = search_files(dir, &patterns).await?;
    if leftovers.is_empty() {
        return Ok(0);
    }

    tracing::info!(
        dir = %dir.display(),
        count = leftovers.len(),
        "Removing leftovers of an interrupted run"
    );
    delete_files(&leftovers).await.map_err(StageError::Cleanup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, name.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_rollback_removes_only_produced_files() {
        let temp = TempDir::new().unwrap();
        let original = touch(temp.path(), "001.png");
        let enlarged = touch(temp.path(), "enlarged_001_upscaled.png");
        let never_written = temp.path().join("compressed_001.webp");

        let mut txn = TitleTransaction::new(temp.path());
        txn.supersede(&original);
        txn.record(&enlarged);
        txn.record(&never_written);

        let result = txn.rollback().await;
        assert!(result.success());
        assert_eq!(result.files_removed, 1);
        assert!(original.exists());
        assert!(!enlarged.exists());
    }

    #[tokio::test]
    async fn test_commit_promotes_and_writes_marker() {
        let temp = TempDir::new().unwrap();
        let original = touch(temp.path(), "b.png");
        let thumb = touch(temp.path(), "thumbnail.png");
        let enlarged = touch(temp.path(), "enlarged_001.png");
        let compressed = touch(temp.path(), "compressed_001.webp");
        let compressed_thumb = touch(temp.path(), "compressed_thumbnail_1.webp");

        let mut txn = TitleTransaction::new(temp.path());
        txn.supersede(&original);
        txn.supersede(&thumb);
        txn.record(&enlarged);
        txn.record(&compressed);
        txn.record(&compressed_thumb);
        txn.record(temp.path().join("compressed_001.png"));
        txn.promote(&compressed, temp.path().join("001.webp"));
        txn.promote(&compressed_thumb, temp.path().join("thumbnail_1.webp"));

        let marker = CommitMarker {
            pages: 1,
            thumbnails: 1,
        };
        txn.commit(marker.clone()).await.unwrap();

        let mut names: Vec<String> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![COMMIT_MARKER_FILE, "001.webp", "thumbnail_1.webp"]
        );
        assert_eq!(read_commit_marker(temp.path()).await, Some(marker));
        assert!(read_commit_journal(temp.path()).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_promotion_is_finished_from_journal() {
        let temp = TempDir::new().unwrap();
        let original = touch(temp.path(), "001.png");
        let first = touch(temp.path(), "compressed_001.webp");
        let second = touch(temp.path(), "compressed_002.webp");
        // A directory in the way of the first rename.
        let blocker = temp.path().join("001.webp");
        std::fs::create_dir(&blocker).unwrap();
        touch(&blocker, "inside");

        let mut txn = TitleTransaction::new(temp.path());
        txn.supersede(&original);
        txn.record(&first);
        txn.record(&second);
        txn.promote(&first, temp.path().join("001.webp"));
        txn.promote(&second, temp.path().join("002.webp"));
        let marker = CommitMarker {
            pages: 2,
            thumbnails: 0,
        };

        let result = txn.commit(marker.clone()).await;
        assert!(matches!(result, Err(StageError::Promote { .. })));
        assert!(!original.exists());
        assert!(first.exists());
        assert!(read_commit_marker(temp.path()).await.is_none());

        std::fs::remove_dir_all(&blocker).unwrap();
        let journal = read_commit_journal(temp.path()).await.unwrap();
        assert_eq!(journal.delete, vec!["001.png"]);
        assert_eq!(finish_commit(temp.path(), journal).await.unwrap(), marker);

        let mut names: Vec<String> = std::fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec![COMMIT_MARKER_FILE, "001.webp", "002.webp"]);
        assert_eq!(std::fs::read(temp.path().join("001.webp")).unwrap(), b"compressed_001.webp");
    }

    #[tokio::test]
    async fn test_finish_commit_keeps_already_promoted_files() {
        let temp = TempDir::new().unwrap();
        // The original `001.png` was deleted and its replacement promoted
        // before the run stopped.
        std::fs::write(temp.path().join("001.png"), b"promoted").unwrap();
        touch(temp.path(), "compressed_002.png");

        let journal = CommitJournal {
            marker: CommitMarker {
                pages: 2,
                thumbnails: 0,
            },
            delete: vec!["001.png".to_string(), "002.png".to_string()],
            promote: vec![
                JournalRename {
                    from: "compressed_001.png".to_string(),
                    to: "001.png".to_string(),
                },
                JournalRename {
                    from: "compressed_002.png".to_string(),
                    to: "002.png".to_string(),
                },
            ],
        };

        finish_commit(temp.path(), journal).await.unwrap();
        assert_eq!(std::fs::read(temp.path().join("001.png")).unwrap(), b"promoted");
        assert_eq!(
            std::fs::read(temp.path().join("002.png")).unwrap(),
            b"compressed_002.png"
        );
        assert!(!temp.path().join(COMMIT_JOURNAL_FILE).exists());
    }

    #[tokio::test]
    async fn test_commit_fails_when_promotion_source_missing() {
        let temp = TempDir::new().unwrap();
        let mut txn = TitleTransaction::new(temp.path());
        txn.promote(temp.path().join("compressed_001.webp"), temp.path().join("001.webp"));

        let result = txn
            .commit(CommitMarker {
                pages: 1,
                thumbnails: 0,
            })
            .await;
        assert!(matches!(result, Err(StageError::Promote { .. })));
        assert!(read_commit_marker(temp.path()).await.is_none());
    }

    #[tokio::test]
    async fn test_clean_leftovers() {
        let temp = TempDir::new().unwrap();
        let page = touch(temp.path(), "001.png");
        touch(temp.path(), "enlarged_001_upscaled.png");
        touch(temp.path(), "compressed_thumbnail_1.webp");

        assert_eq!(clean_leftovers(temp.path()).await.unwrap(), 2);
        assert!(page.exists());
        assert_eq!(clean_leftovers(temp.path()).await.unwrap(), 0);
    }

    #[test]
    fn test_record_deduplicates() {
        let mut txn = TitleTransaction::new("/c/T");
        txn.record("/c/T/enlarged_001.png");
        txn.record("/c/T/enlarged_001.png");
        assert_eq!(txn.produced().len(), 1);
    }
}
