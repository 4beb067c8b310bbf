//! Small async filesystem helpers shared by the stages.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::scheduler::{BatchError, TaskScheduler};

/// Concurrency used for bulk deletions.
pub const DELETE_WORKERS: usize = 10;

/// Returns the file name of a path as a lossy string.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Returns the extension of a path without the dot (empty if none).
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Returns the size of a file in bytes.
pub async fn file_size(path: &Path) -> std::io::Result<u64> {
    Ok(fs::metadata(path).await?.len())
}

/// Removes a file, treating an already-missing file as success.
///
/// Returns whether a file was actually removed.
pub async fn remove_if_exists(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Writes `contents` to `path` through a sibling temp file and a rename,
/// so readers never observe a partial file.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_file_name(format!(".{}.tmp", file_name(path)));
    fs::write(&tmp, contents).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}

/// Deletes a set of files with bounded concurrency.
///
/// Missing files are skipped. Returns how many files were removed.
pub async fn delete_files(paths: &[PathBuf]) -> Result<usize, BatchError<std::io::Error>> {
    if paths.is_empty() {
        return Ok(0);
    }

    let tasks: Vec<_> = paths
        .iter()
        .map(|path| move || remove_if_exists(path))
        .collect();

    let removed = TaskScheduler::new("delete", DELETE_WORKERS).run(tasks).await?;
    Ok(removed.into_iter().filter(|r| *r).count())
}
