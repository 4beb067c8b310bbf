//! File Set Resolver and Directory Scanner.

use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::naming::natural_cmp;

use super::error::FilesError;
use super::ops::file_name;

/// Extensions of raw pages accepted by the upscale/compress pipeline.
pub const RAW_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Extensions of canonical images accepted by the obfuscation pass.
pub const CANONICAL_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Filename prefix that marks a thumbnail.
pub const THUMBNAIL_PREFIX: &str = "thumbnail";

/// Pages and thumbnails of one title, each in natural order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    /// Page images, naturally sorted.
    pub pages: Vec<PathBuf>,
    /// Thumbnail images, naturally sorted.
    pub thumbnails: Vec<PathBuf>,
}

impl FileSet {
    /// Whether the title has no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Sorts paths in natural order of their file names.
pub fn sort_naturally(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
}

/// Lists the files in `dir` matching any of the `file_patterns`
/// (e.g. `*.png`), naturally sorted and without duplicates.
///
/// The directory part is escaped, so names such as `[Group] Title` or
/// `Why?` are matched literally. Matching is case-insensitive.
pub async fn search_files(dir: &Path, file_patterns: &[String]) -> Result<Vec<PathBuf>, FilesError> {
    let dir_str = dir.to_str().ok_or_else(|| FilesError::NonUtf8Path {
        path: dir.to_path_buf(),
    })?;
    let escaped = Pattern::escape(dir_str);
    let patterns: Vec<String> = file_patterns
        .iter()
        .map(|p| format!("{}/{}", escaped.trim_end_matches('/'), p))
        .collect();

    let mut found = tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>, FilesError> {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        let mut found = Vec::new();
        for pattern in &patterns {
            let entries = glob::glob_with(pattern, options).map_err(|e| {
                FilesError::InvalidPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                }
            })?;
            for entry in entries {
                let path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    FilesError::enumerate(path, e.into())
                })?;
                if path.is_file() {
                    found.push(path);
                }
            }
        }
        Ok(found)
    })
    .await
    .map_err(|e| FilesError::TaskFailed(e.to_string()))??;

    found.sort();
    found.dedup();
    sort_naturally(&mut found);
    Ok(found)
}

/// Builds `*.<ext>` patterns for a list of extensions.
pub fn extension_patterns<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| format!("*.{}", e.as_ref()))
        .collect()
}

/// Resolves the pages and thumbnails of a title directory.
pub async fn resolve_file_set(dir: &Path, extensions: &[&str]) -> Result<FileSet, FilesError> {
    let files = search_files(dir, &extension_patterns(extensions)).await?;

    let (thumbnails, pages): (Vec<PathBuf>, Vec<PathBuf>) = files
        .into_iter()
        .partition(|p| file_name(p).starts_with(THUMBNAIL_PREFIX));

    Ok(FileSet { pages, thumbnails })
}

/// Lists the title directories directly under `content_dir`, naturally
/// sorted by name.
pub async fn scan_titles(content_dir: &Path) -> Result<Vec<PathBuf>, FilesError> {
    let mut entries = fs::read_dir(content_dir)
        .await
        .map_err(|e| FilesError::enumerate(content_dir, e))?;

    let mut titles = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| FilesError::enumerate(content_dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| FilesError::enumerate(entry.path(), e))?;
        if file_type.is_dir() {
            titles.push(entry.path());
        }
    }

    sort_naturally(&mut titles);
    Ok(titles)
}
