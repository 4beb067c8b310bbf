//! Obfuscation pass over processed titles.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::catalog::{TitleMetadata, METADATA_FILE};
use crate::converter::probe_dimensions;
use crate::files::{
    delete_files, extension_of, extension_patterns, file_name, resolve_file_set, scan_titles,
    search_files, write_atomic, FilesError, CANONICAL_IMAGE_EXTENSIONS,
};
use crate::naming::{pad_ordinal, reverse_extension, NameCodec};
use crate::processor::{RunReport, Stage, TitleOutcome};

use super::cipher::ObfuscationKey;
use super::config::ObfuscationConfig;
use super::error::ObfuscateError;

/// Extensions of encrypted files (reversed `png`, `jpg`, `jpeg`, `webp`).
pub const TRACKED_EXTENSIONS: &[&str] = &["gnp", "gpj", "gepj", "pbew"];

/// Result of obfuscating one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObfuscationOutcome {
    /// The title had no pages.
    Skipped,
    /// Every file was encrypted and the metadata record written.
    Obfuscated {
        /// Directory after the rename.
        dir: PathBuf,
        /// Record written to `index.json`.
        metadata: TitleMetadata,
    },
}

/// Encrypts titles, scrambles their names and writes metadata records.
pub struct Obfuscator {
    key: ObfuscationKey,
    codec: NameCodec,
    ordinal_width: usize,
}

impl Obfuscator {
    /// Creates an obfuscator with an explicit key.
    pub fn new(key: ObfuscationKey, codec: NameCodec, ordinal_width: usize) -> Self {
        Self {
            key,
            codec,
            ordinal_width,
        }
    }

    /// Creates an obfuscator from configuration, decoding the hex key.
    pub fn from_config(config: &ObfuscationConfig) -> Result<Self, ObfuscateError> {
        Ok(Self::new(
            ObfuscationKey::from_config(config)?,
            NameCodec::new(config.marker.clone()),
            config.ordinal_width,
        ))
    }

    /// Returns the name codec.
    pub fn codec(&self) -> &NameCodec {
        &self.codec
    }

    /// Obfuscates every title under `content_dir` in natural order.
    ///
    /// A failing title is reported and the run continues. Enumeration
    /// errors are fatal.
    pub async fn run(&self, content_dir: &Path) -> Result<RunReport, FilesError> {
        let start = Instant::now();
        let titles = scan_titles(content_dir).await?;
        tracing::info!(
            content_dir = %content_dir.display(),
            titles = titles.len(),
            "Starting obfuscation run"
        );

        let mut report = RunReport::default();
        for dir in &titles {
            let title = file_name(dir);
            let outcome = match self.obfuscate_title(dir).await {
                Ok(ObfuscationOutcome::Skipped) => {
                    TitleOutcome::skipped(&title, dir, "no images")
                }
                Ok(ObfuscationOutcome::Obfuscated { dir, .. }) => {
                    TitleOutcome::processed(&title, dir)
                }
                Err(ObfuscateError::Files(e)) => return Err(e),
                Err(e) => {
                    tracing::error!(title = %title, error = %e, "Obfuscation failed");
                    TitleOutcome::failed(&title, dir, Stage::Obfuscate, e)
                }
            };
            report.push(outcome);
        }

        tracing::info!(
            obfuscated = report.processed(),
            skipped = report.skipped(),
            failed = report.failed(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Obfuscation run finished"
        );
        Ok(report)
    }

    /// Obfuscates one title directory.
    ///
    /// Stale encrypted files are deleted first, so the pass can be re-run.
    /// The metadata record is written last and only if everything else
    /// succeeded.
    pub async fn obfuscate_title(&self, dir: &Path) -> Result<ObfuscationOutcome, ObfuscateError> {
        let title = file_name(dir);
        let set = resolve_file_set(dir, CANONICAL_IMAGE_EXTENSIONS).await?;
        if set.is_empty() {
            tracing::info!(title = %title, "Skipping title, no images");
            return Ok(ObfuscationOutcome::Skipped);
        }

        let stale = search_files(dir, &extension_patterns(TRACKED_EXTENSIONS)).await?;
        if !stale.is_empty() {
            tracing::debug!(title = %title, count = stale.len(), "Removing stale encrypted files");
            delete_files(&stale).await.map_err(ObfuscateError::Cleanup)?;
        }

        for (i, thumbnail) in set.thumbnails.iter().enumerate() {
            let info = probe_dimensions(thumbnail).await?;
            let output = dir.join(format!(
                "thumbnail_{}-{}-{}.{}",
                i + 1,
                info.width,
                info.height,
                reverse_extension(&extension_of(thumbnail))
            ));
            self.encrypt(thumbnail, &output).await?;
        }

        let mut dimensions = Vec::with_capacity(set.pages.len());
        for (i, page) in set.pages.iter().enumerate() {
            let info = probe_dimensions(page).await?;
            let output = dir.join(format!(
                "{}.{}",
                pad_ordinal(i + 1, self.ordinal_width),
                reverse_extension(&extension_of(page))
            ));
            self.encrypt(page, &output).await?;
            dimensions.push([info.width, info.height]);
        }

        let name = self.codec.obfuscate(&title);
        let dir = if name == title {
            dir.to_path_buf()
        } else {
            self.rename_title(dir, &name).await?
        };

        let metadata = TitleMetadata { dimensions, name };
        let path = dir.join(METADATA_FILE);
        let body = serde_json::to_vec(&metadata).map_err(|e| ObfuscateError::Metadata {
            path: path.clone(),
            source: e.into(),
        })?;
        write_atomic(&path, &body)
            .await
            .map_err(|source| ObfuscateError::Metadata { path, source })?;

        tracing::info!(
            title = %title,
            name = %metadata.name,
            pages = metadata.dimensions.len(),
            thumbnails = set.thumbnails.len(),
            "Title obfuscated"
        );
        Ok(ObfuscationOutcome::Obfuscated { dir, metadata })
    }

    async fn encrypt(&self, input: &Path, output: &Path) -> Result<(), ObfuscateError> {
        self.key
            .encrypt_file(input, output)
            .await
            .map_err(|source| ObfuscateError::Encrypt {
                path: input.to_path_buf(),
                source,
            })?;
        Ok(())
    }

    async fn rename_title(&self, dir: &Path, name: &str) -> Result<PathBuf, ObfuscateError> {
        let target = dir.with_file_name(name);
        if tokio::fs::try_exists(&target).await.unwrap_or(true) {
            return Err(ObfuscateError::RenameTargetExists { path: target });
        }

        tokio::fs::rename(dir, &target)
            .await
            .map_err(|source| ObfuscateError::Rename {
                from: dir.to_path_buf(),
                to: target.clone(),
                source,
            })?;
        tracing::debug!(from = %dir.display(), to = %target.display(), "Renamed title");
        Ok(target)
    }
}
