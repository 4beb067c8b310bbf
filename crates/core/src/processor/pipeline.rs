//! Pipeline processor implementation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::converter::{Transcoder, Upscaler};
use crate::files::{file_name, resolve_file_set, scan_titles, FilesError, RAW_IMAGE_EXTENSIONS};
use crate::scheduler::TaskScheduler;

use super::commit::{
    clean_leftovers, finish_commit, read_commit_journal, read_commit_marker, CommitMarker,
    TitleTransaction,
};
use super::compress::run_compress_stage;
use super::config::ProcessorConfig;
use super::error::StageError;
use super::types::{PipelineStatus, RunReport, TitleOutcome};
use super::upscale::{derive_thumbnail, run_upscale_stage};

/// The upscale + compress pipeline.
///
/// Titles are processed strictly one at a time; within a title each stage
/// settles completely before the next one starts.
pub struct PipelineProcessor<U: Upscaler, T: Transcoder> {
    config: ProcessorConfig,
    upscaler: U,
    transcoder: T,
    upscale_pool: TaskScheduler,
    compress_pool: TaskScheduler,
}

impl<U: Upscaler, T: Transcoder> PipelineProcessor<U, T> {
    /// Creates a new pipeline processor.
    pub fn new(config: ProcessorConfig, upscaler: U, transcoder: T) -> Self {
        let upscale_pool = TaskScheduler::new("upscale", config.upscale_workers);
        let compress_pool = TaskScheduler::new("compress", config.compress_workers);

        Self {
            config,
            upscaler,
            transcoder,
            upscale_pool,
            compress_pool,
        }
    }

    /// Returns the processor configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Returns the current pool counters.
    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            upscale_pool: self.upscale_pool.status(),
            compress_pool: self.compress_pool.status(),
        }
    }

    /// Processes every title under `content_dir` in natural order.
    ///
    /// Stage failures are reported per title and do not stop the run.
    /// Enumeration errors are fatal.
    pub async fn run(&self, content_dir: &Path) -> Result<RunReport, FilesError> {
        let start = Instant::now();
        let titles = scan_titles(content_dir).await?;
        tracing::info!(
            content_dir = %content_dir.display(),
            titles = titles.len(),
            "Starting processing run"
        );

        let mut report = RunReport::default();
        for dir in &titles {
            report.push(self.process_title(dir).await?);
        }

        tracing::info!(
            processed = report.processed(),
            skipped = report.skipped(),
            failed = report.failed(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Processing run finished"
        );
        Ok(report)
    }

    /// Runs one title through upscale, compress and commit.
    pub async fn process_title(&self, dir: &Path) -> Result<TitleOutcome, FilesError> {
        let title = file_name(dir);

        if read_commit_marker(dir).await.is_some() {
            tracing::info!(title = %title, "Skipping title, already processed");
            return Ok(TitleOutcome::skipped(title, dir, "already processed"));
        }

        // Originals may already be gone, so the journal is the only way forward.
        if let Some(journal) = read_commit_journal(dir).await {
            tracing::warn!(title = %title, "Finishing interrupted commit");
            return Ok(match finish_commit(dir, journal).await {
                Ok(marker) => {
                    tracing::info!(
                        title = %title,
                        pages = marker.pages,
                        thumbnails = marker.thumbnails,
                        "Title processed"
                    );
                    TitleOutcome::processed(title, dir)
                }
                Err(e) => {
                    tracing::error!(title = %title, error = %e, "Commit failed");
                    TitleOutcome::failed(title, dir, e.stage(), e)
                }
            });
        }

        match clean_leftovers(dir).await {
            Ok(_) => {}
            Err(StageError::Files(e)) => return Err(e),
            Err(e) => {
                tracing::error!(title = %title, error = %e, "Failed to clean leftovers");
                return Ok(TitleOutcome::failed(title, dir, e.stage(), e));
            }
        }

        let set = resolve_file_set(dir, RAW_IMAGE_EXTENSIONS).await?;
        if set.is_empty() {
            tracing::info!(title = %title, "Skipping title, no raw pages");
            return Ok(TitleOutcome::skipped(title, dir, "no raw pages"));
        }

        tracing::info!(
            title = %title,
            pages = set.pages.len(),
            thumbnails = set.thumbnails.len(),
            "Processing title"
        );

        let mut txn = TitleTransaction::new(dir);
        match self
            .run_stages(&mut txn, &set.pages, &set.thumbnails)
            .await
        {
            Ok(marker) => {
                for original in set.pages.iter().chain(&set.thumbnails) {
                    txn.supersede(original);
                }
                match txn.commit(marker).await {
                    Ok(marker) => {
                        tracing::info!(
                            title = %title,
                            pages = marker.pages,
                            thumbnails = marker.thumbnails,
                            "Title processed"
                        );
                        Ok(TitleOutcome::processed(title, dir))
                    }
                    // The journal stays behind and the next run finishes the commit.
                    Err(e) => {
                        tracing::error!(title = %title, error = %e, "Commit failed");
                        Ok(TitleOutcome::failed(title, dir, e.stage(), e))
                    }
                }
            }
            Err(e) => {
                tracing::error!(title = %title, stage = %e.stage(), error = %e, "Stage failed");
                let stage = e.stage();
                let rollback = txn.rollback().await;
                if rollback.success() {
                    return Ok(TitleOutcome::failed(title, dir, stage, e));
                }

                tracing::warn!(
                    title = %title,
                    errors = ?rollback.errors,
                    "Title left with stage artifacts"
                );
                let error = format!(
                    "{e} (rollback left {} file(s) behind: {})",
                    rollback.errors.len(),
                    rollback.errors.join(", ")
                );
                Ok(TitleOutcome::failed(title, dir, stage, error))
            }
        }
    }

    async fn run_stages(
        &self,
        txn: &mut TitleTransaction,
        pages: &[PathBuf],
        thumbnails: &[PathBuf],
    ) -> Result<CommitMarker, StageError> {
        let mut thumbnails = thumbnails.to_vec();
        if thumbnails.is_empty() {
            if let Some(first) = pages.first() {
                thumbnails.push(derive_thumbnail(txn, first).await?);
            }
        }

        let enlarged = run_upscale_stage(
            &self.upscaler,
            &self.upscale_pool,
            &self.config,
            txn,
            pages,
        )
        .await?;

        run_compress_stage(
            &self.transcoder,
            &self.compress_pool,
            &self.config,
            txn,
            &enlarged,
            &thumbnails,
        )
        .await?;

        Ok(CommitMarker {
            pages: enlarged.len(),
            thumbnails: thumbnails.len(),
        })
    }
}
