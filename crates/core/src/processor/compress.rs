//! Compress stage: transcodes and resizes pages and thumbnails, keeping
//! whichever representation is smaller.

use std::path::{Path, PathBuf};

use crate::converter::{ConverterError, TranscodeJob, Transcoder};
use crate::files::{extension_of, file_name, file_size, remove_if_exists};
use crate::naming::pad_ordinal;
use crate::scheduler::TaskScheduler;

use super::commit::{TitleTransaction, COMPRESSED_PREFIX};
use super::config::ProcessorConfig;
use super::error::StageError;
use super::types::{CompressedFile, EnlargedPage, Enlargement, Stage};

/// One file to compress and the paths it may produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressTarget {
    /// Pre-transcode file.
    pub input: PathBuf,
    /// Transcoder output.
    pub transcoded: PathBuf,
    /// Copy of the input used when the transcode is not smaller.
    pub fallback: PathBuf,
    /// Canonical name without extension (`001`, `thumbnail_1`).
    pub canonical_stem: String,
    /// Resize target, if any.
    pub target_width: Option<u32>,
}

/// Width an enlarged page is resized to.
///
/// Upscaled pages always go to the ideal width; copied pages only shrink
/// when wider than the maximum.
pub fn page_target_width(page: &EnlargedPage, config: &ProcessorConfig) -> Option<u32> {
    match page.enlargement {
        Enlargement::Upscale(_) => Some(config.ideal_page_width),
        Enlargement::Copy if page.source_width > config.max_page_width => {
            Some(config.max_page_width)
        }
        Enlargement::Copy => None,
    }
}

fn target(
    dir: &Path,
    input: &Path,
    stem: String,
    target_width: Option<u32>,
    output_extension: &str,
) -> CompressTarget {
    CompressTarget {
        input: input.to_path_buf(),
        transcoded: dir.join(format!("{COMPRESSED_PREFIX}{stem}.{output_extension}")),
        fallback: dir.join(format!("{COMPRESSED_PREFIX}{stem}.{}", extension_of(input))),
        canonical_stem: stem,
        target_width,
    }
}

/// Plans one batch over the enlarged pages followed by the thumbnails.
pub fn plan_compress(
    dir: &Path,
    pages: &[EnlargedPage],
    thumbnails: &[PathBuf],
    config: &ProcessorConfig,
    output_extension: &str,
) -> Vec<CompressTarget> {
    let pages = pages.iter().map(|page| {
        target(
            dir,
            &page.path,
            pad_ordinal(page.ordinal, config.ordinal_width),
            page_target_width(page, config),
            output_extension,
        )
    });
    let thumbnails = thumbnails.iter().enumerate().map(|(i, thumb)| {
        target(
            dir,
            thumb,
            format!("thumbnail_{}", i + 1),
            Some(config.ideal_thumbnail_width),
            output_extension,
        )
    });
    pages.chain(thumbnails).collect()
}

/// Transcodes one file and keeps the smaller representation.
///
/// The transcoded file survives only when strictly smaller than the input;
/// otherwise it is deleted and the input is copied to the fallback path.
pub async fn compress_one<T: Transcoder + ?Sized>(
    transcoder: &T,
    job_id: String,
    target: &CompressTarget,
    quality: u8,
) -> Result<CompressedFile, ConverterError> {
    let result = transcoder
        .transcode(TranscodeJob {
            job_id,
            input_path: target.input.clone(),
            output_path: target.transcoded.clone(),
            target_width: target.target_width,
            quality,
        })
        .await?;

    let input_size = file_size(&target.input).await?;
    let dir = target.input.parent().unwrap_or_else(|| Path::new(""));

    if result.output_size_bytes < input_size {
        return Ok(CompressedFile {
            path: target.transcoded.clone(),
            canonical: dir.join(format!(
                "{}.{}",
                target.canonical_stem,
                extension_of(&target.transcoded)
            )),
            transcoded: true,
        });
    }

    tracing::debug!(
        input = %target.input.display(),
        input_size,
        output_size = result.output_size_bytes,
        "Transcode not smaller, keeping input"
    );
    remove_if_exists(&target.transcoded).await?;
    tokio::fs::copy(&target.input, &target.fallback).await?;

    Ok(CompressedFile {
        path: target.fallback.clone(),
        canonical: dir.join(format!(
            "{}.{}",
            target.canonical_stem,
            extension_of(&target.fallback)
        )),
        transcoded: false,
    })
}

/// Runs the compress stage as one batch over pages and thumbnails.
///
/// Both candidate outputs of every target are recorded in `txn` before the
/// batch starts. On success every survivor is registered for promotion.
pub(crate) async fn run_compress_stage<T: Transcoder + ?Sized>(
    transcoder: &T,
    pool: &TaskScheduler,
    config: &ProcessorConfig,
    txn: &mut TitleTransaction,
    pages: &[EnlargedPage],
    thumbnails: &[PathBuf],
) -> Result<Vec<CompressedFile>, StageError> {
    let title = file_name(txn.dir());
    let targets = plan_compress(
        txn.dir(),
        pages,
        thumbnails,
        config,
        transcoder.output_extension(),
    );

    for target in &targets {
        txn.record(&target.transcoded);
        txn.record(&target.fallback);
    }

    tracing::info!(
        title = %title,
        pages = pages.len(),
        thumbnails = thumbnails.len(),
        "Compressing"
    );

    let title = &title;
    let tasks: Vec<_> = targets
        .iter()
        .map(|target| {
            move || {
                let job_id = format!("{}-{}", title, target.canonical_stem);
                compress_one(transcoder, job_id, target, config.quality)
            }
        })
        .collect();

    let compressed = pool
        .run(tasks)
        .await
        .map_err(|e| StageError::batch(Stage::Compress, e))?;

    for file in &compressed {
        txn.promote(&file.path, &file.canonical);
    }

    let transcoded = compressed.iter().filter(|f| f.transcoded).count();
    tracing::debug!(
        title = %title,
        transcoded,
        kept = compressed.len() - transcoded,
        "Compress batch settled"
    );
    Ok(compressed)
}
