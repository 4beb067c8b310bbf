//! Upscale stage: brings every page of a title to a publishable width.

use std::path::{Path, PathBuf};

use crate::converter::{probe_dimensions, ConverterError, ScaleFactor, UpscaleJob, Upscaler};
use crate::files::{extension_of, file_name};
use crate::naming::pad_ordinal;
use crate::scheduler::{schedule, TaskScheduler};

use super::commit::{TitleTransaction, ENLARGED_PREFIX};
use super::config::ProcessorConfig;
use super::error::StageError;
use super::types::{EnlargedPage, Enlargement, Stage};

/// Width thresholds deciding how a page is enlarged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpscalePolicy {
    /// Pages at least this wide are copied.
    pub min_width_skip: u32,
    /// Pages narrower than this are upscaled x4.
    pub x4_below: u32,
}

impl Default for UpscalePolicy {
    fn default() -> Self {
        Self::from_config(&ProcessorConfig::default())
    }
}

impl UpscalePolicy {
    /// Takes the thresholds from the processor configuration.
    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self {
            min_width_skip: config.min_width_skip_upscale,
            x4_below: config.x4_below_width,
        }
    }

    /// Decides how a page of the given width is enlarged.
    pub fn enlargement_for(&self, width: u32) -> Enlargement {
        if width >= self.min_width_skip {
            Enlargement::Copy
        } else if width >= self.x4_below {
            Enlargement::Upscale(ScaleFactor::X2)
        } else {
            Enlargement::Upscale(ScaleFactor::X4)
        }
    }
}

/// Path of the enlarged file for a page.
///
/// Copies keep the original extension; upscaler output is always PNG.
pub fn enlarged_path(dir: &Path, ordinal: &str, source: &Path, enlargement: Enlargement) -> PathBuf {
    match enlargement {
        Enlargement::Copy => dir.join(format!(
            "{ENLARGED_PREFIX}{ordinal}.{}",
            extension_of(source)
        )),
        Enlargement::Upscale(_) => dir.join(format!("{ENLARGED_PREFIX}{ordinal}_upscaled.png")),
    }
}

/// Copies page 1 to `thumbnail.<ext>` when the title has no thumbnail.
///
/// The copy is recorded in the transaction, so rollback removes it and
/// commit replaces it with the compressed thumbnail.
pub(crate) async fn derive_thumbnail(
    txn: &mut TitleTransaction,
    first_page: &Path,
) -> Result<PathBuf, StageError> {
    let path = txn
        .dir()
        .join(format!("thumbnail.{}", extension_of(first_page)));
    txn.record(&path);

    tokio::fs::copy(first_page, &path)
        .await
        .map_err(|source| StageError::Thumbnail {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(path = %path.display(), "Derived thumbnail from first page");
    Ok(path)
}

/// Runs the upscale stage over the naturally sorted `pages` of a title.
///
/// Ordinals follow the order of `pages`. Every planned output is recorded
/// in `txn` before any task starts. Originals are left untouched.
pub(crate) async fn run_upscale_stage<U: Upscaler + ?Sized>(
    upscaler: &U,
    pool: &TaskScheduler,
    config: &ProcessorConfig,
    txn: &mut TitleTransaction,
    pages: &[PathBuf],
) -> Result<Vec<EnlargedPage>, StageError> {
    let policy = UpscalePolicy::from_config(config);
    let title = file_name(txn.dir());

    let probes: Vec<_> = pages.iter().map(|p| move || probe_dimensions(p)).collect();
    let infos = schedule(pool.limit(), probes)
        .await
        .map_err(|e| StageError::batch(Stage::Upscale, e))?;

    let plan: Vec<EnlargedPage> = pages
        .iter()
        .zip(infos)
        .enumerate()
        .map(|(i, (source, info))| {
            let ordinal = i + 1;
            let enlargement = policy.enlargement_for(info.width);
            let padded = pad_ordinal(ordinal, config.ordinal_width);
            EnlargedPage {
                ordinal,
                source: source.clone(),
                path: enlarged_path(txn.dir(), &padded, source, enlargement),
                source_width: info.width,
                enlargement,
            }
        })
        .collect();

    for page in &plan {
        txn.record(&page.path);
    }

    let upscaled = plan
        .iter()
        .filter(|p| matches!(p.enlargement, Enlargement::Upscale(_)))
        .count();
    tracing::info!(
        title = %title,
        pages = plan.len(),
        upscaled,
        copied = plan.len() - upscaled,
        "Upscaling pages"
    );

    let title = &title;
    let tasks: Vec<_> = plan
        .iter()
        .map(|page| {
            move || async move {
                match page.enlargement {
                    Enlargement::Copy => {
                        tokio::fs::copy(&page.source, &page.path).await?;
                    }
                    Enlargement::Upscale(scale) => {
                        upscaler
                            .upscale(UpscaleJob {
                                job_id: format!("{}-{}", title, page.ordinal),
                                input_path: page.source.clone(),
                                output_path: page.path.clone(),
                                scale,
                            })
                            .await?;
                    }
                }
                Ok::<(), ConverterError>(())
            }
        })
        .collect();

    pool.run(tasks)
        .await
        .map_err(|e| StageError::batch(Stage::Upscale, e))?;

    Ok(plan)
}
