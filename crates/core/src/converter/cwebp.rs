//! cwebp based transcoder implementation.

use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;

use super::config::TranscoderConfig;
use super::error::ConverterError;
use super::process::{probe_binary, run_tool};
use super::traits::Transcoder;
use super::types::{TranscodeJob, TranscodeResult};

/// Transcoder backed by the `cwebp` encoder.
pub struct CwebpTranscoder {
    config: TranscoderConfig,
}

impl CwebpTranscoder {
    /// Creates a new transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    /// Builds cwebp arguments.
    fn build_args(
        &self,
        input_path: &Path,
        output_path: &Path,
        target_width: Option<u32>,
        quality: u8,
    ) -> Vec<String> {
        let mut args = vec!["-quiet".to_string(), "-q".to_string(), quality.to_string()];

        // Height 0 keeps the aspect ratio
        if let Some(width) = target_width {
            args.extend(["-resize".to_string(), width.to_string(), "0".to_string()]);
        }

        args.extend(self.config.extra_args.iter().cloned());

        args.extend([
            input_path.to_string_lossy().to_string(),
            "-o".to_string(),
            output_path.to_string_lossy().to_string(),
        ]);

        args
    }
}

#[async_trait]
impl Transcoder for CwebpTranscoder {
    fn name(&self) -> &str {
        "cwebp"
    }

    async fn transcode(&self, job: TranscodeJob) -> Result<TranscodeResult, ConverterError> {
        let start = Instant::now();

        if tokio::fs::metadata(&job.input_path).await.is_err() {
            return Err(ConverterError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        let args = self.build_args(
            &job.input_path,
            &job.output_path,
            job.target_width,
            job.quality,
        );
        tracing::debug!(job_id = %job.job_id, width = ?job.target_width, "Running cwebp");
        run_tool(&self.config.binary_path, &args, self.config.timeout_secs).await?;

        let output_meta = tokio::fs::metadata(&job.output_path).await.map_err(|_| {
            ConverterError::OutputMissing {
                path: job.output_path.clone(),
            }
        })?;

        Ok(TranscodeResult {
            job_id: job.job_id,
            output_path: job.output_path,
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        probe_binary(&self.config.binary_path, "-version").await
    }
}
