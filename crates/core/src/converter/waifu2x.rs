//! waifu2x-ncnn-vulkan based upscaler implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::config::UpscalerConfig;
use super::error::ConverterError;
use super::process::{probe_binary, run_tool};
use super::traits::Upscaler;
use super::types::{ScaleFactor, UpscaleJob, UpscaleResult};

/// Upscaler backed by the waifu2x-ncnn-vulkan command line tool.
pub struct Waifu2xUpscaler {
    config: UpscalerConfig,
}

impl Waifu2xUpscaler {
    /// Creates a new upscaler with the given configuration.
    pub fn new(config: UpscalerConfig) -> Self {
        Self { config }
    }

    /// Creates an upscaler with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(UpscalerConfig::default())
    }

    /// Builds the tool arguments. Paths must already be absolute.
    fn build_args(&self, input_path: &Path, output_path: &Path, scale: ScaleFactor) -> Vec<String> {
        vec![
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-o".to_string(),
            output_path.to_string_lossy().to_string(),
            "-n".to_string(),
            self.config.noise_level.to_string(),
            "-s".to_string(),
            scale.value().to_string(),
            "-t".to_string(),
            self.config.tile_size.to_string(),
            "-m".to_string(),
            self.config.model.clone(),
            "-g".to_string(),
            self.config.gpu_id.to_string(),
            "-j".to_string(),
            self.config.jobs.clone(),
            "-f".to_string(),
            "png".to_string(),
        ]
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ConverterError> {
    Ok(std::path::absolute(path)?)
}

#[async_trait]
impl Upscaler for Waifu2xUpscaler {
    fn name(&self) -> &str {
        "waifu2x"
    }

    async fn upscale(&self, job: UpscaleJob) -> Result<UpscaleResult, ConverterError> {
        let start = Instant::now();

        if tokio::fs::metadata(&job.input_path).await.is_err() {
            return Err(ConverterError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        let input = absolute(&job.input_path)?;
        let output = absolute(&job.output_path)?;
        let args = self.build_args(&input, &output, job.scale);

        tracing::debug!(job_id = %job.job_id, scale = %job.scale, "Running waifu2x");
        run_tool(&self.config.binary_path, &args, self.config.timeout_secs).await?;

        // The tool can exit zero without writing anything (e.g. no GPU).
        if tokio::fs::metadata(&output).await.is_err() {
            return Err(ConverterError::OutputMissing { path: output });
        }

        Ok(UpscaleResult {
            job_id: job.job_id,
            output_path: job.output_path,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        probe_binary(&self.config.binary_path, "-h").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_x4() {
        let upscaler = Waifu2xUpscaler::with_defaults();
        let args = upscaler.build_args(
            Path::new("/content/Title/001.jpg"),
            Path::new("/content/Title/enlarged_001_upscaled.png"),
            ScaleFactor::X4,
        );

        assert_eq!(
            args,
            vec![
                "-i",
                "/content/Title/001.jpg",
                "-o",
                "/content/Title/enlarged_001_upscaled.png",
                "-n",
                "0",
                "-s",
                "4",
                "-t",
                "512",
                "-m",
                "models-cunet",
                "-g",
                "0",
                "-j",
                "2:2:2",
                "-f",
                "png",
            ]
        );
    }

    #[test]
    fn test_build_args_uses_config() {
        let upscaler = Waifu2xUpscaler::new(UpscalerConfig {
            tile_size: 128,
            gpu_id: 1,
            ..Default::default()
        });
        let args = upscaler.build_args(Path::new("/a.png"), Path::new("/b.png"), ScaleFactor::X2);
        let joined = args.join(" ");
        assert!(joined.contains("-s 2"));
        assert!(joined.contains("-t 128"));
        assert!(joined.contains("-g 1"));
    }

    #[tokio::test]
    async fn test_upscale_missing_input() {
        let upscaler = Waifu2xUpscaler::with_defaults();
        let result = upscaler
            .upscale(UpscaleJob {
                job_id: "job".to_string(),
                input_path: PathBuf::from("/nonexistent/001.png"),
                output_path: PathBuf::from("/nonexistent/out.png"),
                scale: ScaleFactor::X2,
            })
            .await;
        assert!(matches!(result, Err(ConverterError::InputNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_upscale_detects_missing_output() {
        let temp = tempfile::TempDir::new().unwrap();
        let input = temp.path().join("001.png");
        std::fs::write(&input, b"png").unwrap();

        // `true` ignores its arguments and exits zero without writing output.
        let upscaler = Waifu2xUpscaler::new(UpscalerConfig::with_binary(PathBuf::from("true")));
        let result = upscaler
            .upscale(UpscaleJob {
                job_id: "job".to_string(),
                input_path: input,
                output_path: temp.path().join("out.png"),
                scale: ScaleFactor::X2,
            })
            .await;
        assert!(matches!(result, Err(ConverterError::OutputMissing { .. })));
    }
}
