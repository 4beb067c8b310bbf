//! Configuration for the external image tools.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the waifu2x-ncnn-vulkan upscaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpscalerConfig {
    /// Path to the waifu2x-ncnn-vulkan binary.
    #[serde(default = "default_waifu2x_path")]
    pub binary_path: PathBuf,

    /// Denoise level (-1 disables denoising).
    #[serde(default)]
    pub noise_level: i8,

    /// Tile size; lower values use less GPU memory.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Model directory name.
    #[serde(default = "default_model")]
    pub model: String,

    /// GPU device index (-1 for CPU).
    #[serde(default)]
    pub gpu_id: i32,

    /// Thread counts for load:proc:save.
    #[serde(default = "default_jobs")]
    pub jobs: String,

    /// Timeout for a single upscale in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Configuration for the cwebp transcoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Path to the cwebp binary.
    #[serde(default = "default_cwebp_path")]
    pub binary_path: PathBuf,

    /// Timeout for a single transcode in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Additional cwebp arguments placed before the input path.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_waifu2x_path() -> PathBuf {
    PathBuf::from("waifu2x-ncnn-vulkan")
}

fn default_cwebp_path() -> PathBuf {
    PathBuf::from("cwebp")
}

fn default_tile_size() -> u32 {
    512
}

fn default_model() -> String {
    "models-cunet".to_string()
}

fn default_jobs() -> String {
    "2:2:2".to_string()
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

impl Default for UpscalerConfig {
    fn default() -> Self {
        Self {
            binary_path: default_waifu2x_path(),
            noise_level: 0,
            tile_size: default_tile_size(),
            model: default_model(),
            gpu_id: 0,
            jobs: default_jobs(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            binary_path: default_cwebp_path(),
            timeout_secs: default_timeout(),
            extra_args: Vec::new(),
        }
    }
}

impl UpscalerConfig {
    /// Creates a config with a custom binary path.
    pub fn with_binary(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            ..Default::default()
        }
    }

    /// Sets the GPU device index.
    pub fn with_gpu(mut self, gpu_id: i32) -> Self {
        self.gpu_id = gpu_id;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl TranscoderConfig {
    /// Creates a config with a custom binary path.
    pub fn with_binary(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UpscalerConfig::default();
        assert_eq!(config.binary_path, PathBuf::from("waifu2x-ncnn-vulkan"));
        assert_eq!(config.tile_size, 512);
        assert_eq!(config.model, "models-cunet");
        assert_eq!(config.jobs, "2:2:2");
        assert_eq!(config.noise_level, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = UpscalerConfig::with_binary(PathBuf::from("/opt/waifu2x/waifu2x"))
            .with_gpu(-1)
            .with_timeout(60);

        assert_eq!(config.binary_path, PathBuf::from("/opt/waifu2x/waifu2x"));
        assert_eq!(config.gpu_id, -1);
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: TranscoderConfig = toml::from_str(r#"binary_path = "/usr/bin/cwebp""#).unwrap();
        assert_eq!(config.binary_path, PathBuf::from("/usr/bin/cwebp"));
        assert_eq!(config.timeout_secs, 3600);
        assert!(config.extra_args.is_empty());
    }
}
