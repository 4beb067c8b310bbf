use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::converter::{TranscoderConfig, UpscalerConfig};
use crate::obfuscator::ObfuscationConfig;
use crate::processor::ProcessorConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding one sub-directory per title.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,
    #[serde(default)]
    pub upscaler: UpscalerConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    /// Required by the obfuscation pass only.
    #[serde(default)]
    pub obfuscation: Option<ObfuscationConfig>,
}

fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            upscaler: UpscalerConfig::default(),
            transcoder: TranscoderConfig::default(),
            processor: ProcessorConfig::default(),
            obfuscation: None,
        }
    }
}

/// Sanitized config for logging (key material redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub content_dir: PathBuf,
    pub upscaler: UpscalerConfig,
    pub transcoder: TranscoderConfig,
    pub processor: ProcessorConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obfuscation: Option<SanitizedObfuscationConfig>,
}

/// Sanitized obfuscation config (key and IV hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedObfuscationConfig {
    pub key_configured: bool,
    pub marker: String,
    pub ordinal_width: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            content_dir: config.content_dir.clone(),
            upscaler: config.upscaler.clone(),
            transcoder: config.transcoder.clone(),
            processor: config.processor.clone(),
            obfuscation: config
                .obfuscation
                .as_ref()
                .map(|o| SanitizedObfuscationConfig {
                    key_configured: !o.key_hex.is_empty() && !o.iv_hex.is_empty(),
                    marker: o.marker.clone(),
                    ordinal_width: o.ordinal_width,
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.content_dir, PathBuf::from("content"));
        assert_eq!(config.processor.upscale_workers, 2);
        assert_eq!(config.upscaler.model, "models-cunet");
        assert!(config.obfuscation.is_none());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
content_dir = "/srv/manga"

[upscaler]
binary_path = "/opt/waifu2x/waifu2x-ncnn-vulkan"
gpu_id = 1

[transcoder]
extra_args = ["-mt"]

[processor]
compress_workers = 4

[obfuscation]
key_hex = "00"
iv_hex = "11"
marker = "Enc "
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("/srv/manga"));
        assert_eq!(config.upscaler.gpu_id, 1);
        assert_eq!(config.transcoder.extra_args, vec!["-mt"]);
        assert_eq!(config.processor.compress_workers, 4);
        assert_eq!(config.obfuscation.unwrap().marker, "Enc ");
    }

    #[test]
    fn test_sanitized_config_hides_key() {
        let config = Config {
            obfuscation: Some(ObfuscationConfig::new("a".repeat(64), "b".repeat(32))),
            ..Default::default()
        };
        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(json.contains("\"key_configured\":true"));
        assert!(!json.contains(&"a".repeat(64)));
    }
}
