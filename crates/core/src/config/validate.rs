use super::{types::Config, ConfigError};
use crate::obfuscator::ObfuscationKey;

/// Validate configuration
/// Currently validates:
/// - Worker counts and target widths are not 0
/// - Ideal page width does not exceed the maximum page width
/// - Quality is at most 100
/// - Obfuscation key/IV decode to 32/16 bytes and the marker is not blank
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let processor = &config.processor;

    if processor.upscale_workers == 0 || processor.compress_workers == 0 {
        return Err(ConfigError::ValidationError(
            "processor worker counts cannot be 0".to_string(),
        ));
    }

    if processor.ideal_page_width == 0
        || processor.max_page_width == 0
        || processor.ideal_thumbnail_width == 0
    {
        return Err(ConfigError::ValidationError(
            "processor target widths cannot be 0".to_string(),
        ));
    }

    if processor.ideal_page_width > processor.max_page_width {
        return Err(ConfigError::ValidationError(format!(
            "processor.ideal_page_width ({}) exceeds processor.max_page_width ({})",
            processor.ideal_page_width, processor.max_page_width
        )));
    }

    if processor.quality > 100 {
        return Err(ConfigError::ValidationError(format!(
            "processor.quality must be 0-100, got {}",
            processor.quality
        )));
    }

    if let Some(obfuscation) = &config.obfuscation {
        ObfuscationKey::from_config(obfuscation)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if obfuscation.marker.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "obfuscation.marker cannot be blank".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obfuscator::ObfuscationConfig;

    fn valid_obfuscation() -> ObfuscationConfig {
        ObfuscationConfig::new("ab".repeat(32), "cd".repeat(16))
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config {
            obfuscation: Some(valid_obfuscation()),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let mut config = Config::default();
        config.processor.compress_workers = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_ideal_wider_than_max_fails() {
        let mut config = Config::default();
        config.processor.ideal_page_width = 5000;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_page_width"));
    }

    #[test]
    fn test_validate_short_key_fails() {
        let config = Config {
            obfuscation: Some(ObfuscationConfig::new("abcd", "cd".repeat(16))),
            ..Default::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("key"));
    }

    #[test]
    fn test_validate_blank_marker_fails() {
        let mut obfuscation = valid_obfuscation();
        obfuscation.marker = "  ".to_string();
        let config = Config {
            obfuscation: Some(obfuscation),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
