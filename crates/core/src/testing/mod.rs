//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external tool traits,
//! allowing whole titles to run through the pipeline without the real
//! upscaler or encoder installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use tankobon_core::testing::{fixtures, MockTranscoder, MockUpscaler};
//!
//! let title = fixtures::title_dir(content.path(), "Title");
//! fixtures::write_png(&title.join("001.png"), 800, 1200);
//!
//! let processor = PipelineProcessor::new(config, MockUpscaler::new(), MockTranscoder::new());
//! let report = processor.run(content.path()).await?;
//! ```

mod mock_converter;

pub use mock_converter::{MockTranscoder, MockUpscaler, OutputSize};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::obfuscator::ObfuscationKey;

    /// Create a title directory under `content_dir`.
    pub fn title_dir(content_dir: &Path, name: &str) -> PathBuf {
        let dir = content_dir.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Write a solid-colour PNG of the given size.
    pub fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]))
            .save(path)
            .unwrap();
    }

    /// List the file names of a directory, sorted bytewise.
    pub fn list_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    /// A fixed key/IV pair for tests.
    pub fn test_key() -> ObfuscationKey {
        ObfuscationKey::new([7u8; 32], [9u8; 16])
    }
}
