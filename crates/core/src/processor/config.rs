//! Configuration for the processor module.

use serde::{Deserialize, Serialize};

/// Configuration for the upscale and compress stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Maximum parallel upscaler processes.
    #[serde(default = "default_upscale_workers")]
    pub upscale_workers: usize,

    /// Maximum parallel transcoder processes.
    #[serde(default = "default_compress_workers")]
    pub compress_workers: usize,

    /// Pages at least this wide are copied instead of upscaled.
    #[serde(default = "default_min_width_skip_upscale")]
    pub min_width_skip_upscale: u32,

    /// Pages narrower than this are upscaled x4, the rest x2.
    #[serde(default = "default_x4_below_width")]
    pub x4_below_width: u32,

    /// Width upscaled pages are resized to.
    #[serde(default = "default_ideal_page_width")]
    pub ideal_page_width: u32,

    /// Copied pages wider than this are shrunk to it.
    #[serde(default = "default_max_page_width")]
    pub max_page_width: u32,

    /// Width every thumbnail is resized to.
    #[serde(default = "default_ideal_thumbnail_width")]
    pub ideal_thumbnail_width: u32,

    /// Transcoder quality, 0-100.
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Digits used for page ordinals (`001`).
    #[serde(default = "default_ordinal_width")]
    pub ordinal_width: usize,
}

fn default_upscale_workers() -> usize {
    2
}

fn default_compress_workers() -> usize {
    3
}

fn default_min_width_skip_upscale() -> u32 {
    2000
}

fn default_x4_below_width() -> u32 {
    1000
}

fn default_ideal_page_width() -> u32 {
    2048
}

fn default_max_page_width() -> u32 {
    4096
}

fn default_ideal_thumbnail_width() -> u32 {
    600
}

fn default_quality() -> u8 {
    100
}

fn default_ordinal_width() -> usize {
    3
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            upscale_workers: default_upscale_workers(),
            compress_workers: default_compress_workers(),
            min_width_skip_upscale: default_min_width_skip_upscale(),
            x4_below_width: default_x4_below_width(),
            ideal_page_width: default_ideal_page_width(),
            max_page_width: default_max_page_width(),
            ideal_thumbnail_width: default_ideal_thumbnail_width(),
            quality: default_quality(),
            ordinal_width: default_ordinal_width(),
        }
    }
}

impl ProcessorConfig {
    /// Sets the worker counts of both stages.
    pub fn with_workers(mut self, upscale: usize, compress: usize) -> Self {
        self.upscale_workers = upscale;
        self.compress_workers = compress;
        self
    }

    /// Sets the transcoder quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }
}
