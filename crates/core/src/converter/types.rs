//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Scale factor passed to the super-resolution tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleFactor {
    /// Double the width and height.
    X2,
    /// Quadruple the width and height.
    X4,
}

impl ScaleFactor {
    /// Returns the numeric factor.
    pub fn value(&self) -> u32 {
        match self {
            Self::X2 => 2,
            Self::X4 => 4,
        }
    }
}

impl std::fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.value())
    }
}

/// A request to upscale a single image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpscaleJob {
    /// Unique job identifier (used in logs).
    pub job_id: String,
    /// Input image.
    pub input_path: PathBuf,
    /// Output image; the tool always writes PNG.
    pub output_path: PathBuf,
    /// Scale factor.
    pub scale: ScaleFactor,
}

/// Result of a successful upscale.
#[derive(Debug, Clone)]
pub struct UpscaleResult {
    /// Job identifier.
    pub job_id: String,
    /// Path of the produced image.
    pub output_path: PathBuf,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// A request to transcode an image to the compact format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    /// Unique job identifier (used in logs).
    pub job_id: String,
    /// Input image.
    pub input_path: PathBuf,
    /// Output image.
    pub output_path: PathBuf,
    /// Resize to this width (height follows the aspect ratio).
    pub target_width: Option<u32>,
    /// Encoder quality, 0-100.
    pub quality: u8,
}

/// Result of a successful transcode.
#[derive(Debug, Clone)]
pub struct TranscodeResult {
    /// Job identifier.
    pub job_id: String,
    /// Path of the produced image.
    pub output_path: PathBuf,
    /// Size of the produced image in bytes.
    pub output_size_bytes: u64,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Image path.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}
