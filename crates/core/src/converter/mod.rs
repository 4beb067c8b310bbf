//! Converter module for the external image tools.
//!
//! This module provides the `Upscaler` and `Transcoder` traits and their
//! subprocess-backed implementations:
//!
//! - `Waifu2xUpscaler`: super-resolution via waifu2x-ncnn-vulkan (x2 / x4)
//! - `CwebpTranscoder`: WebP encoding with optional resize via cwebp
//! - `probe_dimensions`: pixel dimensions from the image header
//!
//! # Example
//!
//! ```ignore
//! use tankobon_core::converter::{Waifu2xUpscaler, Upscaler, UpscaleJob, ScaleFactor};
//!
//! let upscaler = Waifu2xUpscaler::with_defaults();
//! upscaler.validate().await?;
//!
//! let result = upscaler.upscale(UpscaleJob {
//!     job_id: "Title-001".to_string(),
//!     input_path: PathBuf::from("content/Title/001.jpg"),
//!     output_path: PathBuf::from("content/Title/enlarged_001_upscaled.png"),
//!     scale: ScaleFactor::X2,
//! }).await?;
//! println!("Upscaled in {} ms", result.duration_ms);
//! ```

mod config;
mod cwebp;
mod error;
mod probe;
mod process;
mod traits;
mod types;
mod waifu2x;

pub use config::{TranscoderConfig, UpscalerConfig};
pub use cwebp::CwebpTranscoder;
pub use error::ConverterError;
pub use probe::probe_dimensions;
pub use traits::{Transcoder, Upscaler};
pub use types::{
    ImageInfo, ScaleFactor, TranscodeJob, TranscodeResult, UpscaleJob, UpscaleResult,
};
pub use waifu2x::Waifu2xUpscaler;
