//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::{TranscodeJob, TranscodeResult, UpscaleJob, UpscaleResult};

/// A super-resolution tool that enlarges images.
#[async_trait]
pub trait Upscaler: Send + Sync {
    /// Returns the name of this upscaler implementation.
    fn name(&self) -> &str;

    /// Upscales one image.
    ///
    /// Succeeds only if the tool exited cleanly and the output file exists.
    async fn upscale(&self, job: UpscaleJob) -> Result<UpscaleResult, ConverterError>;

    /// Validates that the upscaler is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;
}

/// An encoder that converts images to a compact format.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Extension of the files this transcoder produces.
    fn output_extension(&self) -> &str {
        "webp"
    }

    /// Transcodes one image.
    async fn transcode(&self, job: TranscodeJob) -> Result<TranscodeResult, ConverterError>;

    /// Validates that the transcoder is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;
}
