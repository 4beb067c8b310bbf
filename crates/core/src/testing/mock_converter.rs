//! Mock upscaler and transcoder for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{
    ConverterError, TranscodeJob, TranscodeResult, Transcoder, UpscaleJob, UpscaleResult,
    Upscaler,
};
use crate::files::file_name;

/// Tracks how many calls run at once.
#[derive(Debug, Default)]
struct Concurrency {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl Concurrency {
    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Shared failure and timing knobs of both mocks.
#[derive(Debug, Clone, Default)]
struct Behavior {
    /// Input file names whose jobs fail.
    failing_inputs: Arc<RwLock<HashSet<String>>>,
    /// Simulated duration of every call.
    delay: Arc<RwLock<Duration>>,
    concurrency: Arc<Concurrency>,
}

impl Behavior {
    async fn begin(&self, input: &Path) -> Result<(), ConverterError> {
        self.concurrency.enter();
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing_inputs.read().await.contains(&file_name(input)) {
            self.concurrency.leave();
            return Err(ConverterError::conversion_failed(
                format!("mock failure for {}", input.display()),
                Some("simulated".to_string()),
            ));
        }
        Ok(())
    }
}

/// Mock implementation of the Upscaler trait.
///
/// The "upscaled" output is a byte copy of the input, so fixtures stay
/// valid images with their original dimensions.
///
/// # Example
///
/// ```rust,ignore
/// use tankobon_core::testing::MockUpscaler;
///
/// let upscaler = MockUpscaler::new();
/// upscaler.fail_on("002.png").await;
///
/// // ... run the pipeline ...
///
/// let jobs = upscaler.recorded_jobs().await;
/// assert_eq!(jobs.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockUpscaler {
    jobs: Arc<RwLock<Vec<UpscaleJob>>>,
    behavior: Behavior,
}

impl MockUpscaler {
    /// Create a new mock upscaler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make jobs whose input has this file name fail.
    pub async fn fail_on(&self, input_name: &str) {
        self.behavior
            .failing_inputs
            .write()
            .await
            .insert(input_name.to_string());
    }

    /// Set the simulated duration of every job.
    pub async fn set_delay(&self, delay: Duration) {
        *self.behavior.delay.write().await = delay;
    }

    /// Get all recorded jobs, in submission order.
    pub async fn recorded_jobs(&self) -> Vec<UpscaleJob> {
        self.jobs.read().await.clone()
    }

    /// Highest number of jobs observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.behavior.concurrency.peak()
    }
}

#[async_trait]
impl Upscaler for MockUpscaler {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upscale(&self, job: UpscaleJob) -> Result<UpscaleResult, ConverterError> {
        self.jobs.write().await.push(job.clone());
        self.behavior.begin(&job.input_path).await?;

        let copied = tokio::fs::copy(&job.input_path, &job.output_path).await;
        self.behavior.concurrency.leave();
        copied?;

        Ok(UpscaleResult {
            job_id: job.job_id,
            output_path: job.output_path,
            duration_ms: 0,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}

/// Size of the files the mock transcoder writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSize {
    /// Copy the input, so the output is never strictly smaller.
    SameAsInput,
    /// Write this many bytes.
    Fixed(u64),
}

/// Mock implementation of the Transcoder trait.
#[derive(Debug, Clone)]
pub struct MockTranscoder {
    jobs: Arc<RwLock<Vec<TranscodeJob>>>,
    output_size: Arc<RwLock<OutputSize>>,
    behavior: Behavior,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a mock transcoder that writes one-byte outputs.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(Vec::new())),
            output_size: Arc::new(RwLock::new(OutputSize::Fixed(1))),
            behavior: Behavior::default(),
        }
    }

    /// Set the size of produced files.
    pub async fn set_output_size(&self, size: OutputSize) {
        *self.output_size.write().await = size;
    }

    /// Make jobs whose input has this file name fail.
    pub async fn fail_on(&self, input_name: &str) {
        self.behavior
            .failing_inputs
            .write()
            .await
            .insert(input_name.to_string());
    }

    /// Set the simulated duration of every job.
    pub async fn set_delay(&self, delay: Duration) {
        *self.behavior.delay.write().await = delay;
    }

    /// Get all recorded jobs, in submission order.
    pub async fn recorded_jobs(&self) -> Vec<TranscodeJob> {
        self.jobs.read().await.clone()
    }

    /// Highest number of jobs observed running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.behavior.concurrency.peak()
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(&self, job: TranscodeJob) -> Result<TranscodeResult, ConverterError> {
        self.jobs.write().await.push(job.clone());
        self.behavior.begin(&job.input_path).await?;

        let size = *self.output_size.read().await;
        let written = match size {
            OutputSize::SameAsInput => tokio::fs::copy(&job.input_path, &job.output_path).await,
            OutputSize::Fixed(bytes) => tokio::fs::write(&job.output_path, vec![0u8; bytes as usize])
                .await
                .map(|_| bytes),
        };
        self.behavior.concurrency.leave();

        Ok(TranscodeResult {
            job_id: job.job_id,
            output_path: job.output_path,
            output_size_bytes: written?,
            duration_ms: 0,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::ScaleFactor;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mock_upscaler_copies_and_records() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("001.png");
        std::fs::write(&input, b"page").unwrap();
        let upscaler = MockUpscaler::new();

        upscaler
            .upscale(UpscaleJob {
                job_id: "T-1".to_string(),
                input_path: input,
                output_path: temp.path().join("out.png"),
                scale: ScaleFactor::X2,
            })
            .await
            .unwrap();

        assert_eq!(std::fs::read(temp.path().join("out.png")).unwrap(), b"page");
        assert_eq!(upscaler.recorded_jobs().await.len(), 1);
        assert_eq!(upscaler.peak_concurrency(), 1);
    }

    #[tokio::test]
    async fn test_mock_transcoder_injected_failure() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("002.png");
        std::fs::write(&input, b"page").unwrap();
        let transcoder = MockTranscoder::new();
        transcoder.fail_on("002.png").await;

        let result = transcoder
            .transcode(TranscodeJob {
                job_id: "T-2".to_string(),
                input_path: input,
                output_path: temp.path().join("out.webp"),
                target_width: None,
                quality: 100,
            })
            .await;

        assert!(matches!(result, Err(ConverterError::ConversionFailed { .. })));
        assert!(!temp.path().join("out.webp").exists());
    }

    #[tokio::test]
    async fn test_mock_transcoder_fixed_size() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("001.png");
        std::fs::write(&input, vec![1u8; 100]).unwrap();
        let transcoder = MockTranscoder::new();
        transcoder.set_output_size(OutputSize::Fixed(80)).await;

        let result = transcoder
            .transcode(TranscodeJob {
                job_id: "T-1".to_string(),
                input_path: input,
                output_path: temp.path().join("out.webp"),
                target_width: Some(600),
                quality: 100,
            })
            .await
            .unwrap();
        assert_eq!(result.output_size_bytes, 80);
    }
}
