//! Processing pipeline for raw titles.
//!
//! This module runs every title of the content directory through two
//! bounded-concurrency stages and a commit step:
//!
//! 1. **Upscale**: pages narrower than 2000 px go through the upscaler
//!    (x2, or x4 below 1000 px), wider pages are copied
//! 2. **Compress**: pages and thumbnails are transcoded and resized, the
//!    smaller of transcode and input is kept
//! 3. **Commit**: originals and intermediates are deleted, compressed
//!    outputs are renamed to `<NNN>.<ext>` / `thumbnail_<i>.<ext>`
//!
//! A failing stage rolls back every file it produced and the run moves on
//! to the next title. A commit is journaled first, and an unfinished one
//! is completed by the next run.
//!
//! # Example
//!
//! ```ignore
//! use tankobon_core::converter::{CwebpTranscoder, Waifu2xUpscaler};
//! use tankobon_core::processor::{PipelineProcessor, ProcessorConfig};
//!
//! let processor = PipelineProcessor::new(
//!     ProcessorConfig::default(),
//!     Waifu2xUpscaler::with_defaults(),
//!     CwebpTranscoder::with_defaults(),
//! );
//! let report = processor.run(Path::new("content")).await?;
//! println!("{} processed, {} failed", report.processed(), report.failed());
//! ```

mod commit;
mod compress;
mod config;
mod error;
mod pipeline;
mod types;
mod upscale;

pub use commit::{
    clean_leftovers, finish_commit, read_commit_journal, read_commit_marker, CommitJournal,
    CommitMarker, JournalRename, RollbackResult, TitleTransaction, COMMIT_JOURNAL_FILE,
    COMMIT_MARKER_FILE, COMPRESSED_PREFIX, ENLARGED_PREFIX,
};
pub use compress::{compress_one, page_target_width, plan_compress, CompressTarget};
pub use config::ProcessorConfig;
pub use error::StageError;
pub use pipeline::PipelineProcessor;
pub use types::{
    CompressedFile, EnlargedPage, Enlargement, PipelineStatus, RunReport, Stage, TitleOutcome,
    TitleStatus,
};
pub use upscale::{enlarged_path, UpscalePolicy};
