//! Bounded task scheduler.
//!
//! Every pipeline stage hands its per-file work to a [`TaskScheduler`] with a
//! stage-specific limit. A batch never cancels: all tasks settle before the
//! batch reports, so rollback always sees the complete set of artifacts.
//!
//! # Example
//!
//! ```ignore
//! use tankobon_core::scheduler::TaskScheduler;
//!
//! let scheduler = TaskScheduler::new("upscale", 2);
//! let tasks: Vec<_> = pages.iter().map(|p| move || upscale(p)).collect();
//! match scheduler.run(tasks).await {
//!     Ok(outputs) => println!("{} pages upscaled", outputs.len()),
//!     Err(e) => println!("{} failed", e.failures.len()),
//! }
//! ```

mod error;
mod pool;

pub use error::{BatchError, TaskFailure};
pub use pool::{schedule, PoolStatus, TaskScheduler};
