//! Semaphore-bounded batch runner.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::Semaphore;

use super::error::{BatchError, TaskFailure};

/// Snapshot of a scheduler's counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Pool name (e.g., "upscale", "compress").
    pub name: String,
    /// Maximum concurrent tasks.
    pub max_concurrent: usize,
    /// Tasks currently running.
    pub active_tasks: usize,
    /// Highest number of tasks observed running at once.
    pub peak_active: usize,
    /// Total tasks that succeeded since creation.
    pub total_processed: u64,
    /// Total tasks that failed since creation.
    pub total_failed: u64,
}

#[derive(Default)]
struct PoolStats {
    active: AtomicUsize,
    peak: AtomicUsize,
    total_processed: AtomicU64,
    total_failed: AtomicU64,
}

impl PoolStats {
    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::Relaxed) + 1;
        self.peak.fetch_max(now, Ordering::Relaxed);
    }

    fn leave(&self, success: bool) {
        self.active.fetch_sub(1, Ordering::Relaxed);
        if success {
            self.total_processed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.total_failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Runs batches of independent tasks with at most `limit` in flight.
///
/// Every task of a batch is driven to completion, even after a sibling has
/// failed, and the batch only reports once all of them settled. All tasks
/// are polled from the calling task, so concurrency is cooperative.
pub struct TaskScheduler {
    name: String,
    limit: usize,
    stats: PoolStats,
}

impl TaskScheduler {
    /// Creates a scheduler. A limit of zero is treated as one.
    pub fn new(name: impl Into<String>, limit: usize) -> Self {
        Self {
            name: name.into(),
            limit: limit.max(1),
            stats: PoolStats::default(),
        }
    }

    /// Returns the concurrency limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the current counters.
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            name: self.name.clone(),
            max_concurrent: self.limit,
            active_tasks: self.stats.active.load(Ordering::Relaxed),
            peak_active: self.stats.peak.load(Ordering::Relaxed),
            total_processed: self.stats.total_processed.load(Ordering::Relaxed),
            total_failed: self.stats.total_failed.load(Ordering::Relaxed),
        }
    }

    /// Runs a batch and waits for every task to settle.
    ///
    /// Returns the results in submission order, or every failure once the
    /// whole batch has finished.
    pub async fn run<T, E, F, Fut>(&self, tasks: Vec<F>) -> Result<Vec<T>, BatchError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let total = tasks.len();
        let semaphore = Semaphore::new(self.limit);

        tracing::debug!(pool = %self.name, total, limit = self.limit, "Scheduling batch");

        let settled = join_all(tasks.into_iter().map(|task| {
            let semaphore = &semaphore;
            let stats = &self.stats;
            async move {
                // The semaphore is never closed, so a permit is always granted.
                let _permit = semaphore.acquire().await.ok();
                stats.enter();
                let result = task().await;
                stats.leave(result.is_ok());
                result
            }
        }))
        .await;

        let mut results = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for (index, outcome) in settled.into_iter().enumerate() {
            match outcome {
                Ok(value) => results.push(value),
                Err(error) => failures.push(TaskFailure { index, error }),
            }
        }

        if failures.is_empty() {
            Ok(results)
        } else {
            tracing::debug!(
                pool = %self.name,
                total,
                failed = failures.len(),
                "Batch settled with failures"
            );
            Err(BatchError { total, failures })
        }
    }
}

/// Runs `tasks` with at most `limit` in flight using a throwaway scheduler.
pub async fn schedule<T, E, F, Fut>(limit: usize, tasks: Vec<F>) -> Result<Vec<T>, BatchError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    TaskScheduler::new("batch", limit).run(tasks).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    fn tracked_task(
        in_flight: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        finished: Arc<AtomicUsize>,
        fail: bool,
        delay_ms: u64,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<u64, String>>>> {
        move || {
            Box::pin(async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                finished.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err(format!("task failed after {}ms", delay_ms))
                } else {
                    Ok(delay_ms)
                }
            })
        }
    }

    #[tokio::test]
    async fn test_results_keep_submission_order() {
        let delays = [30u64, 5, 20, 1, 10];
        let tasks: Vec<_> = delays
            .iter()
            .map(|&d| {
                move || async move {
                    tokio::time::sleep(Duration::from_millis(d)).await;
                    Ok::<u64, String>(d)
                }
            })
            .collect();

        let results = schedule(3, tasks).await.unwrap();
        assert_eq!(results, delays.to_vec());
    }

    #[tokio::test]
    async fn test_limit_is_respected() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| tracked_task(in_flight.clone(), peak.clone(), finished.clone(), false, 10))
            .collect();

        let scheduler = TaskScheduler::new("test", 2);
        scheduler.run(tasks).await.unwrap();

        assert_eq!(peak.load(Ordering::SeqCst), 2);
        assert_eq!(finished.load(Ordering::SeqCst), 8);
        let status = scheduler.status();
        assert_eq!(status.peak_active, 2);
        assert_eq!(status.active_tasks, 0);
        assert_eq!(status.total_processed, 8);
    }

    #[tokio::test]
    async fn test_failure_does_not_cancel_siblings() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));

        // Task 1 fails quickly while the others are still sleeping.
        let tasks: Vec<_> = (0..5)
            .map(|i| {
                tracked_task(
                    in_flight.clone(),
                    peak.clone(),
                    finished.clone(),
                    i == 1,
                    if i == 1 { 1 } else { 20 },
                )
            })
            .collect();

        let scheduler = TaskScheduler::new("test", 3);
        let err = scheduler.run(tasks).await.unwrap_err();

        assert_eq!(finished.load(Ordering::SeqCst), 5);
        assert_eq!(err.total, 5);
        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].index, 1);
        assert_eq!(err.succeeded(), 4);
        assert_eq!(scheduler.status().total_failed, 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let tasks: Vec<fn() -> std::future::Ready<Result<(), String>>> = Vec::new();
        let results = schedule(2, tasks).await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_zero_limit_becomes_one() {
        let scheduler = TaskScheduler::new("test", 0);
        assert_eq!(scheduler.limit(), 1);

        let tasks: Vec<_> = (1..=2)
            .map(|n| move || async move { Ok::<_, String>(n) })
            .collect();
        let results = tokio_test::block_on(scheduler.run(tasks)).unwrap();
        assert_eq!(results, vec![1, 2]);
    }
}
