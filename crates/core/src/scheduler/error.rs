//! Error types for the scheduler module.

use std::fmt;

/// A single task that settled with an error.
#[derive(Debug)]
pub struct TaskFailure<E> {
    /// Position of the task in the submitted batch.
    pub index: usize,
    /// The error the task produced.
    pub error: E,
}

/// Aggregate failure of a batch: every task settled and at least one failed.
#[derive(Debug)]
pub struct BatchError<E> {
    /// Number of tasks in the batch.
    pub total: usize,
    /// Failed tasks, in batch order.
    pub failures: Vec<TaskFailure<E>>,
}

impl<E> BatchError<E> {
    /// Number of tasks that succeeded.
    pub fn succeeded(&self) -> usize {
        self.total - self.failures.len()
    }

    /// The failure of the lowest-indexed failed task.
    pub fn first(&self) -> Option<&TaskFailure<E>> {
        self.failures.first()
    }
}

impl<E: fmt::Display> fmt::Display for BatchError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} tasks failed", self.failures.len(), self.total)?;
        if let Some(first) = self.first() {
            write!(f, " (task {}: {})", first.index, first.error)?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for BatchError<E> {}
