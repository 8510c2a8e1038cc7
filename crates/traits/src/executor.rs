//! Executor trait for abstracting batch execution.
//!
//! Glyphs are independent units of work. The batch orchestrator hands the
//! candidate list to an executor and lets it decide whether to run them one
//! after another or spread them over a thread pool.

use std::fmt::Debug;

/// A trait for executing work items, potentially in parallel.
///
/// # Implementations
///
/// - `SyncExecutor`: Sequential execution, no threading (always available)
/// - `RayonExecutor`: Work-stealing thread pool (feature-gated)
pub trait Executor: Send + Sync + Debug {
    /// Execute a batch of work items, potentially in parallel.
    ///
    /// Results are returned in the same order as the input items.
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static;

    /// Returns the level of parallelism this executor can provide.
    fn parallelism(&self) -> usize;

    /// Returns a human-readable name for this executor (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// A synchronous executor that processes items sequentially, in input order.
#[derive(Debug, Clone, Default)]
pub struct SyncExecutor;

impl SyncExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for SyncExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        items.into_iter().map(f).collect()
    }

    fn parallelism(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "SyncExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_executor_keeps_input_order() {
        let executor = SyncExecutor::new();
        let glyphs = vec!["u1F600", "u1F601", "u1F602"];
        let results = executor.execute_all(glyphs, |g| g.len());
        assert_eq!(results, vec![6, 6, 6]);
    }

    #[test]
    fn test_sync_executor_reports_single_thread() {
        let executor = SyncExecutor::new();
        assert_eq!(executor.parallelism(), 1);
        assert_eq!(executor.name(), "SyncExecutor");
    }
}
