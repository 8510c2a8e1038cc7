//! Executor implementations for glyph batches.
//!
//! ## Available Executors
//!
//! - [`RayonExecutor`]: Work-stealing thread pool (feature: `rayon`)
//! - [`SyncExecutor`]: Sequential execution (re-exported from colrsplit-traits)
//!
//! ## Usage
//!
//! ```ignore
//! use colrsplit_executor::ExecutorImpl;
//! use colrsplit_traits::Executor;
//!
//! let executor = ExecutorImpl::with_jobs(4);
//! let results = executor.execute_all(glyph_names, |name| process(name));
//! ```

#[cfg(feature = "rayon")]
mod rayon_executor;

#[cfg(feature = "rayon")]
pub use rayon_executor::RayonExecutor;

pub use colrsplit_traits::{Executor, SyncExecutor};

/// A type-erased executor that wraps concrete executor implementations.
///
/// `Executor` has generic methods and cannot be a trait object, so the batch
/// builder stores this enum instead of a `Box<dyn Executor>`.
#[derive(Clone, Debug)]
pub enum ExecutorImpl {
    /// Sequential executor (no parallelism)
    Sync(SyncExecutor),

    /// Rayon work-stealing thread pool executor
    #[cfg(feature = "rayon")]
    Rayon(RayonExecutor),
}

impl ExecutorImpl {
    /// Picks an executor for a requested worker count.
    ///
    /// `0` means "use every core"; `1` always runs sequentially.
    pub fn with_jobs(jobs: usize) -> Self {
        match jobs {
            1 => ExecutorImpl::Sync(SyncExecutor::new()),
            #[cfg(feature = "rayon")]
            0 => ExecutorImpl::Rayon(RayonExecutor::new()),
            #[cfg(feature = "rayon")]
            n => RayonExecutor::with_threads(n)
                .map(ExecutorImpl::Rayon)
                .unwrap_or_else(|_| ExecutorImpl::Rayon(RayonExecutor::new())),
            #[cfg(not(feature = "rayon"))]
            _ => ExecutorImpl::Sync(SyncExecutor::new()),
        }
    }
}

impl Executor for ExecutorImpl {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        match self {
            ExecutorImpl::Sync(exec) => exec.execute_all(items, f),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.execute_all(items, f),
        }
    }

    fn parallelism(&self) -> usize {
        match self {
            ExecutorImpl::Sync(exec) => exec.parallelism(),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.parallelism(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ExecutorImpl::Sync(exec) => exec.name(),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.name(),
        }
    }
}

impl Default for ExecutorImpl {
    fn default() -> Self {
        #[cfg(feature = "rayon")]
        {
            ExecutorImpl::Rayon(RayonExecutor::new())
        }
        #[cfg(not(feature = "rayon"))]
        {
            ExecutorImpl::Sync(SyncExecutor::new())
        }
    }
}
