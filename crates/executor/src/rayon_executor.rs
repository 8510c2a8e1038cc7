//! Rayon-based parallel executor.

use colrsplit_traits::Executor;
use rayon::prelude::*;
use std::sync::Arc;

/// A parallel executor using rayon's work-stealing thread pool.
///
/// `new()` runs on rayon's global pool. `with_threads()` owns a dedicated
/// pool so a batch can be capped without touching global configuration.
/// Either way results come back in input order.
#[derive(Debug, Clone)]
pub struct RayonExecutor {
    pool: Option<Arc<rayon::ThreadPool>>,
    /// Cached thread count for reporting via `parallelism()`.
    num_threads: usize,
}

impl RayonExecutor {
    /// Creates a new RayonExecutor using rayon's global thread pool.
    pub fn new() -> Self {
        Self {
            pool: None,
            num_threads: rayon::current_num_threads(),
        }
    }

    /// Creates an executor backed by its own pool of `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("colrsplit-worker-{}", i))
            .build()?;
        Ok(Self {
            num_threads: pool.current_num_threads(),
            pool: Some(Arc::new(pool)),
        })
    }

    fn run<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync,
    {
        match &self.pool {
            Some(pool) => pool.install(|| items.into_par_iter().map(f).collect()),
            None => items.into_par_iter().map(f).collect(),
        }
    }
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for RayonExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        self.run(items, f)
    }

    fn parallelism(&self) -> usize {
        self.num_threads
    }

    fn name(&self) -> &'static str {
        "RayonExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_rayon_executor_preserves_order() {
        let executor = RayonExecutor::new();
        let items: Vec<u32> = (0..64).collect();
        let results = executor.execute_all(items, |x| x * 2);
        let expected: Vec<u32> = (0..64).map(|x| x * 2).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn test_dedicated_pool_reports_thread_count() {
        let executor = RayonExecutor::with_threads(3).unwrap();
        assert_eq!(executor.parallelism(), 3);
    }

    #[test]
    fn test_dedicated_pool_runs_every_item() {
        let executor = RayonExecutor::with_threads(2).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let _ = executor.execute_all((0..100).collect::<Vec<usize>>(), {
            let counter = counter.clone();
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(counter.load(Ordering::SeqCst), 100);
    }
}
