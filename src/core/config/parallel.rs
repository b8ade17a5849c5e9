//! Shared parallel processing configuration types.

use serde::{Deserialize, Serialize};

/// Configuration for parallel processing across the batch dimension.
///
/// Every image in a batch is resized, padded, decoded and merged independently,
/// so batched entry points fan out over images with rayon once the batch is
/// larger than `batch_threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallelPolicy {
    /// Maximum number of threads to use for parallel processing.
    /// If None, rayon will use the default thread pool size (typically number of CPU cores).
    #[serde(default)]
    pub max_threads: Option<usize>,

    /// Batches with at most this many images are processed sequentially.
    /// Default: 1 (single images never pay the rayon dispatch cost)
    #[serde(default = "ParallelPolicy::default_batch_threshold")]
    pub batch_threshold: usize,
}

impl ParallelPolicy {
    /// Create a new ParallelPolicy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of threads.
    pub fn with_max_threads(mut self, max_threads: Option<usize>) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set the batch size at or below which work stays on the calling thread.
    pub fn with_batch_threshold(mut self, threshold: usize) -> Self {
        self.batch_threshold = threshold;
        self
    }

    /// Returns true when a batch of `batch_size` images should be processed in parallel.
    pub fn should_parallelize(&self, batch_size: usize) -> bool {
        batch_size > self.batch_threshold
    }

    /// Install the global rayon thread pool with the configured number of threads.
    ///
    /// This method should be called once at application startup before any parallel
    /// processing occurs. If `max_threads` is None, this method does nothing and
    /// rayon will use its default thread pool size.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the thread pool was successfully configured
    /// - `Ok(false)` if `max_threads` is None (no configuration needed)
    /// - `Err` if the thread pool has already been initialized
    pub fn install_global_thread_pool(&self) -> Result<bool, rayon::ThreadPoolBuildError> {
        if let Some(num_threads) = self.max_threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn default_batch_threshold() -> usize {
        1
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self {
            max_threads: None,
            batch_threshold: Self::default_batch_threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_image_stays_sequential() {
        let policy = ParallelPolicy::default();
        assert!(!policy.should_parallelize(1));
        assert!(policy.should_parallelize(2));
    }

    #[test]
    fn test_install_without_max_threads_is_noop() {
        let policy = ParallelPolicy::new();
        assert_eq!(policy.install_global_thread_pool().ok(), Some(false));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let policy: ParallelPolicy = serde_json::from_str(r#"{"max_threads": 2}"#).unwrap();
        assert_eq!(policy.max_threads, Some(2));
        assert_eq!(policy.batch_threshold, 1);
    }
}
