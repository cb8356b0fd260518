//! Execution options for batches of independent runs.
//!
//! A single run is always single-threaded; these settings only decide how
//! replications are spread over threads.

use crate::core::errors::SimError;

/// How replications are scheduled onto threads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// One after another on the calling thread
    #[default]
    Sequential,
    /// Spread over a dedicated Rayon pool
    Rayon,
}

/// Options for [`run_replications`](super::run_replications)
#[derive(Debug, Clone, Default)]
pub struct SimulationConfig {
    pub concurrency_mode: ConcurrencyMode,
    /// Worker count for the Rayon pool; `None` lets Rayon pick
    pub thread_pool_size: Option<usize>,
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rayon mode on a pool of `threads` workers
    pub fn parallel(threads: usize) -> Self {
        Self::new()
            .with_concurrency(ConcurrencyMode::Rayon)
            .with_thread_pool_size(threads)
    }

    pub fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency_mode = mode;
        self
    }

    pub fn with_thread_pool_size(mut self, size: usize) -> Self {
        self.thread_pool_size = Some(size);
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.thread_pool_size == Some(0) {
            return Err(SimError::config("replication thread pool needs at least one worker"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_sequential() {
        let config = SimulationConfig::new();
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Sequential);
        assert_eq!(config.thread_pool_size, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parallel_shorthand() {
        let config = SimulationConfig::parallel(4);
        assert_eq!(config.concurrency_mode, ConcurrencyMode::Rayon);
        assert_eq!(config.thread_pool_size, Some(4));
    }

    #[test]
    fn test_empty_pool_rejected() {
        let config = SimulationConfig::parallel(0);
        assert!(matches!(config.validate(), Err(SimError::Configuration(_))));
    }
}
