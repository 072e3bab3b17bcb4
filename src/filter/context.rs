use crate::config::ExecutionConfig;

/// Resources a filter may use while executing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Upper bound on worker threads for data-parallel loops.
    pub worker_threads: usize,
    /// Elements per work unit; cancellation is polled between units.
    pub chunk_size: usize,
}

impl ExecutionContext {
    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self {
            worker_threads: config.effective_worker_threads(),
            chunk_size: config.chunk_size.max(1),
        }
    }

    /// Single worker, useful for deterministic tests.
    pub fn sequential() -> Self {
        Self {
            worker_threads: 1,
            chunk_size: ExecutionConfig::default().chunk_size,
        }
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::from_config(&ExecutionConfig::default())
    }
}
