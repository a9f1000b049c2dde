use super::errors::PipelineError;
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Pipeline tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// A batch is written as soon as it holds this many pings.
    pub batch_size: usize,
    /// Partial batches are written at least this often.
    pub flush_interval: Duration,
    /// Number of worker partitions.
    pub workers: usize,
    /// Total queue capacity, split evenly across workers.
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig("batch_size must be > 0".into()));
        }
        if self.flush_interval.is_zero() {
            return Err(PipelineError::InvalidConfig(
                "flush_interval must be > 0".into(),
            ));
        }
        if self.workers == 0 {
            return Err(PipelineError::InvalidConfig("workers must be > 0".into()));
        }
        if self.queue_capacity < self.workers {
            return Err(PipelineError::InvalidConfig(
                "queue_capacity must be at least one slot per worker".into(),
            ));
        }
        Ok(())
    }

    /// Channel capacity of a single worker partition.
    pub fn partition_capacity(&self) -> usize {
        (self.queue_capacity / self.workers.max(1)).max(1)
    }
}
