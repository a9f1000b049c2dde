use std::sync::atomic::{AtomicU64, Ordering};

/// Pipeline counters, shared between the queue handle and the workers.
#[derive(Debug, Default)]
pub struct PipelineStats {
    enqueued: AtomicU64,
    persisted: AtomicU64,
    dropped: AtomicU64,
    failed_batches: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub enqueued: u64,
    pub persisted: u64,
    pub dropped: u64,
    pub failed_batches: u64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persisted(&self, count: usize) {
        self.persisted.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Pings rejected at intake because their partition was full.
    pub fn record_dropped(&self, count: usize) {
        self.dropped.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// A batch the sink refused; its pings are gone.
    pub fn record_failed_batch(&self) {
        self.failed_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
        }
    }
}
