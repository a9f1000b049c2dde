//! Availability pipeline service.
//!
//! Each worker owns one bounded partition. A ping is routed to the partition
//! chosen by its node key, so a single key is always written by the same
//! worker and keeps its enqueue order.

use crate::domain::{Batcher, PipelineConfig, PipelineError, PipelineStats, StatsSnapshot};
use crate::ports::{AvailabilityRecorder, AvailabilitySink};
use shared_types::NodeAvailability;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Cloneable intake handle. Handlers keep one of these; the pipeline owns
/// the workers.
#[derive(Clone)]
pub struct AvailabilityQueue {
    partitions: Arc<[mpsc::Sender<NodeAvailability>]>,
    stats: Arc<PipelineStats>,
}

impl AvailabilityQueue {
    /// Queue a ping without waiting.
    pub fn enqueue(&self, record: NodeAvailability) -> Result<(), PipelineError> {
        let partition = self.partition_for(&record);
        match self.partitions[partition].try_send(record) {
            Ok(()) => {
                self.stats.record_enqueued();
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(record)) => {
                self.stats.record_dropped(1);
                warn!(
                    provider = %record.provider,
                    service_type = %record.service_type,
                    partition = partition,
                    "Availability queue full, ping dropped"
                );
                Err(PipelineError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(PipelineError::Closed),
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn partition_for(&self, record: &NodeAvailability) -> usize {
        if self.partitions.len() == 1 {
            return 0;
        }
        let mut hasher = DefaultHasher::new();
        record.provider.hash(&mut hasher);
        record.service_type.hash(&mut hasher);
        (hasher.finish() % self.partitions.len() as u64) as usize
    }
}

impl AvailabilityRecorder for AvailabilityQueue {
    fn enqueue(&self, record: NodeAvailability) -> Result<(), PipelineError> {
        AvailabilityQueue::enqueue(self, record)
    }
}

/// Running pipeline: intake queue plus its background writers.
pub struct AvailabilityPipeline {
    queue: AvailabilityQueue,
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl AvailabilityPipeline {
    /// Validate `config` and spawn the workers. Must run inside a tokio
    /// runtime.
    pub fn start(
        config: PipelineConfig,
        sink: Arc<dyn AvailabilitySink>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        let stats = Arc::new(PipelineStats::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let capacity = config.partition_capacity();

        let mut senders = Vec::with_capacity(config.workers);
        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let (tx, rx) = mpsc::channel(capacity);
            senders.push(tx);
            let worker = Worker {
                id,
                rx,
                sink: Arc::clone(&sink),
                stats: Arc::clone(&stats),
                batcher: Batcher::new(config.batch_size),
            };
            workers.push(tokio::spawn(worker.run(
                config.flush_interval,
                shutdown_rx.clone(),
            )));
        }

        info!(
            workers = config.workers,
            batch_size = config.batch_size,
            partition_capacity = capacity,
            "Availability pipeline started"
        );

        Ok(Self {
            queue: AvailabilityQueue {
                partitions: senders.into(),
                stats,
            },
            shutdown_tx,
            workers,
        })
    }

    pub fn handle(&self) -> AvailabilityQueue {
        self.queue.clone()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.queue.stats()
    }

    /// Stop intake, persist everything already queued, and wait for the
    /// workers to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.workers {
            if let Err(e) = handle.await {
                warn!(error = %e, "Availability worker did not exit cleanly");
            }
        }
        let stats = self.queue.stats();
        info!(
            enqueued = stats.enqueued,
            persisted = stats.persisted,
            dropped = stats.dropped,
            failed_batches = stats.failed_batches,
            "Availability pipeline stopped"
        );
    }
}

struct Worker {
    id: usize,
    rx: mpsc::Receiver<NodeAvailability>,
    sink: Arc<dyn AvailabilitySink>,
    stats: Arc<PipelineStats>,
    batcher: Batcher,
}

impl Worker {
    async fn run(mut self, flush_interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(flush_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                received = self.rx.recv() => match received {
                    Some(record) => self.accept(record).await,
                    None => break,
                },
                _ = ticker.tick() => {
                    let batch = self.batcher.take();
                    self.flush(batch).await;
                }
                // Fires on `true` and when the pipeline is dropped.
                _ = shutdown.changed() => {
                    self.rx.close();
                    while let Some(record) = self.rx.recv().await {
                        self.accept(record).await;
                    }
                    break;
                }
            }
        }

        let rest = self.batcher.take();
        self.flush(rest).await;
        debug!(worker = self.id, "Availability worker exited");
    }

    async fn accept(&mut self, record: NodeAvailability) {
        if let Some(batch) = self.batcher.push(record) {
            self.flush(batch).await;
        }
    }

    async fn flush(&self, batch: Vec<NodeAvailability>) {
        if batch.is_empty() {
            return;
        }
        let batch_len = batch.len();
        match self.sink.persist(batch).await {
            Ok(()) => {
                self.stats.record_persisted(batch_len);
                debug!(worker = self.id, batch_len, "Availability batch persisted");
            }
            Err(e) => {
                self.stats.record_failed_batch();
                warn!(
                    worker = self.id,
                    batch_len,
                    error = %e,
                    "Availability batch discarded"
                );
            }
        }
    }
}
