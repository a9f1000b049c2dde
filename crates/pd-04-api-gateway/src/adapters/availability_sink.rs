//! Availability sink backed by the proposal store.

use async_trait::async_trait;
use pd_02_proposal_registry::ProposalStore;
use pd_03_availability_pipeline::{AvailabilitySink, SinkError};
use shared_types::NodeAvailability;
use std::sync::Arc;

/// Writes each batch with one store call, off the async executor.
pub struct StoreAvailabilitySink {
    store: Arc<dyn ProposalStore>,
}

impl StoreAvailabilitySink {
    pub fn new(store: Arc<dyn ProposalStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AvailabilitySink for StoreAvailabilitySink {
    async fn persist(&self, batch: Vec<NodeAvailability>) -> Result<(), SinkError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.insert_availability_batch(&batch))
            .await
            .map_err(|e| SinkError::new(e.to_string()))?
            .map_err(|e| SinkError::new(e.to_string()))
    }
}
