use crate::domain::SinkError;
use async_trait::async_trait;
use shared_types::NodeAvailability;

/// Destination for availability batches. One call per batch.
#[async_trait]
pub trait AvailabilitySink: Send + Sync {
    async fn persist(&self, batch: Vec<NodeAvailability>) -> Result<(), SinkError>;
}
