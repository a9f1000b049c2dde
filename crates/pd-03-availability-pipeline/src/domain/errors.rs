use thiserror::Error;

/// Failures visible to whoever feeds or configures the pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),

    /// The worker's queue is at capacity; the ping was dropped.
    #[error("availability queue is full")]
    QueueFull,

    /// The pipeline has been shut down.
    #[error("availability pipeline is closed")]
    Closed,
}

/// A sink could not persist a batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("availability sink failed: {0}")]
pub struct SinkError(pub String);

impl SinkError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
