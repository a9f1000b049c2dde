//! Pipeline domain: configuration, error types, batch accumulation and
//! counters. Nothing here touches tokio.

pub mod batch;
pub mod config;
pub mod errors;
pub mod stats;

pub use batch::Batcher;
pub use config::PipelineConfig;
pub use errors::{PipelineError, SinkError};
pub use stats::{PipelineStats, StatsSnapshot};
