//! # Availability Pipeline (PD-03)
//!
//! Accepts availability pings from request handlers without waiting on
//! storage, and persists them in batches from background workers.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): config, errors, batching, counters
//! - **Ports Layer** (`ports/`): [`AvailabilityRecorder`] inbound,
//!   [`AvailabilitySink`] outbound
//! - **Service Layer** (`service.rs`): [`AvailabilityPipeline`] and its
//!   cloneable [`AvailabilityQueue`] handle
//!
//! ## Guarantees
//!
//! - `enqueue` never awaits; a full partition drops the ping and counts it
//! - Pings for one node key always land on the same worker, so they are
//!   persisted in enqueue order
//! - A failed batch is logged and discarded, never retried
//! - `shutdown` flushes everything already queued before returning

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{Batcher, PipelineConfig, PipelineError, PipelineStats, SinkError, StatsSnapshot};
pub use ports::{AvailabilityRecorder, AvailabilitySink};
pub use service::{AvailabilityPipeline, AvailabilityQueue};
