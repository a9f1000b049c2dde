//! # Discovery API Gateway (PD-04)
//!
//! HTTP surface of proposal discovery.
//!
//! | Method + path | Auth | Purpose |
//! |---|---|---|
//! | `POST /v1/identities` | signature | create the caller's identity |
//! | `POST /v1/register_proposal` | signature | upsert a proposal and its access policies |
//! | `POST /v1/unregister_proposal` | signature | clear liveness of one or all service types |
//! | `POST /v1/ping_proposal` | signature | refresh liveness, queue an availability record |
//! | `POST /v1/node_send_stats` | signature | refresh liveness from a session report |
//! | `GET /v1/proposals` | none | list active proposals |
//! | `GET /health` | none | liveness probe |
//!
//! Errors are rendered as `{"error": "<message>"}` with the status chosen by
//! [`ApiError`]. Throttled requests carry `Retry-After`.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod service;

// Re-exports for public API
pub use adapters::StoreAvailabilitySink;
pub use domain::config::{GatewayConfig, StorageBackend};
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use middleware::{ClientIp, IpGuardLayer};
pub use service::{AppState, DiscoveryGateway, GatewayComponents};
