//! # Proposal Registry (PD-02)
//!
//! Owns identities, node (proposal) records and access policies, and answers
//! consumer queries for live proposals.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): payload decoding, validation, policy
//!   reconciliation, listing filters
//! - **Ports Layer** (`ports/`): [`ProposalRegistryApi`] inbound,
//!   [`ProposalStore`], [`IdentityOracle`] and [`TimeSource`] outbound
//! - **Adapters** (`adapters/`): in-memory and RocksDB stores, static
//!   oracles, system clock
//! - **Service Layer** (`service.rs`): [`ProposalRegistryService`]
//!
//! ## Invariants
//!
//! - A node is active iff `now - updated_at <= availability_timeout`
//! - Unregister clears liveness; rows and policies are never deleted
//! - Re-registration replaces the provider's policy set by diff
//! - Validation failures never leave partial writes
//!
//! ## Features
//!
//! - `rocksdb`: persistent store
//! - `test-utils`: `FixedTimeSource` / `ManualTimeSource`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export public API
pub use adapters::{AllowAllOracle, InMemoryProposalStore, StaticIdentityOracle, SystemTimeSource};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbProposalStore};
pub use domain::{
    parse_object, AccessPolicyFilter, JsonObject, OracleError, PayloadKind, PolicyDiff,
    ProposalFilter, RegistrationRequest, RegistryConfig, RegistryError, ServiceTypeFilter,
    StoreError, DEFAULT_AVAILABILITY_TIMEOUT,
};
pub use ports::{IdentityOracle, ProposalRegistryApi, ProposalStore, TimeSource};
pub use service::ProposalRegistryService;
