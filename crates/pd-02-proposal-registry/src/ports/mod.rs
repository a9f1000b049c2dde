//! # Ports Layer
//!
//! - **Inbound**: [`ProposalRegistryApi`](inbound::ProposalRegistryApi)
//! - **Outbound**: [`ProposalStore`](outbound::ProposalStore),
//!   [`IdentityOracle`](outbound::IdentityOracle),
//!   [`TimeSource`](outbound::TimeSource)

pub mod inbound;
pub mod outbound;

pub use inbound::ProposalRegistryApi;
pub use outbound::{IdentityOracle, ProposalStore, TimeSource};
