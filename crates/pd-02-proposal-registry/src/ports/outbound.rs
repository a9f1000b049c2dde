//! # Outbound Ports (Driven Ports / SPI)
//!
//! Interfaces the registry depends on, implemented by adapters.

use crate::domain::errors::{OracleError, StoreError};
use crate::domain::policies::PolicyDiff;
use async_trait::async_trait;
use shared_types::{
    AccessPolicy, Address, Identity, IdentityRegistration, Node, NodeAvailability, NodeKey,
    ProviderId, Timestamp,
};
use std::collections::BTreeSet;

/// Persistence for everything the registry owns plus the availability log.
///
/// Implementations arbitrate concurrent writers: each method is atomic with
/// respect to the rows it touches. No cross-key ordering is promised.
pub trait ProposalStore: Send + Sync {
    /// Insert a new identity. Returns `false` if the address already exists.
    fn insert_identity(&self, identity: Identity) -> Result<bool, StoreError>;

    fn identity_exists(&self, address: &Address) -> Result<bool, StoreError>;

    fn get_node(&self, key: &NodeKey) -> Result<Option<Node>, StoreError>;

    /// Write the node row for `node.key` and replace its provider's access
    /// policies with `policies`, as one atomic step. An existing row keeps
    /// its `created_at`. Returns the diff applied to the policy set.
    ///
    /// Concurrent registrations for one provider serialize here: the last
    /// to commit leaves exactly its own policy set.
    fn apply_registration(
        &self,
        node: Node,
        policies: &BTreeSet<AccessPolicy>,
    ) -> Result<PolicyDiff, StoreError>;

    /// Set or clear `updated_at` on an existing node. Returns `false` if the
    /// node does not exist.
    fn set_node_activity(
        &self,
        key: &NodeKey,
        updated_at: Option<Timestamp>,
    ) -> Result<bool, StoreError>;

    /// All nodes of one provider, ordered by service type.
    fn nodes_for_provider(&self, provider: &ProviderId) -> Result<Vec<Node>, StoreError>;

    /// All nodes, ordered by (provider, service type).
    fn list_nodes(&self) -> Result<Vec<Node>, StoreError>;

    fn access_policies(&self, provider: &ProviderId) -> Result<BTreeSet<AccessPolicy>, StoreError>;

    fn has_identity_registration(&self, provider: &ProviderId) -> Result<bool, StoreError>;

    fn insert_identity_registration(&self, registration: IdentityRegistration) -> Result<(), StoreError>;

    /// Append a batch of ping records in one write.
    fn insert_availability_batch(&self, batch: &[NodeAvailability]) -> Result<(), StoreError>;

    /// Persisted ping records for a node, oldest first.
    fn availability_for(&self, key: &NodeKey) -> Result<Vec<NodeAvailability>, StoreError>;
}

/// External authority on which addresses are registered identities.
///
/// Consulted on registration only while strict verification is enabled.
#[async_trait]
pub trait IdentityOracle: Send + Sync {
    async fn is_registered(&self, address: &Address) -> Result<bool, OracleError>;
}

/// Abstract interface for time.
///
/// Production uses the system clock; tests inject fixed or manual clocks.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}
