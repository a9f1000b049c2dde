//! # Inbound Ports (Driving Ports / API)
//!
//! The registry API consumed by the HTTP gateway.

use crate::domain::errors::RegistryError;
use crate::domain::filter::ProposalFilter;
use crate::domain::payload::JsonObject;
use crate::domain::requests::RegistrationRequest;
use async_trait::async_trait;
use shared_types::{Address, Node, NodeAvailability, NodeKey, ProviderId};

/// Proposal registry operations.
///
/// Every mutating call takes the address recovered from the request
/// signature; payload claims are checked against it.
#[async_trait]
pub trait ProposalRegistryApi: Send + Sync {
    /// Record a new identity. A repeat is `IdentityAlreadyExists`.
    fn create_identity(&self, caller: &Address) -> Result<(), RegistryError>;

    /// Check envelope, identity binding, oracle and service type, without
    /// mutating anything.
    async fn validate_registration(
        &self,
        caller: &Address,
        payload: JsonObject,
    ) -> Result<RegistrationRequest, RegistryError>;

    /// Upsert the node, refresh liveness and replace the provider's access
    /// policies in one store write. Blocks on the store.
    fn apply_registration(
        &self,
        request: RegistrationRequest,
        ip: Option<String>,
    ) -> Result<NodeKey, RegistryError>;

    /// [`validate_registration`](Self::validate_registration) followed by
    /// [`apply_registration`](Self::apply_registration).
    async fn register(
        &self,
        caller: &Address,
        payload: JsonObject,
        ip: Option<String>,
    ) -> Result<NodeKey, RegistryError> {
        let request = self.validate_registration(caller, payload).await?;
        self.apply_registration(request, ip)
    }

    /// Clear liveness of one or all of the caller's nodes. Returns how many
    /// nodes were cleared.
    fn unregister(&self, caller: &Address, payload: &JsonObject) -> Result<usize, RegistryError>;

    /// Active nodes matching `filter`, ordered by (provider, service type).
    fn list_active(&self, filter: &ProposalFilter) -> Result<Vec<Node>, RegistryError>;

    /// Refresh liveness of an existing node.
    fn mark_activity(&self, key: &NodeKey) -> Result<(), RegistryError>;

    /// Resolve the node a ping targets: the caller's node for the payload's
    /// service type (default openvpn).
    fn resolve_ping_target(
        &self,
        caller: &Address,
        payload: &JsonObject,
    ) -> Result<NodeKey, RegistryError>;

    /// Resolve the node a session stats report belongs to: the payload's
    /// service type if given, otherwise the caller's first node.
    fn resolve_session_target(
        &self,
        caller: &Address,
        payload: &JsonObject,
    ) -> Result<NodeKey, RegistryError>;

    /// Mark a provider as bounty-eligible.
    fn record_identity_registration(
        &self,
        provider: &ProviderId,
        registration_address: &str,
    ) -> Result<(), RegistryError>;

    /// Persisted ping records of a node.
    fn availability_for(&self, key: &NodeKey) -> Result<Vec<NodeAvailability>, RegistryError>;
}
