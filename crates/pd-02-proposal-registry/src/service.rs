//! # Proposal Registry Service
//!
//! Application service implementing [`ProposalRegistryApi`].
//!
//! ## Architecture
//!
//! - Validation lives in the domain layer and runs before any write
//! - Persistence goes through [`ProposalStore`]
//! - Registration is confirmed by [`IdentityOracle`] while the runtime
//!   `verify_identity` flag is set
//! - Liveness uses the injected [`TimeSource`]

use crate::domain::config::RegistryConfig;
use crate::domain::errors::RegistryError;
use crate::domain::filter::ProposalFilter;
use crate::domain::payload::{JsonObject, StringField};
use crate::domain::requests::{
    ping_service_type, RegistrationClaim, RegistrationRequest, UnregisterRequest,
};
use crate::ports::inbound::ProposalRegistryApi;
use crate::ports::outbound::{IdentityOracle, ProposalStore, TimeSource};
use async_trait::async_trait;
use shared_types::{
    AccessPolicy, Address, FeatureFlags, Identity, IdentityRegistration, Node, NodeAvailability,
    NodeKey, ProviderId,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Proposal registry over pluggable store, oracle and clock.
pub struct ProposalRegistryService {
    store: Arc<dyn ProposalStore>,
    oracle: Arc<dyn IdentityOracle>,
    clock: Arc<dyn TimeSource>,
    flags: Arc<FeatureFlags>,
    config: RegistryConfig,
}

impl ProposalRegistryService {
    pub fn new(
        store: Arc<dyn ProposalStore>,
        oracle: Arc<dyn IdentityOracle>,
        clock: Arc<dyn TimeSource>,
        flags: Arc<FeatureFlags>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            store,
            oracle,
            clock,
            flags,
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ProposalStore> {
        &self.store
    }

    /// Whether `node` is inside the liveness window right now.
    pub fn is_active(&self, node: &Node) -> bool {
        node.is_active(self.clock.now(), self.config.availability_timeout)
    }

    fn existing_node(&self, key: NodeKey) -> Result<NodeKey, RegistryError> {
        match self.store.get_node(&key)? {
            Some(_) => Ok(key),
            None => {
                debug!(node = %key, "Node key not found");
                Err(RegistryError::NodeNotFound)
            }
        }
    }
}

#[async_trait]
impl ProposalRegistryApi for ProposalRegistryService {
    fn create_identity(&self, caller: &Address) -> Result<(), RegistryError> {
        let identity = Identity::new(*caller, self.clock.now());
        if !self.store.insert_identity(identity)? {
            return Err(RegistryError::IdentityAlreadyExists);
        }
        info!(identity = %caller, "Identity created");
        Ok(())
    }

    async fn validate_registration(
        &self,
        caller: &Address,
        payload: JsonObject,
    ) -> Result<RegistrationRequest, RegistryError> {
        let claim = RegistrationClaim::extract(caller, payload)?;

        if self.flags.verify_identity() && !self.oracle.is_registered(caller).await? {
            debug!(identity = %caller, "Registration from unregistered identity");
            return Err(RegistryError::UnregisteredIdentity);
        }

        claim.into_request()
    }

    fn apply_registration(
        &self,
        request: RegistrationRequest,
        ip: Option<String>,
    ) -> Result<NodeKey, RegistryError> {
        let now = self.clock.now();
        let RegistrationRequest {
            key,
            proposal,
            node_type,
            access_policies,
        } = request;

        let mut node = Node::new(key.clone(), proposal, now);
        node.node_type = node_type;
        node.ip = ip;
        node.mark_activity(now);

        let diff = self.store.apply_registration(node, &access_policies)?;
        if !diff.is_empty() {
            debug!(
                provider = %key.provider,
                added = diff.to_add.len(),
                removed = diff.to_remove.len(),
                "Reconciled access policies"
            );
        }

        info!(provider = %key.provider, service_type = %key.service_type, "Proposal registered");
        Ok(key)
    }

    fn unregister(&self, caller: &Address, payload: &JsonObject) -> Result<usize, RegistryError> {
        let request = UnregisterRequest::extract(caller, payload)?;

        let keys: Vec<NodeKey> = match request.service_type {
            Some(service_type) => vec![NodeKey::new(request.provider.clone(), service_type)],
            None => self
                .store
                .nodes_for_provider(&request.provider)?
                .into_iter()
                .map(|node| node.key)
                .collect(),
        };

        let mut cleared = 0;
        for key in &keys {
            if self.store.set_node_activity(key, None)? {
                cleared += 1;
            }
        }

        info!(provider = %request.provider, cleared, "Proposal unregistered");
        Ok(cleared)
    }

    fn list_active(&self, filter: &ProposalFilter) -> Result<Vec<Node>, RegistryError> {
        let now = self.clock.now();
        let timeout = self.config.availability_timeout;

        let candidates: Vec<Node> = self
            .store
            .list_nodes()?
            .into_iter()
            .filter(|node| node.is_active(now, timeout) && filter.matches_node(node))
            .collect();

        // Per-provider lookups, shared by all of a provider's nodes.
        let mut policies: BTreeMap<ProviderId, Vec<AccessPolicy>> = BTreeMap::new();
        let mut registered: BTreeMap<ProviderId, bool> = BTreeMap::new();
        let mut active = Vec::with_capacity(candidates.len());

        for node in candidates {
            let provider = node.provider().clone();

            if filter.bounty_only {
                let has_registration = match registered.get(&provider) {
                    Some(known) => *known,
                    None => {
                        let known = self.store.has_identity_registration(&provider)?;
                        registered.insert(provider.clone(), known);
                        known
                    }
                };
                if !has_registration {
                    continue;
                }
            }

            if !policies.contains_key(&provider) {
                let set = self.store.access_policies(&provider)?;
                policies.insert(provider.clone(), set.into_iter().collect());
            }
            let attached = policies.get(&provider).map(Vec::as_slice).unwrap_or_default();
            if filter.access_policy.matches(attached) {
                active.push(node);
            }
        }

        Ok(active)
    }

    fn mark_activity(&self, key: &NodeKey) -> Result<(), RegistryError> {
        if self.store.set_node_activity(key, Some(self.clock.now()))? {
            Ok(())
        } else {
            Err(RegistryError::NodeNotFound)
        }
    }

    fn resolve_ping_target(
        &self,
        caller: &Address,
        payload: &JsonObject,
    ) -> Result<NodeKey, RegistryError> {
        self.existing_node(NodeKey::new(caller, ping_service_type(payload)))
    }

    fn resolve_session_target(
        &self,
        caller: &Address,
        payload: &JsonObject,
    ) -> Result<NodeKey, RegistryError> {
        match StringField::read(payload, "service_type").text() {
            Some(service_type) => self.existing_node(NodeKey::new(caller, service_type)),
            None => self
                .store
                .nodes_for_provider(&ProviderId::from(caller))?
                .into_iter()
                .next()
                .map(|node| node.key)
                .ok_or(RegistryError::NodeNotFound),
        }
    }

    fn record_identity_registration(
        &self,
        provider: &ProviderId,
        registration_address: &str,
    ) -> Result<(), RegistryError> {
        self.store.insert_identity_registration(IdentityRegistration {
            provider: provider.clone(),
            registration_address: registration_address.to_string(),
            created_at: self.clock.now(),
        })?;
        info!(provider = %provider, "Identity registration recorded");
        Ok(())
    }

    fn availability_for(&self, key: &NodeKey) -> Result<Vec<NodeAvailability>, RegistryError> {
        Ok(self.store.availability_for(key)?)
    }
}
