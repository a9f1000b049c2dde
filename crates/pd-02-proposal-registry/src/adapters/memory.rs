//! # In-Memory Proposal Store
//!
//! Ordered maps behind a single `RwLock`. Used for the default `memory`
//! backend and in tests.

use crate::domain::errors::StoreError;
use crate::domain::policies::PolicyDiff;
use crate::ports::outbound::ProposalStore;
use parking_lot::RwLock;
use shared_types::{
    AccessPolicy, Address, Identity, IdentityRegistration, Node, NodeAvailability, NodeKey,
    ProviderId, Timestamp,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
struct Tables {
    identities: BTreeMap<Address, Identity>,
    nodes: BTreeMap<NodeKey, Node>,
    policies: BTreeSet<AccessPolicy>,
    registrations: BTreeMap<ProviderId, IdentityRegistration>,
    availability: Vec<NodeAvailability>,
}

/// In-memory [`ProposalStore`].
#[derive(Debug, Default)]
pub struct InMemoryProposalStore {
    tables: RwLock<Tables>,
}

impl InMemoryProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total persisted ping records.
    pub fn availability_len(&self) -> usize {
        self.tables.read().availability.len()
    }
}

impl ProposalStore for InMemoryProposalStore {
    fn insert_identity(&self, identity: Identity) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        if tables.identities.contains_key(&identity.address) {
            return Ok(false);
        }
        tables.identities.insert(identity.address, identity);
        Ok(true)
    }

    fn identity_exists(&self, address: &Address) -> Result<bool, StoreError> {
        Ok(self.tables.read().identities.contains_key(address))
    }

    fn get_node(&self, key: &NodeKey) -> Result<Option<Node>, StoreError> {
        Ok(self.tables.read().nodes.get(key).cloned())
    }

    fn apply_registration(
        &self,
        node: Node,
        policies: &BTreeSet<AccessPolicy>,
    ) -> Result<PolicyDiff, StoreError> {
        let mut tables = self.tables.write();

        let current: BTreeSet<AccessPolicy> = tables
            .policies
            .iter()
            .filter(|policy| policy.provider == node.key.provider)
            .cloned()
            .collect();
        let diff = PolicyDiff::between(&current, policies);
        for policy in &diff.to_remove {
            tables.policies.remove(policy);
        }
        tables.policies.extend(diff.to_add.iter().cloned());

        let node = match tables.nodes.get(&node.key) {
            Some(existing) => Node {
                created_at: existing.created_at,
                ..node
            },
            None => node,
        };
        tables.nodes.insert(node.key.clone(), node);
        Ok(diff)
    }

    fn set_node_activity(
        &self,
        key: &NodeKey,
        updated_at: Option<Timestamp>,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        match tables.nodes.get_mut(key) {
            Some(node) => {
                node.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn nodes_for_provider(&self, provider: &ProviderId) -> Result<Vec<Node>, StoreError> {
        Ok(self
            .tables
            .read()
            .nodes
            .values()
            .filter(|node| node.provider() == provider)
            .cloned()
            .collect())
    }

    fn list_nodes(&self) -> Result<Vec<Node>, StoreError> {
        Ok(self.tables.read().nodes.values().cloned().collect())
    }

    fn access_policies(&self, provider: &ProviderId) -> Result<BTreeSet<AccessPolicy>, StoreError> {
        Ok(self
            .tables
            .read()
            .policies
            .iter()
            .filter(|policy| policy.provider == *provider)
            .cloned()
            .collect())
    }

    fn has_identity_registration(&self, provider: &ProviderId) -> Result<bool, StoreError> {
        Ok(self.tables.read().registrations.contains_key(provider))
    }

    fn insert_identity_registration(&self, registration: IdentityRegistration) -> Result<(), StoreError> {
        self.tables
            .write()
            .registrations
            .insert(registration.provider.clone(), registration);
        Ok(())
    }

    fn insert_availability_batch(&self, batch: &[NodeAvailability]) -> Result<(), StoreError> {
        self.tables.write().availability.extend_from_slice(batch);
        Ok(())
    }

    fn availability_for(&self, key: &NodeKey) -> Result<Vec<NodeAvailability>, StoreError> {
        Ok(self
            .tables
            .read()
            .availability
            .iter()
            .filter(|ping| ping.provider == key.provider && ping.service_type == key.service_type)
            .cloned()
            .collect())
    }
}
