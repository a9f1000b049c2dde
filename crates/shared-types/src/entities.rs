//! # Core Domain Entities
//!
//! Records owned by the proposal registry and appended by the availability
//! pipeline.
//!
//! ## Ownership
//!
//! - **Registry**: `Identity`, `Node`, `AccessPolicy`, `IdentityRegistration`
//! - **Availability pipeline**: `NodeAvailability` (append-only)

use crate::identity::{Address, NodeKey, ProviderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wall-clock instant stored on records.
pub type Timestamp = DateTime<Utc>;

/// Service type assumed when a listing or ping does not name one.
pub const DEFAULT_SERVICE_TYPE: &str = "openvpn";

/// Node type used when the proposal's service definition does not carry one.
pub const DEFAULT_NODE_TYPE: &str = "data-center";

/// A registered identity. Created once; a second creation is a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub address: Address,
    pub created_at: Timestamp,
}

impl Identity {
    pub fn new(address: Address, created_at: Timestamp) -> Self {
        Self {
            address,
            created_at,
        }
    }
}

/// A provider's proposal for one service type.
///
/// Unregistering never deletes the row; it clears `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub key: NodeKey,
    /// The proposal document exactly as the provider submitted it.
    pub proposal: serde_json::Value,
    /// Resolved from `service_definition.location.node_type`.
    pub node_type: String,
    /// Source IP observed by the transport layer.
    pub ip: Option<String>,
    pub created_at: Timestamp,
    /// Last registration or ping; `None` once unregistered.
    pub updated_at: Option<Timestamp>,
}

impl Node {
    /// A fresh, not yet active node record.
    pub fn new(key: NodeKey, proposal: serde_json::Value, created_at: Timestamp) -> Self {
        Self {
            key,
            proposal,
            node_type: DEFAULT_NODE_TYPE.to_string(),
            ip: None,
            created_at,
            updated_at: None,
        }
    }

    pub fn provider(&self) -> &ProviderId {
        &self.key.provider
    }

    pub fn service_type(&self) -> &str {
        &self.key.service_type
    }

    /// Refresh liveness.
    pub fn mark_activity(&mut self, now: Timestamp) {
        self.updated_at = Some(now);
    }

    /// Make the node inactive without deleting it.
    pub fn clear_activity(&mut self) {
        self.updated_at = None;
    }

    /// Active iff `now - updated_at <= timeout`.
    ///
    /// An `updated_at` in the future (clock skew between writers) counts as
    /// active.
    pub fn is_active(&self, now: Timestamp, timeout: Duration) -> bool {
        match self.updated_at {
            None => false,
            Some(updated_at) => now
                .signed_duration_since(updated_at)
                .to_std()
                .map(|elapsed| elapsed <= timeout)
                .unwrap_or(true),
        }
    }
}

/// One access policy attached to a provider's proposals.
///
/// Keyed by (provider, id, source).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub provider: ProviderId,
    pub id: String,
    pub source: String,
}

impl AccessPolicy {
    pub fn new(
        provider: impl Into<ProviderId>,
        id: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            id: id.into(),
            source: source.into(),
        }
    }

    /// Whether this policy satisfies an `access_policy[id]`/`[source]` filter.
    pub fn matches(&self, id: &str, source: Option<&str>) -> bool {
        self.id == id && source.map_or(true, |s| self.source == s)
    }
}

/// On-chain registration marker; presence makes a provider bounty-eligible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRegistration {
    pub provider: ProviderId,
    /// Address the identity was registered from on chain.
    pub registration_address: String,
    pub created_at: Timestamp,
}

/// Append-only liveness ping fact written by the availability pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAvailability {
    pub provider: ProviderId,
    pub service_type: String,
    pub recorded_at: Timestamp,
}

impl NodeAvailability {
    pub fn new(key: &NodeKey, recorded_at: Timestamp) -> Self {
        Self {
            provider: key.provider.clone(),
            service_type: key.service_type.clone(),
            recorded_at,
        }
    }

    pub fn node_key(&self) -> NodeKey {
        NodeKey::new(self.provider.clone(), self.service_type.clone())
    }
}
