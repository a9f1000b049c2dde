//! # Listing Filters
//!
//! Predicates applied to active nodes when consumers query proposals.
//! Liveness is checked separately by the service.

use shared_types::{AccessPolicy, Node, ProviderId, DEFAULT_SERVICE_TYPE};

/// Literal that disables the service type restriction.
pub const ALL_SERVICE_TYPES: &str = "all";

/// Literal that disables the access policy restriction.
pub const ANY_ACCESS_POLICY: &str = "*";

/// Service type restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceTypeFilter {
    All,
    Exact(String),
}

impl ServiceTypeFilter {
    /// An omitted or empty parameter means openvpn, for older clients.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.filter(|s| !s.is_empty()) {
            None => ServiceTypeFilter::Exact(DEFAULT_SERVICE_TYPE.to_string()),
            Some(ALL_SERVICE_TYPES) => ServiceTypeFilter::All,
            Some(other) => ServiceTypeFilter::Exact(other.to_string()),
        }
    }

    pub fn matches(&self, service_type: &str) -> bool {
        match self {
            ServiceTypeFilter::All => true,
            ServiceTypeFilter::Exact(wanted) => wanted == service_type,
        }
    }
}

impl Default for ServiceTypeFilter {
    fn default() -> Self {
        Self::from_param(None)
    }
}

/// Access policy restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccessPolicyFilter {
    /// No policy parameters: only providers without policies are listed.
    #[default]
    PublicOnly,
    /// `access_policy=*`: policies are ignored.
    Any,
    /// `access_policy[id]` with optional `access_policy[source]`.
    Matching { id: String, source: Option<String> },
}

impl AccessPolicyFilter {
    /// Build from the raw query parameters. The wildcard wins over an id.
    pub fn from_params(wildcard: Option<&str>, id: Option<&str>, source: Option<&str>) -> Self {
        if wildcard == Some(ANY_ACCESS_POLICY) {
            return AccessPolicyFilter::Any;
        }
        match id.filter(|s| !s.is_empty()) {
            Some(id) => AccessPolicyFilter::Matching {
                id: id.to_string(),
                source: source.filter(|s| !s.is_empty()).map(str::to_string),
            },
            None => AccessPolicyFilter::PublicOnly,
        }
    }

    pub fn matches(&self, policies: &[AccessPolicy]) -> bool {
        match self {
            AccessPolicyFilter::PublicOnly => policies.is_empty(),
            AccessPolicyFilter::Any => true,
            AccessPolicyFilter::Matching { id, source } => policies
                .iter()
                .any(|policy| policy.matches(id, source.as_deref())),
        }
    }
}

/// Everything a listing can be restricted by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProposalFilter {
    /// Exact provider.
    pub node_key: Option<ProviderId>,
    pub service_type: ServiceTypeFilter,
    /// Exact resolved node type.
    pub node_type: Option<String>,
    pub access_policy: AccessPolicyFilter,
    /// Only providers with an identity registration.
    pub bounty_only: bool,
}

impl ProposalFilter {
    /// Cheap per-node predicates that need no extra lookups.
    pub fn matches_node(&self, node: &Node) -> bool {
        self.node_key
            .as_ref()
            .map_or(true, |provider| node.provider() == provider)
            && self.service_type.matches(node.service_type())
            && self
                .node_type
                .as_deref()
                .map_or(true, |node_type| node.node_type == node_type)
    }
}
