//! # Validated Requests
//!
//! Turns decoded payloads into typed requests. Every check here runs before
//! any state is touched.

use super::errors::RegistryError;
use super::payload::{parse_access_policies, resolve_node_type, JsonObject, StringField};
use serde_json::Value;
use shared_types::{AccessPolicy, Address, NodeKey, ProviderId, DEFAULT_SERVICE_TYPE};
use std::collections::BTreeSet;

/// Check `provider_id` in `object` against the authenticated caller.
///
/// Absent or empty is `MissingProviderId`; any other value that is not the
/// caller's address (case-insensitively) is `IdentityMismatch`.
pub fn check_provider_id(object: &JsonObject, caller: &Address) -> Result<ProviderId, RegistryError> {
    match StringField::read(object, "provider_id") {
        StringField::Missing => Err(RegistryError::MissingProviderId),
        StringField::Text(claimed) if caller.matches(claimed) => Ok(ProviderId::from(caller)),
        _ => Err(RegistryError::IdentityMismatch),
    }
}

/// A registration whose envelope and identity binding have been checked,
/// waiting on the oracle and the service type.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationClaim {
    pub provider: ProviderId,
    proposal: JsonObject,
}

impl RegistrationClaim {
    /// Unwrap `{"service_proposal": {...}}` and bind `provider_id` to the caller.
    pub fn extract(caller: &Address, mut payload: JsonObject) -> Result<Self, RegistryError> {
        let proposal = match payload.remove("service_proposal") {
            Some(Value::Object(proposal)) => proposal,
            _ => return Err(RegistryError::MissingServiceProposal),
        };

        let provider = check_provider_id(&proposal, caller)?;
        Ok(Self { provider, proposal })
    }

    /// Require a service type and resolve the remaining fields.
    pub fn into_request(self) -> Result<RegistrationRequest, RegistryError> {
        let service_type = StringField::read(&self.proposal, "service_type")
            .text()
            .ok_or(RegistryError::MissingServiceType)?
            .to_string();

        let node_type = resolve_node_type(&self.proposal);
        let access_policies = parse_access_policies(&self.proposal, &self.provider);

        Ok(RegistrationRequest {
            key: NodeKey::new(self.provider, service_type),
            node_type,
            access_policies,
            proposal: Value::Object(self.proposal),
        })
    }
}

/// A fully validated registration, ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationRequest {
    pub key: NodeKey,
    /// The inner proposal document as submitted.
    pub proposal: Value,
    pub node_type: String,
    /// Desired policy set; replaces whatever the provider had before.
    pub access_policies: BTreeSet<AccessPolicy>,
}

/// Which of a provider's nodes an unregister affects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnregisterRequest {
    pub provider: ProviderId,
    /// `None` clears every service type of the provider.
    pub service_type: Option<String>,
}

impl UnregisterRequest {
    pub fn extract(caller: &Address, payload: &JsonObject) -> Result<Self, RegistryError> {
        let provider = check_provider_id(payload, caller)?;
        let service_type = StringField::read(payload, "service_type")
            .text()
            .map(str::to_string);
        Ok(Self {
            provider,
            service_type,
        })
    }
}

/// Service type named by a ping payload, defaulting to openvpn.
pub fn ping_service_type(payload: &JsonObject) -> String {
    StringField::read(payload, "service_type")
        .text()
        .unwrap_or(DEFAULT_SERVICE_TYPE)
        .to_string()
}
