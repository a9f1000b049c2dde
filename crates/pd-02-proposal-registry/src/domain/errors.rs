//! # Registry Errors

use thiserror::Error;

/// Storage-layer failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing engine failed (I/O, corruption, closed handle).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored record could not be encoded or decoded.
    #[error("record serialization error: {0}")]
    Serialization(String),
}

/// The identity oracle could not answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("identity oracle unavailable: {0}")]
pub struct OracleError(pub String);

/// Errors surfaced by registry operations.
///
/// Validation and authorization variants are raised before any mutation.
/// Their messages are returned to HTTP callers verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Body is malformed JSON or a JSON value other than an object.
    #[error("payload must be a valid json")]
    InvalidPayload,

    #[error("missing service_proposal")]
    MissingServiceProposal,

    #[error("missing provider_id")]
    MissingProviderId,

    #[error("missing service_type")]
    MissingServiceType,

    /// `provider_id` names someone other than the signer.
    #[error("provider_id does not match current identity")]
    IdentityMismatch,

    /// Strict verification is on and the oracle does not know the caller.
    #[error("identity is not registered")]
    UnregisteredIdentity,

    #[error("identity already exists")]
    IdentityAlreadyExists,

    /// No node for the requested (provider, service type).
    #[error("node key not found")]
    NodeNotFound,

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// True for failures of collaborators rather than of the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, RegistryError::Oracle(_) | RegistryError::Store(_))
    }
}
