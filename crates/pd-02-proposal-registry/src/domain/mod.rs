//! # Domain Layer
//!
//! Payload decoding, request validation, policy reconciliation and listing
//! filters. No I/O.

pub mod config;
pub mod errors;
pub mod filter;
pub mod payload;
pub mod policies;
pub mod requests;

pub use config::{RegistryConfig, DEFAULT_AVAILABILITY_TIMEOUT};
pub use errors::{OracleError, RegistryError, StoreError};
pub use filter::{AccessPolicyFilter, ProposalFilter, ServiceTypeFilter};
pub use payload::{parse_object, JsonObject, PayloadKind, StringField};
pub use policies::PolicyDiff;
pub use requests::{RegistrationClaim, RegistrationRequest, UnregisterRequest};
