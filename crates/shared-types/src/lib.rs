//! # Shared Types Crate
//!
//! This crate contains the records and identifiers shared by the discovery
//! components: the signature-auth decoder, the proposal registry, the
//! availability pipeline and the HTTP gateway.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Node`, `AccessPolicy`, `IdentityRegistration`
//!   and `NodeAvailability` are defined once, here.
//! - **Canonical Identity**: an [`Address`] always renders as `0x` followed by
//!   40 lowercase hex digits; a [`ProviderId`] is always lowercase, so
//!   comparisons never depend on how a client cased its address.
//! - **Runtime Toggles**: behaviour that operators and tests flip at runtime
//!   (identity verification, throttling) lives in [`FeatureFlags`].

pub mod entities;
pub mod errors;
pub mod flags;
pub mod identity;
pub mod rate_limiter;

pub use entities::*;
pub use errors::*;
pub use flags::FeatureFlags;
pub use identity::{Address, NodeKey, ProviderId, ADDRESS_LENGTH};
pub use rate_limiter::{ActionClass, ActionThrottle, ThrottleKey};
