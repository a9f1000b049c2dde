//! # Signature Auth (PD-01)
//!
//! Binds every mutating request to the identity that signed it, with no
//! sessions or API keys.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): header parsing and secp256k1 address
//!   recovery, no I/O
//! - **Ports Layer** (`ports/`): the [`RequestAuthenticator`] trait
//! - **Service Layer** (`service.rs`): [`SignatureAuthService`]
//!
//! ## Protocol
//!
//! 1. `Authorization: Signature <base64>` must be present and well formed
//! 2. The decoded signature must be exactly 65 bytes
//! 3. The signed message is the raw request body (empty is valid)
//! 4. The recovered address is rendered as lowercase `0x` hex

pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers;

// Re-export public API
pub use domain::errors::AuthError;
pub use domain::header::{decode_authorization_header, encode_authorization_header, AUTH_SCHEME};
pub use domain::recovery::{
    address_from_pubkey, keccak256, recover_address, recover_address_from_slice, SignatureBytes,
    SIGNATURE_LENGTH,
};
pub use ports::inbound::RequestAuthenticator;
pub use service::SignatureAuthService;
