//! # Signature Auth Service
//!
//! Implements [`RequestAuthenticator`]: header decoding followed by address
//! recovery over the body. Stateless; side-effect free apart from logging.

use crate::domain::errors::AuthError;
use crate::domain::header::decode_authorization_header;
use crate::domain::recovery::recover_address;
use crate::ports::inbound::RequestAuthenticator;
use shared_types::Address;
use tracing::debug;

/// Default authenticator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureAuthService;

impl SignatureAuthService {
    pub fn new() -> Self {
        Self
    }
}

impl RequestAuthenticator for SignatureAuthService {
    fn authenticate(&self, authorization: Option<&str>, body: &[u8]) -> Result<Address, AuthError> {
        let result = decode_authorization_header(authorization)
            .and_then(|signature| recover_address(body, &signature));

        match &result {
            Ok(address) => debug!(caller = %address, body_len = body.len(), "Request authenticated"),
            Err(e) => debug!(error = %e, "Request authentication failed"),
        }

        result
    }
}
