//! # Inbound Ports (Driving Ports / API)

use crate::domain::errors::AuthError;
use shared_types::Address;

/// Binds a request to the identity that signed it.
///
/// Implementations must be thread-safe (`Send + Sync`): one instance serves
/// every request handler.
pub trait RequestAuthenticator: Send + Sync {
    /// Recover the caller from the raw `Authorization` header value and the
    /// exact request body bytes.
    fn authenticate(&self, authorization: Option<&str>, body: &[u8]) -> Result<Address, AuthError>;
}
