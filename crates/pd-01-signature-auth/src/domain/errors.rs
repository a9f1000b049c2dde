//! # Authentication Errors
//!
//! Every variant names its sub-cause; the messages are part of the HTTP
//! contract and are returned to callers verbatim.

use thiserror::Error;

/// Errors raised while decoding an `Authorization` header and recovering
/// the signer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header at all.
    #[error("missing Authorization in request header")]
    MissingHeader,

    /// Header value is not exactly `<scheme> <value>`.
    #[error(
        "invalid Authorization header value provided, correct format: Signature <signature_base64_encoded>"
    )]
    MalformedHeader,

    /// Scheme token is something other than `Signature`.
    #[error("authentication type have to be Signature")]
    WrongScheme,

    /// `Signature ` with nothing after it.
    #[error("signature was not provided")]
    EmptySignature,

    /// Signature value is not valid base64.
    #[error("signature must be base64 encoded: {0}")]
    InvalidBase64(String),

    /// Decoded signature is not 65 bytes (r || s || v).
    #[error("invalid signature format: Unexpected signature format.  Must be length 65 byte string")]
    InvalidSignatureFormat,

    /// Recovery byte is not 0, 1, 27 or 28.
    #[error("invalid signature: invalid recovery id {0}")]
    InvalidRecoveryId(u8),

    /// The curve math rejected the signature.
    #[error("invalid signature: {0}")]
    RecoveryFailed(String),
}
