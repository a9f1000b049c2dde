//! # Authorization Header Decoding
//!
//! Format: `Signature <base64(r || s || v)>`.
//!
//! Each way the header can be wrong maps to its own [`AuthError`] variant so
//! callers can tell "no header", "wrong scheme", "empty value" and "bad
//! base64" apart.

use super::errors::AuthError;
use super::recovery::{SignatureBytes, SIGNATURE_LENGTH};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Scheme token expected in front of the signature.
pub const AUTH_SCHEME: &str = "Signature";

/// Parse the raw header value into signature bytes.
pub fn decode_authorization_header(value: Option<&str>) -> Result<SignatureBytes, AuthError> {
    let value = value.ok_or(AuthError::MissingHeader)?;

    let parts: Vec<&str> = value.split(' ').collect();
    let [scheme, encoded] = parts.as_slice() else {
        return Err(AuthError::MalformedHeader);
    };

    if *scheme != AUTH_SCHEME {
        return Err(AuthError::WrongScheme);
    }
    if encoded.is_empty() {
        return Err(AuthError::EmptySignature);
    }

    let decoded = STANDARD
        .decode(encoded)
        .map_err(|e| AuthError::InvalidBase64(e.to_string()))?;

    if decoded.len() != SIGNATURE_LENGTH {
        return Err(AuthError::InvalidSignatureFormat);
    }

    let mut signature = [0u8; SIGNATURE_LENGTH];
    signature.copy_from_slice(&decoded);
    Ok(signature)
}

/// Build a header value for a signature.
pub fn encode_authorization_header(signature: &SignatureBytes) -> String {
    format!("{AUTH_SCHEME} {}", STANDARD.encode(signature))
}
