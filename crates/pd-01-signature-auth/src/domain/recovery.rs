//! # Address Recovery (secp256k1)
//!
//! Pure function of message and signature: recovers the signer's address.
//!
//! ## Scheme
//!
//! - Message hash: `keccak256(message)`
//! - Signature: 65 bytes, `r (32) || s (32) || v (1)`
//! - `v` accepts both raw (0/1) and Ethereum-offset (27/28) recovery ids
//! - Address: last 20 bytes of `keccak256(uncompressed_pubkey[1..])`
//!
//! Only low-S signatures are accepted. A high-S signature is the malleated
//! twin of a valid one and is refused before recovery.

use super::errors::AuthError;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};
use shared_types::{Address, ADDRESS_LENGTH};

/// Length of an `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Raw recoverable signature bytes.
pub type SignatureBytes = [u8; SIGNATURE_LENGTH];

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// Derive the address of a public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag.
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut address = [0u8; ADDRESS_LENGTH];
    address.copy_from_slice(&hash[32 - ADDRESS_LENGTH..]);
    Address::from_bytes(address)
}

/// Recover the address that signed `message`.
///
/// An empty message is valid and recovers deterministically.
pub fn recover_address(message: &[u8], signature: &SignatureBytes) -> Result<Address, AuthError> {
    let recovery_id = parse_recovery_id(signature[64])?;

    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| AuthError::RecoveryFailed(e.to_string()))?;
    if sig.normalize_s().is_some() {
        return Err(AuthError::RecoveryFailed("non-canonical high-S value".to_string()));
    }

    let message_hash = keccak256(message);
    let recovered = VerifyingKey::recover_from_prehash(&message_hash, &sig, recovery_id)
        .map_err(|e| AuthError::RecoveryFailed(e.to_string()))?;

    Ok(address_from_pubkey(&recovered))
}

/// Recover from an arbitrary-length byte slice, enforcing the 65-byte format.
pub fn recover_address_from_slice(message: &[u8], signature: &[u8]) -> Result<Address, AuthError> {
    let bytes: &SignatureBytes = signature
        .try_into()
        .map_err(|_| AuthError::InvalidSignatureFormat)?;
    recover_address(message, bytes)
}

fn parse_recovery_id(v: u8) -> Result<RecoveryId, AuthError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(AuthError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| AuthError::InvalidRecoveryId(v))
}
