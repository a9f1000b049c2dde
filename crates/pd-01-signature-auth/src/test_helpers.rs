//! # Test Signers
//!
//! Produce `Authorization` headers the way a client would, for unit and
//! end-to-end tests.

use crate::domain::header::encode_authorization_header;
use crate::domain::recovery::{address_from_pubkey, keccak256, SignatureBytes, SIGNATURE_LENGTH};
use k256::ecdsa::SigningKey;
use shared_types::Address;

/// Fixed private key so test addresses are stable across runs.
const STATIC_KEY: [u8; 32] = [
    0x4c, 0x08, 0x83, 0xa6, 0x91, 0x02, 0x93, 0x7d, 0x62, 0x31, 0x47, 0x1b, 0x5d, 0xbb, 0x62, 0x04,
    0xfe, 0x51, 0x29, 0x61, 0x70, 0x82, 0x79, 0x2a, 0xe4, 0x68, 0xd0, 0x1a, 0x3f, 0x36, 0x23, 0x18,
];

/// A client-side signer.
#[derive(Clone)]
pub struct StaticSigner {
    key: SigningKey,
}

impl StaticSigner {
    /// Signer over the fixed test key.
    pub fn new() -> Self {
        Self {
            key: SigningKey::from_slice(&STATIC_KEY).expect("static key is a valid scalar"),
        }
    }

    /// Signer over a fresh random key.
    pub fn random() -> Self {
        Self {
            key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    pub fn address(&self) -> Address {
        address_from_pubkey(self.key.verifying_key())
    }

    /// Sign `keccak256(body)`, Ethereum-style `v` (27/28).
    pub fn sign(&self, body: &[u8]) -> SignatureBytes {
        let (sig, recid) = self
            .key
            .sign_prehash_recoverable(&keccak256(body))
            .expect("signing failed");

        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recid.to_byte() + 27;
        out
    }

    /// Full `Authorization` header value for `body`.
    pub fn authorization_header(&self, body: &[u8]) -> String {
        encode_authorization_header(&self.sign(body))
    }
}

impl Default for StaticSigner {
    fn default() -> Self {
        Self::new()
    }
}
