//! Ed25519 key pairs.

use ed25519_dalek::SigningKey;
use lattice_types::{Account, RawKey};

/// An Ed25519 key pair. The account (public key) is derived from the private
/// key scalar.
pub struct KeyPair {
    pub public: Account,
    pub private: RawKey,
}

impl KeyPair {
    /// Generate a new key pair from OS entropy.
    pub fn generate() -> Self {
        let mut seed = [0u8; 32];
        getrandom::getrandom(&mut seed).expect("OS entropy source unavailable");
        Self::from_private(RawKey(seed))
    }

    /// Reconstruct a key pair from a private key.
    pub fn from_private(private: RawKey) -> Self {
        let signing_key = SigningKey::from_bytes(private.as_bytes());
        let public = Account::from_bytes(signing_key.verifying_key().to_bytes());
        Self { public, private }
    }

    /// Reconstruct a key pair from the 64-character hex form of the private
    /// key. Returns `None` for malformed input.
    pub fn from_hex(hex: &str) -> Option<Self> {
        RawKey::decode_hex(hex).map(Self::from_private)
    }
}
