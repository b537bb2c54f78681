//! Ed25519 message signing and verification.
//!
//! Accounts are Ed25519 public keys, so verification is keyed directly by
//! `Account`. Block signatures sign the 32-byte block hash; vote signatures
//! sign the vote digest.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use lattice_types::{Account, RawKey, Signature};

/// Sign a message with a private key, returning the signature.
pub fn sign_message(private_key: &RawKey, message: &[u8]) -> Signature {
    let signing_key = SigningKey::from_bytes(private_key.as_bytes());
    Signature(signing_key.sign(message).to_bytes())
}

/// Verify a signature against a message and the signing account's public key.
///
/// Returns false for malformed public keys as well as invalid signatures.
pub fn validate_message(account: &Account, message: &[u8], signature: &Signature) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(account.as_bytes()) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    verifying_key.verify(message, &signature).is_ok()
}
