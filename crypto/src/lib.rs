//! Cryptographic primitives for the lattice ledger.
//!
//! Blake2b-256 digests for block and vote hashing, and Ed25519 signing and
//! verification keyed directly by account public keys.

pub mod hash;
pub mod keys;
pub mod sign;

pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::KeyPair;
pub use sign::{sign_message, validate_message};
