//! Signing key material and signatures.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 32-byte Ed25519 private key (secret scalar).
///
/// This type intentionally does not implement `Debug` or `Serialize` to
/// prevent accidental exposure.
#[derive(Clone)]
pub struct RawKey(pub [u8; 32]);

impl RawKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse the 64-character hex form. Case-insensitive.
    pub fn decode_hex(s: &str) -> Option<Self> {
        if s.len() != 64 {
            return None;
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

/// A 64-byte Ed25519 signature over a block or vote hash.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    pub const ZERO: Self = Self([0u8; 64]);

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Uppercase hex form (128 characters).
    pub fn encode_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse the 128-character hex form. Case-insensitive.
    pub fn decode_hex(s: &str) -> Option<Self> {
        if s.len() != 128 {
            return None;
        }
        let mut bytes = [0u8; 64];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes: Vec<u8> = Deserialize::deserialize(deserializer)?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected exactly 64 bytes for Signature"))?;
        Ok(Signature(arr))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self.0[..4].iter().map(|b| format!("{:02X}", b)).collect();
        write!(f, "Signature({}…)", hex)
    }
}
