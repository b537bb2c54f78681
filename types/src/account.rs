//! Account identifiers — 256-bit Ed25519 public keys.
//!
//! An account has two textual forms: 64-character uppercase hex, and a
//! checksummed "account form": `lat_` + base32(public_key, 52 chars) +
//! base32(checksum, 8 chars), where the checksum is the first 5 bytes of
//! Blake2b-256(public_key). The base32 alphabet avoids visually ambiguous
//! characters (no 0/O, 2/Z, l/I, v).

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base32 alphabet (32 chars, avoids visually ambiguous 0/O, 2/Z, l/I, v).
const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// Reverse lookup table: ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE32_ALPHABET;
    let mut i = 0;
    while i < 32 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Prefix for all lattice account strings.
const PREFIX: &str = "lat_";
/// Number of base32 characters for the public key (256 bits → ceil(256/5) = 52).
const KEY_CHARS: usize = 52;
/// Number of base32 characters for the checksum (40 bits → 8).
const CHECKSUM_CHARS: usize = 8;

/// A 256-bit Ed25519 public key identifying an account chain.
///
/// The all-zero key is the designated burn account.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Account([u8; 32]);

impl Account {
    /// The burn account.
    pub const ZERO: Self = Self([0u8; 32]);

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Uppercase hex form (64 characters).
    pub fn encode_hex(&self) -> String {
        hex::encode_upper(self.0)
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

    /// Encode as the checksummed `lat_` account form.
    pub fn encode_account(&self) -> String {
        let key = encode_base32(&self.0);
        let checksum = encode_base32(&account_checksum(&self.0));
        format!("{}{}{}", PREFIX, key, checksum)
    }

    /// Parse the `lat_` account form, validating length and checksum.
    pub fn decode_account(s: &str) -> Option<Self> {
        let encoded = s.strip_prefix(PREFIX)?;
        if encoded.len() != KEY_CHARS + CHECKSUM_CHARS {
            return None;
        }
        let key: [u8; 32] = decode_base32_fixed(&encoded[..KEY_CHARS])?;
        let checksum: [u8; 5] = decode_base32_fixed(&encoded[KEY_CHARS..])?;
        if checksum != account_checksum(&key) {
            return None;
        }
        Some(Self(key))
    }
}

fn account_checksum(key: &[u8; 32]) -> [u8; 5] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(key);
    let digest = hasher.finalize();
    let mut checksum = [0u8; 5];
    checksum.copy_from_slice(&digest[..5]);
    checksum
}

/// Encode a byte slice as base32, padding the final character with zero bits.
fn encode_base32(bytes: &[u8]) -> String {
    let num_chars = (bytes.len() * 8).div_ceil(5);
    let mut result = String::with_capacity(num_chars);
    let mut buffer: u64 = 0;
    let mut bits = 0;
    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            result.push(BASE32_ALPHABET[((buffer >> bits) & 0x1F) as usize] as char);
        }
    }
    if bits > 0 {
        result.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1F) as usize] as char);
    }
    result
}

/// Decode a base32 string into a fixed-size byte array. Returns `None` on
/// invalid characters or insufficient length.
fn decode_base32_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut buffer: u64 = 0;
    let mut bits = 0;
    let mut result = [0u8; N];
    let mut pos = 0;
    for c in s.bytes() {
        if c >= 128 {
            return None;
        }
        let val = BASE32_DECODE[c as usize];
        if val == 0xFF {
            return None;
        }
        buffer = (buffer << 5) | val as u64;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            if pos < N {
                result[pos] = (buffer >> bits) as u8;
                pos += 1;
            }
        }
    }
    if pos < N {
        return None;
    }
    Some(result)
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self.0[..4].iter().map(|b| format!("{:02X}", b)).collect();
        write!(f, "Account({}…)", hex)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode_hex())
    }
}
