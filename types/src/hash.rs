//! Block hashes, link fields and the rolling checksum.

use crate::Account;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 32-byte Blake2b-256 digest identifying a block.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHash([u8; 32]);

impl BlockHash {
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

    /// Reinterpret as an account number. Election roots and rep-designating
    /// block references share the 256-bit key space with accounts.
    pub fn as_account(&self) -> Account {
        Account::from_bytes(self.0)
    }
}

impl From<Account> for BlockHash {
    fn from(account: Account) -> Self {
        Self(*account.as_bytes())
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self.0[..4].iter().map(|b| format!("{:02X}", b)).collect();
        write!(f, "BlockHash({}…)", hex)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode_hex())
    }
}

/// The 256-bit link field of a state block.
///
/// Read as a destination account when the block is a send, as a source block
/// hash when it is a receive, and zero for a pure representative change.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link([u8; 32]);

impl Link {
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

    pub fn as_account(&self) -> Account {
        Account::from_bytes(self.0)
    }

    pub fn as_block_hash(&self) -> BlockHash {
        BlockHash::from_bytes(self.0)
    }

    pub fn encode_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Parse either the 64-hex form or the checksummed account form.
    pub fn decode(s: &str) -> Option<Self> {
        if let Some(account) = Account::decode_account(s) {
            return Some(Self(*account.as_bytes()));
        }
        if s.len() != 64 {
            return None;
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl From<Account> for Link {
    fn from(account: Account) -> Self {
        Self(*account.as_bytes())
    }
}

impl From<BlockHash> for Link {
    fn from(hash: BlockHash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self.0[..4].iter().map(|b| format!("{:02X}", b)).collect();
        write!(f, "Link({}…)", hex)
    }
}

/// XOR-rolling checksum over all stored block hashes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum([u8; 32]);

impl Checksum {
    pub const ZERO: Self = Self([0u8; 32]);

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Fold a block hash in (or back out — XOR is its own inverse).
    pub fn xor(&mut self, hash: &BlockHash) {
        for (byte, other) in self.0.iter_mut().zip(hash.as_bytes()) {
            *byte ^= other;
        }
    }
}

impl From<BlockHash> for Checksum {
    fn from(hash: BlockHash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self.0[..4].iter().map(|b| format!("{:02X}", b)).collect();
        write!(f, "Checksum({}…)", hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let hash = BlockHash::from_bytes([0x5A; 32]);
        assert_eq!(BlockHash::decode_hex(&hash.encode_hex()), Some(hash));
    }

    #[test]
    fn link_decodes_both_forms() {
        let account = Account::from_bytes([9u8; 32]);
        let from_account = Link::decode(&account.encode_account()).unwrap();
        let from_hex = Link::decode(&account.encode_hex()).unwrap();
        assert_eq!(from_account, from_hex);
        assert_eq!(from_account.as_account(), account);
    }

    #[test]
    fn link_rejects_garbage() {
        assert!(Link::decode("not a link").is_none());
    }

    #[test]
    fn checksum_xor_is_involution() {
        let hash = BlockHash::from_bytes([0x11; 32]);
        let mut checksum = Checksum::ZERO;
        checksum.xor(&hash);
        assert_eq!(checksum, Checksum::from(hash));
        checksum.xor(&hash);
        assert_eq!(checksum, Checksum::ZERO);
    }

    #[test]
    fn checksum_accumulates_unordered() {
        let a = BlockHash::from_bytes([1; 32]);
        let b = BlockHash::from_bytes([2; 32]);
        let mut forward = Checksum::ZERO;
        forward.xor(&a);
        forward.xor(&b);
        let mut reverse = Checksum::ZERO;
        reverse.xor(&b);
        reverse.xor(&a);
        assert_eq!(forward, reverse);
    }
}
