//! Unreceived sends.

use crate::StoreError;
use lattice_types::{Account, Amount, BlockHash};

/// Key of a pending entry: the destination account and the send block hash.
///
/// The composite binary key sorts all of one destination's pending entries
/// contiguously, so a prefix scan enumerates an account's receivables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingKey {
    pub destination: Account,
    pub hash: BlockHash,
}

impl PendingKey {
    pub const SIZE: usize = 32 + 32;

    pub fn new(destination: Account, hash: BlockHash) -> Self {
        Self { destination, hash }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..32].copy_from_slice(self.destination.as_bytes());
        bytes[32..64].copy_from_slice(self.hash.as_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != Self::SIZE {
            return Err(StoreError::Corruption(format!(
                "pending key has {} bytes, expected {}",
                bytes.len(),
                Self::SIZE
            )));
        }
        Ok(Self {
            destination: Account::from_bytes(bytes[0..32].try_into().expect("checked length")),
            hash: BlockHash::from_bytes(bytes[32..64].try_into().expect("checked length")),
        })
    }
}

/// Value of a pending entry: who sent it and how much.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingInfo {
    pub source: Account,
    pub amount: Amount,
}

impl PendingInfo {
    pub const SIZE: usize = 32 + 16;

    pub fn new(source: Account, amount: Amount) -> Self {
        Self { source, amount }
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..32].copy_from_slice(self.source.as_bytes());
        bytes[32..48].copy_from_slice(&self.amount.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != Self::SIZE {
            return Err(StoreError::Corruption(format!(
                "pending info record has {} bytes, expected {}",
                bytes.len(),
                Self::SIZE
            )));
        }
        Ok(Self {
            source: Account::from_bytes(bytes[0..32].try_into().expect("checked length")),
            amount: Amount::from_le_bytes(bytes[32..48].try_into().expect("checked length")),
        })
    }
}
