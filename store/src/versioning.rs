//! Superseded record layouts, kept for the schema upgrade ladder.

use crate::StoreError;
use lattice_types::{Account, Amount, BlockHash};

/// Account record as written by schema v1 (no open block, no block count).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountInfoV1 {
    pub head: BlockHash,
    pub rep_block: BlockHash,
    pub balance: Amount,
    pub modified: u64,
}

impl AccountInfoV1 {
    pub const SIZE: usize = 32 + 32 + 16 + 8;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..32].copy_from_slice(self.head.as_bytes());
        bytes[32..64].copy_from_slice(self.rep_block.as_bytes());
        bytes[64..80].copy_from_slice(&self.balance.to_le_bytes());
        bytes[80..88].copy_from_slice(&self.modified.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != Self::SIZE {
            return Err(StoreError::Corruption(format!(
                "v1 account info record has {} bytes, expected {}",
                bytes.len(),
                Self::SIZE
            )));
        }
        Ok(Self {
            head: BlockHash::from_bytes(bytes[0..32].try_into().expect("checked length")),
            rep_block: BlockHash::from_bytes(bytes[32..64].try_into().expect("checked length")),
            balance: Amount::from_le_bytes(bytes[64..80].try_into().expect("checked length")),
            modified: u64::from_le_bytes(bytes[80..88].try_into().expect("checked length")),
        })
    }
}

/// Account record as written by schemas v2 through v5 (no block count).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountInfoV5 {
    pub head: BlockHash,
    pub rep_block: BlockHash,
    pub open_block: BlockHash,
    pub balance: Amount,
    pub modified: u64,
}

impl AccountInfoV5 {
    pub const SIZE: usize = 32 + 32 + 32 + 16 + 8;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..32].copy_from_slice(self.head.as_bytes());
        bytes[32..64].copy_from_slice(self.rep_block.as_bytes());
        bytes[64..96].copy_from_slice(self.open_block.as_bytes());
        bytes[96..112].copy_from_slice(&self.balance.to_le_bytes());
        bytes[112..120].copy_from_slice(&self.modified.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != Self::SIZE {
            return Err(StoreError::Corruption(format!(
                "v5 account info record has {} bytes, expected {}",
                bytes.len(),
                Self::SIZE
            )));
        }
        Ok(Self {
            head: BlockHash::from_bytes(bytes[0..32].try_into().expect("checked length")),
            rep_block: BlockHash::from_bytes(bytes[32..64].try_into().expect("checked length")),
            open_block: BlockHash::from_bytes(bytes[64..96].try_into().expect("checked length")),
            balance: Amount::from_le_bytes(bytes[96..112].try_into().expect("checked length")),
            modified: u64::from_le_bytes(bytes[112..120].try_into().expect("checked length")),
        })
    }
}

/// Pending record as written by schemas v1 through v3: keyed by the send
/// hash alone, carrying the destination in the value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingInfoV3 {
    pub source: Account,
    pub amount: Amount,
    pub destination: Account,
}

impl PendingInfoV3 {
    pub const SIZE: usize = 32 + 16 + 32;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..32].copy_from_slice(self.source.as_bytes());
        bytes[32..48].copy_from_slice(&self.amount.to_le_bytes());
        bytes[48..80].copy_from_slice(self.destination.as_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != Self::SIZE {
            return Err(StoreError::Corruption(format!(
                "v3 pending record has {} bytes, expected {}",
                bytes.len(),
                Self::SIZE
            )));
        }
        Ok(Self {
            source: Account::from_bytes(bytes[0..32].try_into().expect("checked length")),
            amount: Amount::from_le_bytes(bytes[32..48].try_into().expect("checked length")),
            destination: Account::from_bytes(bytes[48..80].try_into().expect("checked length")),
        })
    }
}
