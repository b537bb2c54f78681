//! Per-account summary record.

use crate::StoreError;
use lattice_types::{Amount, BlockHash};

/// Latest information about an account: its chain head and running summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountInfo {
    /// Hash of the latest block in this account's chain.
    pub head: BlockHash,
    /// Hash of the block that designated the current representative.
    pub rep_block: BlockHash,
    /// Hash of the first block in this account's chain.
    pub open_block: BlockHash,
    pub balance: Amount,
    /// Seconds since the POSIX epoch at the last modification.
    pub modified: u64,
    /// Number of blocks in this account's chain.
    pub block_count: u64,
}

impl AccountInfo {
    pub const SIZE: usize = 32 + 32 + 32 + 16 + 8 + 8;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..32].copy_from_slice(self.head.as_bytes());
        bytes[32..64].copy_from_slice(self.rep_block.as_bytes());
        bytes[64..96].copy_from_slice(self.open_block.as_bytes());
        bytes[96..112].copy_from_slice(&self.balance.to_le_bytes());
        bytes[112..120].copy_from_slice(&self.modified.to_le_bytes());
        bytes[120..128].copy_from_slice(&self.block_count.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != Self::SIZE {
            return Err(StoreError::Corruption(format!(
                "account info record has {} bytes, expected {}",
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
            block_count: u64::from_le_bytes(bytes[120..128].try_into().expect("checked length")),
        })
    }
}
