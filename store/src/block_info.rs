//! Chain-walk shortcut entries and block table counts.

use crate::StoreError;
use lattice_types::{Account, Amount};

/// Cached `(account, balance)` summary written every 32nd legacy block, so
/// balance and account derivation never walk more than 32 blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub account: Account,
    pub balance: Amount,
}

impl BlockInfo {
    pub const SIZE: usize = 32 + 16;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..32].copy_from_slice(self.account.as_bytes());
        bytes[32..48].copy_from_slice(&self.balance.to_le_bytes());
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        if bytes.len() != Self::SIZE {
            return Err(StoreError::Corruption(format!(
                "block info record has {} bytes, expected {}",
                bytes.len(),
                Self::SIZE
            )));
        }
        Ok(Self {
            account: Account::from_bytes(bytes[0..32].try_into().expect("checked length")),
            balance: Amount::from_le_bytes(bytes[32..48].try_into().expect("checked length")),
        })
    }
}

/// Per-variant block counts across the five block tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockCounts {
    pub send: u64,
    pub receive: u64,
    pub open: u64,
    pub change: u64,
    pub state: u64,
}

impl BlockCounts {
    pub fn sum(&self) -> u64 {
        self.send + self.receive + self.open + self.change + self.state
    }
}
