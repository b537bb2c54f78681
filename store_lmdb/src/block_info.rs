//! Blocks-info table — `(account, balance)` snapshots every 32nd legacy
//! block, bounding the chain walks of the balance and account visitors.

use heed::{RoTxn, RwTxn};

use lattice_store::{BlockInfo, StoreError};
use lattice_types::BlockHash;

use crate::{LmdbError, Store};

/// Snapshot cadence: one entry per this many blocks of a chain.
pub const BLOCK_INFO_MAX: u64 = 32;

impl Store {
    pub fn block_info_put(
        &self,
        txn: &mut RwTxn,
        hash: &BlockHash,
        info: &BlockInfo,
    ) -> Result<(), StoreError> {
        self.blocks_info
            .put(txn, hash.as_bytes(), &info.to_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn block_info_get(
        &self,
        txn: &RoTxn,
        hash: &BlockHash,
    ) -> Result<Option<BlockInfo>, StoreError> {
        let value = self
            .blocks_info
            .get(txn, hash.as_bytes())
            .map_err(LmdbError::from)?;
        value.map(BlockInfo::from_bytes).transpose()
    }

    pub fn block_info_del(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        self.blocks_info
            .delete(txn, hash.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn block_info_exists(&self, txn: &RoTxn, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.block_info_get(txn, hash)?.is_some())
    }

    pub fn block_info_clear(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        self.blocks_info.clear(txn).map_err(LmdbError::from)?;
        Ok(())
    }
}
