//! Unsynced table — blocks known locally but not yet broadcast.

use heed::{RoTxn, RwTxn};

use lattice_store::StoreError;
use lattice_types::BlockHash;

use crate::{LmdbError, Store};

impl Store {
    pub fn unsynced_put(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        self.unsynced
            .put(txn, hash.as_bytes(), &[])
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn unsynced_del(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        self.unsynced
            .delete(txn, hash.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn unsynced_exists(&self, txn: &RoTxn, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self
            .unsynced
            .get(txn, hash.as_bytes())
            .map_err(LmdbError::from)?
            .is_some())
    }

    /// Hashes awaiting broadcast, in key order.
    pub fn unsynced_entries(&self, txn: &RoTxn) -> Result<Vec<BlockHash>, StoreError> {
        let mut entries = Vec::new();
        for result in self.unsynced.iter(txn).map_err(LmdbError::from)? {
            let (key, _) = result.map_err(LmdbError::from)?;
            entries.push(BlockHash::from_bytes(key.try_into().map_err(|_| {
                StoreError::Corruption("unsynced key has unexpected length".to_string())
            })?));
        }
        Ok(entries)
    }
}
