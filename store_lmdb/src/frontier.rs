//! Frontier table — reverse lookup from a legacy chain head to its account.
//!
//! State-block heads have no frontier entry; the account travels in-band.
//! That absence is what makes a legacy block built on a state head
//! unresolvable, and therefore rejected.

use heed::{RoTxn, RwTxn};

use lattice_store::StoreError;
use lattice_types::{Account, BlockHash};

use crate::{LmdbError, Store};

impl Store {
    pub fn frontier_put(
        &self,
        txn: &mut RwTxn,
        hash: &BlockHash,
        account: &Account,
    ) -> Result<(), StoreError> {
        self.frontiers
            .put(txn, hash.as_bytes(), account.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn frontier_get(&self, txn: &RoTxn, hash: &BlockHash) -> Result<Option<Account>, StoreError> {
        let value = self
            .frontiers
            .get(txn, hash.as_bytes())
            .map_err(LmdbError::from)?;
        match value {
            Some(bytes) if bytes.len() == 32 => Ok(Some(Account::from_bytes(
                bytes.try_into().expect("checked length"),
            ))),
            Some(_) => Err(StoreError::Corruption(
                "frontier record has unexpected length".to_string(),
            )),
            None => Ok(None),
        }
    }

    pub fn frontier_del(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        self.frontiers
            .delete(txn, hash.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn frontier_count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.frontiers.len(txn).map_err(LmdbError::from)?)
    }
}
