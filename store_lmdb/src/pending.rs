//! Pending table — unreceived sends keyed by (destination, send hash).

use std::ops::Bound;

use heed::{RoTxn, RwTxn};

use lattice_store::{PendingInfo, PendingKey, StoreError};
use lattice_types::Account;

use crate::{increment_prefix, LmdbError, Store};

impl Store {
    pub fn pending_put(
        &self,
        txn: &mut RwTxn,
        key: &PendingKey,
        info: &PendingInfo,
    ) -> Result<(), StoreError> {
        self.pending
            .put(txn, &key.to_bytes(), &info.to_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn pending_get(
        &self,
        txn: &RoTxn,
        key: &PendingKey,
    ) -> Result<Option<PendingInfo>, StoreError> {
        let value = self
            .pending
            .get(txn, &key.to_bytes())
            .map_err(LmdbError::from)?;
        value.map(PendingInfo::from_bytes).transpose()
    }

    pub fn pending_del(&self, txn: &mut RwTxn, key: &PendingKey) -> Result<(), StoreError> {
        self.pending
            .delete(txn, &key.to_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn pending_exists(&self, txn: &RoTxn, key: &PendingKey) -> Result<bool, StoreError> {
        Ok(self.pending_get(txn, key)?.is_some())
    }

    pub fn pending_count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.pending.len(txn).map_err(LmdbError::from)?)
    }

    /// All pending entries destined to one account, in send-hash order.
    pub fn pending_for_account(
        &self,
        txn: &RoTxn,
        destination: &Account,
    ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
        let lower = destination.as_bytes().to_vec();
        let mut upper = lower.clone();
        let bounds = match increment_prefix(&mut upper) {
            Some(()) => (
                Bound::Included(lower.as_slice()),
                Bound::Excluded(upper.as_slice()),
            ),
            None => (Bound::Included(lower.as_slice()), Bound::Unbounded),
        };
        let mut entries = Vec::new();
        for result in self.pending.range(txn, &bounds).map_err(LmdbError::from)? {
            let (key, value) = result.map_err(LmdbError::from)?;
            entries.push((PendingKey::from_bytes(key)?, PendingInfo::from_bytes(value)?));
        }
        Ok(entries)
    }

    /// Every pending entry in the store, in key order.
    pub fn pending_entries(
        &self,
        txn: &RoTxn,
    ) -> Result<Vec<(PendingKey, PendingInfo)>, StoreError> {
        let mut entries = Vec::new();
        for result in self.pending.iter(txn).map_err(LmdbError::from)? {
            let (key, value) = result.map_err(LmdbError::from)?;
            entries.push((PendingKey::from_bytes(key)?, PendingInfo::from_bytes(value)?));
        }
        Ok(entries)
    }
}
