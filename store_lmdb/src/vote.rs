//! Vote table and cache — the highest-sequence vote seen per representative.
//!
//! Reads go through the in-memory cache and fall back to the table; writes
//! land in the cache under its mutex and reach the table at the next flush,
//! keeping election hot paths off the write transaction.

use std::sync::Arc;

use heed::{RoTxn, RwTxn};

use lattice_blocks::{Block, Vote};
use lattice_store::StoreError;
use lattice_types::{Account, RawKey};

use crate::{LmdbError, Store};

impl Store {
    /// Latest vote recorded for an account in the table (cache ignored).
    pub fn vote_get(&self, txn: &RoTxn, account: &Account) -> Result<Option<Arc<Vote>>, StoreError> {
        let value = self
            .vote
            .get(txn, account.as_bytes())
            .map_err(LmdbError::from)?;
        match value {
            Some(bytes) => {
                let vote = Vote::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(Arc::new(vote)))
            }
            None => Ok(None),
        }
    }

    /// Latest vote for an account, consulting the cache first.
    pub fn vote_current(
        &self,
        txn: &RoTxn,
        account: &Account,
    ) -> Result<Option<Arc<Vote>>, StoreError> {
        {
            let cache = self.vote_cache.lock().expect("vote cache poisoned");
            if let Some(vote) = cache.get(account) {
                return Ok(Some(Arc::clone(vote)));
            }
        }
        self.vote_get(txn, account)
    }

    /// Keep whichever of `vote` and the stored vote has the higher sequence,
    /// and return it. The winner stays in the cache until the next flush.
    pub fn vote_max(&self, txn: &RoTxn, vote: Arc<Vote>) -> Result<Arc<Vote>, StoreError> {
        let current = self.vote_current(txn, &vote.account)?;
        let max = match current {
            Some(current) if current.sequence >= vote.sequence => current,
            _ => vote,
        };
        let mut cache = self.vote_cache.lock().expect("vote cache poisoned");
        cache.insert(max.account, Arc::clone(&max));
        Ok(max)
    }

    /// Build the next-sequence vote for an account and record it.
    pub fn vote_generate(
        &self,
        txn: &RoTxn,
        account: &Account,
        private_key: &RawKey,
        block: Block,
    ) -> Result<Arc<Vote>, StoreError> {
        let sequence = self
            .vote_current(txn, account)?
            .map(|vote| vote.sequence + 1)
            .unwrap_or(1);
        let vote = Arc::new(Vote::new(*account, private_key, sequence, block));
        let mut cache = self.vote_cache.lock().expect("vote cache poisoned");
        cache.insert(*account, Arc::clone(&vote));
        Ok(vote)
    }

    pub(crate) fn vote_put_table(&self, txn: &mut RwTxn, vote: &Vote) -> Result<(), StoreError> {
        let mut value = Vec::new();
        vote.serialize(&mut value);
        self.vote
            .put(txn, vote.account.as_bytes(), &value)
            .map_err(LmdbError::from)?;
        Ok(())
    }
}
