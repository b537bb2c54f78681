//! Unchecked table — blocks buffered until their missing dependency arrives.
//!
//! One dependency can hold up many blocks, so entries use composite keys
//! `dependency_hash || block_hash` to emulate a multimap. New arrivals land
//! in the in-memory cache first; [`Store::flush`] moves them to the table.

use std::ops::Bound;

use heed::{RoTxn, RwTxn};

use lattice_blocks::{deserialize_block, serialize_block, Block};
use lattice_store::StoreError;
use lattice_types::BlockHash;

use crate::{increment_prefix, LmdbError, Store};

fn unchecked_key(dependency: &BlockHash, block_hash: &BlockHash) -> [u8; 64] {
    let mut key = [0u8; 64];
    key[..32].copy_from_slice(dependency.as_bytes());
    key[32..].copy_from_slice(block_hash.as_bytes());
    key
}

impl Store {
    /// Buffer a block under the dependency that is missing for it. Lands in
    /// the cache; the table is written at the next flush.
    pub fn unchecked_put(&self, dependency: &BlockHash, block: &Block) {
        let mut cache = self.unchecked_cache.lock().expect("unchecked cache poisoned");
        let entries = cache.entry(*dependency).or_default();
        if !entries.contains(block) {
            entries.push(block.clone());
        }
    }

    pub(crate) fn unchecked_put_table(
        &self,
        txn: &mut RwTxn,
        dependency: &BlockHash,
        block: &Block,
    ) -> Result<(), StoreError> {
        let mut value = Vec::new();
        serialize_block(&mut value, block);
        self.unchecked
            .put(txn, &unchecked_key(dependency, &block.hash()), &value)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    /// All blocks waiting on a dependency, from the cache and the table.
    pub fn unchecked_get(
        &self,
        txn: &RoTxn,
        dependency: &BlockHash,
    ) -> Result<Vec<Block>, StoreError> {
        let mut blocks = {
            let cache = self.unchecked_cache.lock().expect("unchecked cache poisoned");
            cache.get(dependency).cloned().unwrap_or_default()
        };
        let lower = dependency.as_bytes().to_vec();
        let mut upper = lower.clone();
        let bounds = match increment_prefix(&mut upper) {
            Some(()) => (
                Bound::Included(lower.as_slice()),
                Bound::Excluded(upper.as_slice()),
            ),
            None => (Bound::Included(lower.as_slice()), Bound::Unbounded),
        };
        for result in self.unchecked.range(txn, &bounds).map_err(LmdbError::from)? {
            let (_, value) = result.map_err(LmdbError::from)?;
            let (block, _) = deserialize_block(value).map_err(LmdbError::from)?;
            if !blocks.contains(&block) {
                blocks.push(block);
            }
        }
        Ok(blocks)
    }

    /// Remove one buffered block from both the cache and the table.
    pub fn unchecked_del(
        &self,
        txn: &mut RwTxn,
        dependency: &BlockHash,
        block: &Block,
    ) -> Result<(), StoreError> {
        {
            let mut cache = self.unchecked_cache.lock().expect("unchecked cache poisoned");
            if let Some(entries) = cache.get_mut(dependency) {
                entries.retain(|entry| entry != block);
                if entries.is_empty() {
                    cache.remove(dependency);
                }
            }
        }
        self.unchecked
            .delete(txn, &unchecked_key(dependency, &block.hash()))
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn unchecked_clear(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        self.unchecked_cache
            .lock()
            .expect("unchecked cache poisoned")
            .clear();
        self.unchecked.clear(txn).map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn unchecked_count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        let cached: u64 = {
            let cache = self.unchecked_cache.lock().expect("unchecked cache poisoned");
            cache.values().map(|entries| entries.len() as u64).sum()
        };
        Ok(cached + self.unchecked.len(txn).map_err(LmdbError::from)?)
    }
}
