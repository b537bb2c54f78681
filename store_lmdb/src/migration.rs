//! Schema upgrade ladder.
//!
//! A monotone version number in the meta table guards the on-disk layout.
//! Opening an older database runs each `upgrade_vN_to_vN+1` step in order
//! inside the opening write transaction; a failure aborts startup with
//! nothing committed. A database written by a newer version refuses to open.

use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};

use lattice_store::versioning::{AccountInfoV1, AccountInfoV5, PendingInfoV3};
use lattice_store::{AccountInfo, BlockInfo, PendingInfo, PendingKey, StoreError};
use lattice_types::{Account, BlockHash};

use crate::block_info::BLOCK_INFO_MAX;
use crate::{visitors, LmdbError, Store};

/// The schema version this code reads and writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 10;

impl Store {
    pub(crate) fn do_upgrades(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        let stored = self.version_get(txn)?;
        if stored == CURRENT_SCHEMA_VERSION {
            return Ok(());
        }
        if stored > CURRENT_SCHEMA_VERSION {
            return Err(StoreError::VersionTooNew {
                stored,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        for version in stored..CURRENT_SCHEMA_VERSION {
            tracing::info!(from = version, to = version + 1, "running schema upgrade");
            match version {
                1 => self.upgrade_v1_to_v2(txn)?,
                2 => self.upgrade_v2_to_v3(txn)?,
                3 => self.upgrade_v3_to_v4(txn)?,
                4 => self.upgrade_v4_to_v5(txn)?,
                5 => self.upgrade_v5_to_v6(txn)?,
                6 => self.upgrade_v6_to_v7(txn)?,
                7 => self.upgrade_v7_to_v8(txn)?,
                8 => self.upgrade_v8_to_v9(txn)?,
                9 => self.upgrade_v9_to_v10(txn)?,
                other => {
                    return Err(StoreError::Corruption(format!(
                        "no upgrade path from schema version {}",
                        other
                    )))
                }
            }
        }
        self.version_put(txn, CURRENT_SCHEMA_VERSION)?;
        tracing::info!(version = CURRENT_SCHEMA_VERSION, "schema upgrade complete");
        Ok(())
    }

    fn raw_entries(
        &self,
        txn: &RoTxn,
        db: Database<Bytes, Bytes>,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        let mut entries = Vec::new();
        for result in db.iter(txn).map_err(LmdbError::from)? {
            let (key, value) = result.map_err(LmdbError::from)?;
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }

    /// Walk a chain backward from `head` to its first block.
    fn find_open_block(&self, txn: &RoTxn, head: &BlockHash) -> Result<BlockHash, StoreError> {
        let mut current = *head;
        loop {
            let block = self
                .block_get(txn, &current)?
                .expect("chain walk hit a missing block");
            let previous = block.previous();
            if previous.is_zero() {
                return Ok(current);
            }
            current = previous;
        }
    }

    /// v1 -> v2: account records gain the `open_block` field.
    fn upgrade_v1_to_v2(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        for (key, value) in self.raw_entries(txn, self.accounts)? {
            let old = AccountInfoV1::from_bytes(&value)?;
            let open_block = self.find_open_block(txn, &old.head)?;
            let new = AccountInfoV5 {
                head: old.head,
                rep_block: old.rep_block,
                open_block,
                balance: old.balance,
                modified: old.modified,
            };
            self.accounts
                .put(txn, &key, &new.to_bytes())
                .map_err(LmdbError::from)?;
        }
        Ok(())
    }

    /// v2 -> v3: the representation table is rebuilt from account balances.
    fn upgrade_v2_to_v3(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        self.representation_clear(txn)?;
        for (_, value) in self.raw_entries(txn, self.accounts)? {
            let info = AccountInfoV5::from_bytes(&value)?;
            let rep_block = self
                .block_get(txn, &info.rep_block)?
                .expect("rep block missing during representation rebuild");
            self.representation_add(txn, &rep_block.representative(), info.balance)?;
        }
        Ok(())
    }

    /// v3 -> v4: pending entries are re-keyed from the send hash alone to
    /// `(destination, send hash)`, dropping the destination from the value.
    fn upgrade_v3_to_v4(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        let old_entries = self.raw_entries(txn, self.pending)?;
        self.pending.clear(txn).map_err(LmdbError::from)?;
        for (key, value) in old_entries {
            let hash = BlockHash::from_bytes(key.as_slice().try_into().map_err(|_| {
                StoreError::Corruption("v3 pending key has unexpected length".to_string())
            })?);
            let old = PendingInfoV3::from_bytes(&value)?;
            self.pending_put(
                txn,
                &PendingKey::new(old.destination, hash),
                &PendingInfo::new(old.source, old.amount),
            )?;
        }
        Ok(())
    }

    /// v4 -> v5: successor tail slots are backfilled by walking each chain
    /// backward from its head.
    fn upgrade_v4_to_v5(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        for (_, value) in self.raw_entries(txn, self.accounts)? {
            let info = AccountInfoV5::from_bytes(&value)?;
            let mut current = info.head;
            loop {
                let block = self
                    .block_get(txn, &current)?
                    .expect("chain walk hit a missing block");
                let previous = block.previous();
                if previous.is_zero() {
                    break;
                }
                self.block_successor_set(txn, &previous, &current)?;
                current = previous;
            }
        }
        Ok(())
    }

    /// v5 -> v6: account records gain the `block_count` field.
    fn upgrade_v5_to_v6(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        for (key, value) in self.raw_entries(txn, self.accounts)? {
            let old = AccountInfoV5::from_bytes(&value)?;
            let mut block_count = 0u64;
            let mut current = old.head;
            while !current.is_zero() {
                block_count += 1;
                let block = self
                    .block_get(txn, &current)?
                    .expect("chain walk hit a missing block");
                current = block.previous();
            }
            let new = AccountInfo {
                head: old.head,
                rep_block: old.rep_block,
                open_block: old.open_block,
                balance: old.balance,
                modified: old.modified,
                block_count,
            };
            self.accounts
                .put(txn, &key, &new.to_bytes())
                .map_err(LmdbError::from)?;
        }
        Ok(())
    }

    /// v6 -> v7: the unchecked buffer changed format; drop it, bootstrap
    /// refills it.
    fn upgrade_v6_to_v7(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        self.unchecked_clear(txn)
    }

    /// v7 -> v8: unchecked entries move to composite multimap keys so one
    /// dependency can buffer several blocks.
    fn upgrade_v7_to_v8(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        let old_entries = self.raw_entries(txn, self.unchecked)?;
        self.unchecked.clear(txn).map_err(LmdbError::from)?;
        for (key, value) in old_entries {
            let dependency = BlockHash::from_bytes(key.as_slice().try_into().map_err(|_| {
                StoreError::Corruption("v7 unchecked key has unexpected length".to_string())
            })?);
            let (block, _) =
                lattice_blocks::deserialize_block(&value).map_err(LmdbError::from)?;
            self.unchecked_put_table(txn, &dependency, &block)?;
        }
        Ok(())
    }

    /// v8 -> v9: the vote table is introduced. Nothing to migrate; the table
    /// is created at open.
    fn upgrade_v8_to_v9(&self, _txn: &mut RwTxn) -> Result<(), StoreError> {
        Ok(())
    }

    /// v9 -> v10: blocks-info snapshots are rebuilt at the 32-block cadence
    /// (and the state block table is introduced, created at open).
    fn upgrade_v9_to_v10(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        self.block_info_clear(txn)?;
        for (key, value) in self.raw_entries(txn, self.accounts)? {
            let info = AccountInfo::from_bytes(&value)?;
            if info.block_count < BLOCK_INFO_MAX {
                continue;
            }
            let account = Account::from_bytes(key.as_slice().try_into().map_err(|_| {
                StoreError::Corruption("account key has unexpected length".to_string())
            })?);
            let mut block_count = 1u64;
            let mut current = Some(info.open_block);
            while let Some(hash) = current {
                if block_count % BLOCK_INFO_MAX == 0 {
                    let is_state = matches!(
                        self.block_get(txn, &hash)?,
                        Some(lattice_blocks::Block::State(_))
                    );
                    if !is_state {
                        let balance = visitors::balance(self, txn, &hash)?;
                        self.block_info_put(txn, &hash, &BlockInfo { account, balance })?;
                    }
                }
                current = self.block_successor(txn, &hash)?;
                block_count += 1;
            }
        }
        Ok(())
    }
}
