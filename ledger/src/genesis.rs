//! Genesis initialization — seeding an empty store with a network's first
//! block and the entire supply.

use heed::RwTxn;

use lattice_blocks::{Block, OpenBlock};
use lattice_store::{AccountInfo, StoreError};
use lattice_store_lmdb::Store;
use lattice_types::{seconds_since_epoch, BlockHash, Checksum, GENESIS_AMOUNT};

use crate::constants::LedgerConstants;

/// A network's genesis open block.
pub struct Genesis {
    pub open: OpenBlock,
}

impl Genesis {
    pub fn new(constants: &LedgerConstants) -> Self {
        Self {
            open: constants.genesis_block.clone(),
        }
    }

    pub fn hash(&self) -> BlockHash {
        self.open.hash()
    }

    /// Write the genesis block and every index it implies: the account entry
    /// holding the full supply, the representation entry delegating it, the
    /// checksum seed and the frontier.
    pub fn initialize(&self, txn: &mut RwTxn, store: &Store) -> Result<(), StoreError> {
        let hash = self.hash();
        let account = self.open.hashables.account;
        debug_assert_eq!(store.account_count(txn)?, 0, "store already initialized");
        store.block_put(txn, &hash, &Block::Open(self.open.clone()))?;
        store.account_put(
            txn,
            &account,
            &AccountInfo {
                head: hash,
                rep_block: hash,
                open_block: hash,
                balance: GENESIS_AMOUNT,
                modified: seconds_since_epoch(),
                block_count: 1,
            },
        )?;
        store.representation_put(txn, &self.open.hashables.representative, GENESIS_AMOUNT)?;
        store.checksum_put(txn, 0, 0, &Checksum::from(hash))?;
        store.frontier_put(txn, &hash, &account)?;
        tracing::info!(genesis = %hash, "genesis initialized");
        Ok(())
    }
}
