//! LMDB storage backend for the lattice ledger.
//!
//! One environment holds all fifteen tables. Every method takes its
//! transaction explicitly: a single exclusive write transaction carries a
//! whole ledger operation and commits atomically, while any number of read
//! transactions observe a consistent snapshot. Two in-memory caches sit in
//! front of their tables (`unchecked`, `vote`) and are drained by
//! [`Store::flush`].

pub mod account;
pub mod block;
pub mod block_info;
pub mod checksum;
pub mod error;
pub mod frontier;
pub mod meta;
pub mod migration;
pub mod pending;
pub mod representation;
pub mod unchecked;
pub mod unsynced;
pub mod visitors;
pub mod vote;

pub use error::LmdbError;
pub use migration::CURRENT_SCHEMA_VERSION;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};

use lattice_blocks::{Block, Vote};
use lattice_store::StoreError;
use lattice_types::{Account, BlockHash};

const MAX_DBS: u32 = 16;
const MAP_SIZE: usize = 1 << 30;

/// All ledger tables within one LMDB environment.
pub struct Store {
    env: Env,
    /// block hash -> account. Maps legacy head blocks to the owning account.
    pub(crate) frontiers: Database<Bytes, Bytes>,
    /// account -> head, rep block, open block, balance, modified, block count.
    pub(crate) accounts: Database<Bytes, Bytes>,
    /// block hash -> block body, successor.
    pub(crate) send_blocks: Database<Bytes, Bytes>,
    /// block hash -> block body, successor.
    pub(crate) receive_blocks: Database<Bytes, Bytes>,
    /// block hash -> block body, successor.
    pub(crate) open_blocks: Database<Bytes, Bytes>,
    /// block hash -> block body, successor.
    pub(crate) change_blocks: Database<Bytes, Bytes>,
    /// block hash -> block body, successor.
    pub(crate) state_blocks: Database<Bytes, Bytes>,
    /// (destination, send hash) -> source, amount.
    pub(crate) pending: Database<Bytes, Bytes>,
    /// block hash -> account, balance. Written every 32nd legacy block.
    pub(crate) blocks_info: Database<Bytes, Bytes>,
    /// representative account -> delegated weight.
    pub(crate) representation: Database<Bytes, Bytes>,
    /// (missing dependency hash, block hash) -> block. Bootstrap buffer.
    pub(crate) unchecked: Database<Bytes, Bytes>,
    /// block hash -> (). Blocks not yet broadcast.
    pub(crate) unsynced: Database<Bytes, Bytes>,
    /// (region, depth) -> 256-bit XOR of stored block hashes.
    pub(crate) checksum: Database<Bytes, Bytes>,
    /// representative account -> highest-sequence vote observed.
    pub(crate) vote: Database<Bytes, Bytes>,
    /// schema metadata.
    pub(crate) meta: Database<Bytes, Bytes>,
    /// In-memory mirror of the unchecked table for hot lookups.
    pub(crate) unchecked_cache: Mutex<HashMap<BlockHash, Vec<Block>>>,
    /// Latest vote per representative, read-through to the vote table.
    pub(crate) vote_cache: Mutex<HashMap<Account, Arc<Vote>>>,
}

impl Store {
    /// Open (or create) the environment at `path` and bring the schema up to
    /// the current version. Upgrade failure is fatal to startup.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path).map_err(LmdbError::from)?;
        let env = unsafe {
            EnvOpenOptions::new()
                .max_dbs(MAX_DBS)
                .map_size(MAP_SIZE)
                .open(path)
                .map_err(LmdbError::from)?
        };
        let mut txn = env.write_txn().map_err(LmdbError::from)?;
        let frontiers = create(&env, &mut txn, "frontiers")?;
        let accounts = create(&env, &mut txn, "accounts")?;
        let send_blocks = create(&env, &mut txn, "send_blocks")?;
        let receive_blocks = create(&env, &mut txn, "receive_blocks")?;
        let open_blocks = create(&env, &mut txn, "open_blocks")?;
        let change_blocks = create(&env, &mut txn, "change_blocks")?;
        let state_blocks = create(&env, &mut txn, "state_blocks")?;
        let pending = create(&env, &mut txn, "pending")?;
        let blocks_info = create(&env, &mut txn, "blocks_info")?;
        let representation = create(&env, &mut txn, "representation")?;
        let unchecked = create(&env, &mut txn, "unchecked")?;
        let unsynced = create(&env, &mut txn, "unsynced")?;
        let checksum = create(&env, &mut txn, "checksum")?;
        let vote = create(&env, &mut txn, "vote")?;
        let meta = create(&env, &mut txn, "meta")?;
        txn.commit().map_err(LmdbError::from)?;

        let store = Self {
            env,
            frontiers,
            accounts,
            send_blocks,
            receive_blocks,
            open_blocks,
            change_blocks,
            state_blocks,
            pending,
            blocks_info,
            representation,
            unchecked,
            unsynced,
            checksum,
            vote,
            meta,
            unchecked_cache: Mutex::new(HashMap::new()),
            vote_cache: Mutex::new(HashMap::new()),
        };
        let mut txn = store.write_txn()?;
        store.do_upgrades(&mut txn)?;
        txn.commit().map_err(LmdbError::from)?;
        tracing::debug!(path = %path.display(), "store opened");
        Ok(store)
    }

    /// Begin a read transaction observing a consistent snapshot.
    pub fn read_txn(&self) -> Result<RoTxn<'_>, StoreError> {
        Ok(self.env.read_txn().map_err(LmdbError::from)?)
    }

    /// Begin the (exclusive) write transaction.
    pub fn write_txn(&self) -> Result<RwTxn<'_>, StoreError> {
        Ok(self.env.write_txn().map_err(LmdbError::from)?)
    }

    /// Drain the unchecked and vote caches into their tables.
    ///
    /// Called periodically and on shutdown; until then the caches shadow the
    /// tables for readers that go through the store API.
    pub fn flush(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        let drained_unchecked: Vec<(BlockHash, Vec<Block>)> = {
            let mut cache = self.unchecked_cache.lock().expect("unchecked cache poisoned");
            cache.drain().collect()
        };
        for (dependency, blocks) in drained_unchecked {
            for block in blocks {
                self.unchecked_put_table(txn, &dependency, &block)?;
            }
        }
        let drained_votes: Vec<Arc<Vote>> = {
            let mut cache = self.vote_cache.lock().expect("vote cache poisoned");
            cache.drain().map(|(_, vote)| vote).collect()
        };
        for vote in drained_votes {
            self.vote_put_table(txn, &vote)?;
        }
        Ok(())
    }
}

fn create(env: &Env, txn: &mut RwTxn, name: &str) -> Result<Database<Bytes, Bytes>, StoreError> {
    Ok(env
        .create_database(txn, Some(name))
        .map_err(LmdbError::from)?)
}

/// Byte-increment a key prefix to form an exclusive upper bound for a prefix
/// scan. Returns `None` when the prefix is all `0xFF` (scan to the end).
pub(crate) fn increment_prefix(prefix: &mut [u8]) -> Option<()> {
    for byte in prefix.iter_mut().rev() {
        if *byte < 0xFF {
            *byte += 1;
            return Some(());
        }
        *byte = 0;
    }
    None
}
