//! The ledger — chain queries, weights, tallies and shared index plumbing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use heed::{RoTxn, RwTxn};

use lattice_blocks::{Block, StateBlock};
use lattice_consensus::Votes;
use lattice_store::{AccountInfo, BlockInfo, StoreError};
use lattice_store_lmdb::block_info::BLOCK_INFO_MAX;
use lattice_store_lmdb::{visitors, Store};
use lattice_types::{seconds_since_epoch, Account, Amount, BlockHash};

use crate::constants::LedgerConstants;

/// The ledger core: a store plus the network constants, weight overrides and
/// the operations that interpret them.
pub struct Ledger {
    pub store: Arc<Store>,
    pub constants: LedgerConstants,
    /// Weight overrides served while the ledger is still syncing from
    /// scratch, before delegations are locally known.
    pub bootstrap_weights: HashMap<Account, Amount>,
    /// Total block count below which the bootstrap overrides apply.
    pub bootstrap_weight_max_blocks: u64,
    check_bootstrap_weights: AtomicBool,
}

impl Ledger {
    pub fn new(store: Arc<Store>, constants: LedgerConstants) -> Self {
        Self {
            store,
            constants,
            bootstrap_weights: HashMap::new(),
            bootstrap_weight_max_blocks: 0,
            check_bootstrap_weights: AtomicBool::new(true),
        }
    }

    // --- Chain visitors -------------------------------------------------

    /// Balance of the chain containing `hash`, as of `hash`.
    pub fn balance(&self, txn: &RoTxn, hash: &BlockHash) -> Result<Amount, StoreError> {
        visitors::balance(&self.store, txn, hash)
    }

    /// Balance delta contributed by `hash` alone.
    pub fn amount(&self, txn: &RoTxn, hash: &BlockHash) -> Result<Amount, StoreError> {
        visitors::amount(&self.store, txn, hash)
    }

    /// Hash of the open/change/state block designating the representative in
    /// force at `hash`.
    pub fn representative(&self, txn: &RoTxn, hash: &BlockHash) -> Result<BlockHash, StoreError> {
        visitors::representative(&self.store, txn, hash)
    }

    /// Account owning the chain that contains `hash`. Walks forward via
    /// successor pointers until a blocks-info snapshot, a state block or the
    /// frontier resolves the owner.
    pub fn account(&self, txn: &RoTxn, hash: &BlockHash) -> Result<Account, StoreError> {
        let mut current = *hash;
        let mut block = self
            .store
            .block_get(txn, &current)?
            .expect("account lookup on a missing block");
        loop {
            if let Block::State(b) = &block {
                return Ok(b.hashables.account);
            }
            match self.store.block_successor(txn, &current)? {
                None => {
                    return Ok(self
                        .store
                        .frontier_get(txn, &current)?
                        .expect("legacy head lacks a frontier entry"));
                }
                Some(successor) => {
                    if let Some(info) = self.store.block_info_get(txn, &successor)? {
                        return Ok(info.account);
                    }
                    current = successor;
                    block = self
                        .store
                        .block_get(txn, &current)?
                        .expect("successor pointer to a missing block");
                }
            }
        }
    }

    // --- Account queries ------------------------------------------------

    /// Balance from the account table; zero for unopened accounts.
    pub fn account_balance(&self, txn: &RoTxn, account: &Account) -> Result<Amount, StoreError> {
        Ok(self
            .store
            .account_get(txn, account)?
            .map(|info| info.balance)
            .unwrap_or(Amount::ZERO))
    }

    /// Sum of all unreceived sends destined to an account.
    pub fn account_pending(&self, txn: &RoTxn, account: &Account) -> Result<Amount, StoreError> {
        let mut total = Amount::ZERO;
        for (_, info) in self.store.pending_for_account(txn, account)? {
            total = total.checked_add(info.amount).expect("pending sum overflow");
        }
        Ok(total)
    }

    /// Head block of an account's chain.
    pub fn latest(&self, txn: &RoTxn, account: &Account) -> Result<Option<BlockHash>, StoreError> {
        Ok(self.store.account_get(txn, account)?.map(|info| info.head))
    }

    /// Election root for the account's next block: its head, or the account
    /// number itself when no block exists yet.
    pub fn latest_root(&self, txn: &RoTxn, account: &Account) -> Result<BlockHash, StoreError> {
        Ok(match self.store.account_get(txn, account)? {
            Some(info) => info.head,
            None => BlockHash::from(*account),
        })
    }

    /// Total recorded value: account balances plus unreceived sends. Equals
    /// the genesis amount on any consistent store.
    pub fn supply(&self, txn: &RoTxn) -> Result<Amount, StoreError> {
        let mut total = Amount::ZERO;
        for (_, info) in self.store.account_entries(txn)? {
            total = total.checked_add(info.balance).expect("supply overflow");
        }
        for (_, info) in self.store.pending_entries(txn)? {
            total = total.checked_add(info.amount).expect("supply overflow");
        }
        Ok(total)
    }

    // --- Weights and tallies ----------------------------------------------

    /// Voting weight delegated to an account, honoring the bootstrap
    /// override while the local block count is below the configured bound.
    pub fn weight(&self, txn: &RoTxn, account: &Account) -> Result<Amount, StoreError> {
        if self.check_bootstrap_weights.load(Ordering::Relaxed) {
            let blocks = self.store.block_count(txn)?.sum();
            if blocks < self.bootstrap_weight_max_blocks {
                if let Some(weight) = self.bootstrap_weights.get(account) {
                    return Ok(*weight);
                }
            } else {
                self.check_bootstrap_weights.store(false, Ordering::Relaxed);
            }
        }
        self.store.representation_get(txn, account)
    }

    /// Weight totals per competing block, descending; equal weights are
    /// ordered by descending block hash.
    pub fn tally(
        &self,
        txn: &RoTxn,
        votes: &Votes,
    ) -> Result<Vec<(Amount, Arc<Block>)>, StoreError> {
        let mut totals: Vec<(Arc<Block>, Amount)> = Vec::new();
        for (rep, block) in &votes.rep_votes {
            let weight = self.weight(txn, rep)?;
            match totals.iter_mut().find(|(existing, _)| **existing == **block) {
                Some((_, total)) => {
                    *total = total.checked_add(weight).expect("tally overflow");
                }
                None => totals.push((Arc::clone(block), weight)),
            }
        }
        let mut result: Vec<(Amount, Arc<Block>)> =
            totals.into_iter().map(|(block, weight)| (weight, block)).collect();
        result.sort_by(|a, b| (b.0, b.1.hash()).cmp(&(a.0, a.1.hash())));
        Ok(result)
    }

    /// The winning block of an election and its weight.
    pub fn winner(&self, txn: &RoTxn, votes: &Votes) -> Result<(Amount, Arc<Block>), StoreError> {
        let tally = self.tally(txn, votes)?;
        let (weight, block) = tally
            .into_iter()
            .next()
            .expect("election holds at least its initial block");
        Ok((weight, block))
    }

    // --- Block relations --------------------------------------------------

    /// The block following `root` on its chain. `root` may be a block hash
    /// or an account number (whose successor is the open block).
    pub fn successor(&self, txn: &RoTxn, root: &BlockHash) -> Result<Option<Block>, StoreError> {
        let next = match self.store.account_get(txn, &root.as_account())? {
            Some(info) => Some(info.open_block),
            None => self.store.block_successor(txn, root)?,
        };
        match next {
            Some(hash) => self.store.block_get(txn, &hash),
            None => Ok(None),
        }
    }

    /// For a block rejected as a fork, the block currently occupying its
    /// contested root.
    pub fn forked_block(&self, txn: &RoTxn, block: &Block) -> Result<Option<Block>, StoreError> {
        let root = block.root();
        if let Some(successor) = self.store.block_successor(txn, &root)? {
            return self.store.block_get(txn, &successor);
        }
        match self.store.account_get(txn, &root.as_account())? {
            Some(info) => self.store.block_get(txn, &info.open_block),
            None => Ok(None),
        }
    }

    /// Whether a state block lowers its chain's balance.
    pub fn is_send(&self, txn: &RoTxn, block: &StateBlock) -> Result<bool, StoreError> {
        if block.hashables.previous.is_zero() {
            return Ok(false);
        }
        let previous = self.balance(txn, &block.hashables.previous)?;
        Ok(block.hashables.balance < previous)
    }

    /// Destination account of a send (legacy or state); zero otherwise.
    pub fn block_destination(&self, txn: &RoTxn, block: &Block) -> Result<Account, StoreError> {
        match block {
            Block::Send(b) => Ok(b.hashables.destination),
            Block::State(b) if self.is_send(txn, b)? => Ok(b.hashables.link.as_account()),
            _ => Ok(Account::ZERO),
        }
    }

    /// Source block hash of a receive (legacy or state); zero otherwise.
    pub fn block_source(&self, txn: &RoTxn, block: &Block) -> Result<BlockHash, StoreError> {
        match block {
            Block::State(b) if !self.is_send(txn, b)? => Ok(b.hashables.link.as_block_hash()),
            _ => Ok(block.source()),
        }
    }

    pub fn block_exists(&self, txn: &RoTxn, hash: &BlockHash) -> Result<bool, StoreError> {
        self.store.block_exists(txn, hash)
    }

    /// JSON rendering of a stored block.
    pub fn block_text(&self, txn: &RoTxn, hash: &BlockHash) -> Result<Option<String>, StoreError> {
        Ok(self.store.block_get(txn, hash)?.map(|block| {
            serde_json::to_string_pretty(&block.to_json()).expect("JSON rendering cannot fail")
        }))
    }

    /// Debug aid: print an account chain head-to-open on stderr.
    pub fn dump_account_chain(&self, txn: &RoTxn, account: &Account) -> Result<(), StoreError> {
        let mut hash = self.latest(txn, account)?.unwrap_or(BlockHash::ZERO);
        while !hash.is_zero() {
            let block = self
                .store
                .block_get(txn, &hash)?
                .expect("chain walk hit a missing block");
            eprintln!("{}", hash);
            hash = block.previous();
        }
        Ok(())
    }

    // --- Canaries ---------------------------------------------------------

    /// State blocks are accepted once the parse canary block is stored.
    pub fn state_block_parsing_enabled(&self, txn: &RoTxn) -> Result<bool, StoreError> {
        self.store
            .block_exists(txn, &self.constants.state_block_parse_canary)
    }

    /// State-block creation additionally requires the generate canary.
    pub fn state_block_generation_enabled(&self, txn: &RoTxn) -> Result<bool, StoreError> {
        Ok(self.state_block_parsing_enabled(txn)?
            && self
                .store
                .block_exists(txn, &self.constants.state_block_generate_canary)?)
    }

    // --- Shared mutation plumbing ----------------------------------------

    /// Fold a hash into (or out of) the `(0, 0)` rolling checksum.
    pub(crate) fn checksum_update(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        let mut checksum = self.store.checksum_get(txn, 0, 0)?.unwrap_or_default();
        checksum.xor(hash);
        self.store.checksum_put(txn, 0, 0, &checksum)
    }

    /// Representative account designated by a rep block.
    pub(crate) fn rep_block_account(
        &self,
        txn: &RoTxn,
        rep_block: &BlockHash,
    ) -> Result<Account, StoreError> {
        let block = self
            .store
            .block_get(txn, rep_block)?
            .expect("representative block missing");
        Ok(block.representative())
    }

    /// Move an account's summary to a new head (or delete the account when
    /// `hash` is zero), writing the blocks-info snapshot on the 32-block
    /// cadence for legacy heads.
    pub(crate) fn change_latest(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        hash: &BlockHash,
        rep_block: &BlockHash,
        balance: Amount,
        block_count: u64,
        is_state: bool,
    ) -> Result<(), StoreError> {
        if hash.is_zero() {
            return self.store.account_del(txn, account);
        }
        let open_block = match self.store.account_get(txn, account)? {
            Some(info) => info.open_block,
            None => *hash,
        };
        self.store.account_put(
            txn,
            account,
            &AccountInfo {
                head: *hash,
                rep_block: *rep_block,
                open_block,
                balance,
                modified: seconds_since_epoch(),
                block_count,
            },
        )?;
        if block_count % BLOCK_INFO_MAX == 0 && !is_state {
            self.store.block_info_put(
                txn,
                hash,
                &BlockInfo {
                    account: *account,
                    balance,
                },
            )?;
        }
        Ok(())
    }
}
