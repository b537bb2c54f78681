//! Roll-back engine — the exact inverse of block application.
//!
//! `rollback(hash)` undoes an account chain from its head until `hash`
//! itself is gone. Undoing a send whose pending entry was already consumed
//! first unwinds the consuming chain; dependents are tracked on an explicit
//! work stack so deeply nested dependency chains cannot exhaust the call
//! stack. Every undone block leaves one fewer block on its account, so the
//! loop terminates.

use heed::RwTxn;

use lattice_blocks::{Block, ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, StateBlock};
use lattice_store::{AccountInfo, PendingInfo, PendingKey, StoreError};
use lattice_store_lmdb::block_info::BLOCK_INFO_MAX;
use lattice_types::{Account, Amount, BlockHash};

use crate::ledger::Ledger;

impl Ledger {
    /// Undo the chain containing `hash` from its head down until `hash` is
    /// no longer stored, unwinding dependent chains as needed.
    pub fn rollback(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        debug_assert!(self.store.block_exists(txn, hash)?);
        tracing::debug!(block = %hash, "rolling back");
        let mut targets = vec![*hash];
        while let Some(&target) = targets.last() {
            if !self.store.block_exists(txn, &target)? {
                targets.pop();
                continue;
            }
            let account = self.account(txn, &target)?;
            let info = self
                .store
                .account_get(txn, &account)?
                .expect("account entry missing during rollback");
            let head = self
                .store
                .block_get(txn, &info.head)?
                .expect("head block missing during rollback");
            if let Some(dependency) = self.rollback_dependency(txn, &head)? {
                targets.push(dependency);
                continue;
            }
            self.rollback_head(txn, &account, &info, &head)?;
        }
        Ok(())
    }

    /// If `head` is a send whose pending entry has been consumed, the
    /// consuming chain must unwind first; returns its current head.
    fn rollback_dependency(
        &self,
        txn: &RwTxn,
        head: &Block,
    ) -> Result<Option<BlockHash>, StoreError> {
        let (destination, hash) = match head {
            Block::Send(b) => (b.hashables.destination, head.hash()),
            Block::State(b) if self.is_send(txn, b)? => {
                (b.hashables.link.as_account(), head.hash())
            }
            _ => return Ok(None),
        };
        if self
            .store
            .pending_exists(txn, &PendingKey::new(destination, hash))?
        {
            return Ok(None);
        }
        let dependent_head = self
            .latest(txn, &destination)?
            .expect("consumed send with no destination chain");
        Ok(Some(dependent_head))
    }

    fn rollback_head(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        info: &AccountInfo,
        head: &Block,
    ) -> Result<(), StoreError> {
        match head {
            Block::Send(b) => self.rollback_send(txn, account, info, b),
            Block::Receive(b) => self.rollback_receive(txn, account, info, b),
            Block::Open(b) => self.rollback_open(txn, account, b),
            Block::Change(b) => self.rollback_change(txn, account, info, b),
            Block::State(b) => self.rollback_state(txn, info, b),
        }
    }

    fn rollback_send(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        info: &AccountInfo,
        block: &SendBlock,
    ) -> Result<(), StoreError> {
        let hash = block.hash();
        let key = PendingKey::new(block.hashables.destination, hash);
        let pending = self
            .store
            .pending_get(txn, &key)?
            .expect("pending entry restored before send rollback");
        self.store.pending_del(txn, &key)?;

        let rep_block = self.representative(txn, &hash)?;
        let rep_account = self.rep_block_account(txn, &rep_block)?;
        self.store
            .representation_add(txn, &rep_account, pending.amount)?;

        let previous_balance = self.balance(txn, &block.hashables.previous)?;
        self.change_latest(
            txn,
            account,
            &block.hashables.previous,
            &info.rep_block,
            previous_balance,
            info.block_count - 1,
            false,
        )?;
        self.store.block_del(txn, &hash)?;
        self.store.frontier_del(txn, &hash)?;
        self.store
            .frontier_put(txn, &block.hashables.previous, account)?;
        self.store
            .block_successor_clear(txn, &block.hashables.previous)?;
        if info.block_count % BLOCK_INFO_MAX == 0 {
            self.store.block_info_del(txn, &hash)?;
        }
        self.checksum_update(txn, &hash)
    }

    fn rollback_receive(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        info: &AccountInfo,
        block: &ReceiveBlock,
    ) -> Result<(), StoreError> {
        let hash = block.hash();
        let amount = self.amount(txn, &block.hashables.source)?;
        let source_account = self.account(txn, &block.hashables.source)?;

        let rep_block = self.representative(txn, &hash)?;
        let rep_account = self.rep_block_account(txn, &rep_block)?;
        self.store
            .representation_subtract(txn, &rep_account, amount)?;

        let restored_rep = self.representative(txn, &block.hashables.previous)?;
        let previous_balance = self.balance(txn, &block.hashables.previous)?;
        self.change_latest(
            txn,
            account,
            &block.hashables.previous,
            &restored_rep,
            previous_balance,
            info.block_count - 1,
            false,
        )?;
        self.store.block_del(txn, &hash)?;
        self.store.pending_put(
            txn,
            &PendingKey::new(*account, block.hashables.source),
            &PendingInfo::new(source_account, amount),
        )?;
        self.store.frontier_del(txn, &hash)?;
        self.store
            .frontier_put(txn, &block.hashables.previous, account)?;
        self.store
            .block_successor_clear(txn, &block.hashables.previous)?;
        if info.block_count % BLOCK_INFO_MAX == 0 {
            self.store.block_info_del(txn, &hash)?;
        }
        self.checksum_update(txn, &hash)
    }

    fn rollback_open(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        block: &OpenBlock,
    ) -> Result<(), StoreError> {
        let hash = block.hash();
        let amount = self.amount(txn, &block.hashables.source)?;
        let source_account = self.account(txn, &block.hashables.source)?;

        self.store
            .representation_subtract(txn, &block.hashables.representative, amount)?;
        // Zero head deletes the account entry entirely.
        self.change_latest(
            txn,
            account,
            &BlockHash::ZERO,
            &BlockHash::ZERO,
            Amount::ZERO,
            0,
            false,
        )?;
        self.store.block_del(txn, &hash)?;
        self.store.pending_put(
            txn,
            &PendingKey::new(*account, block.hashables.source),
            &PendingInfo::new(source_account, amount),
        )?;
        self.store.frontier_del(txn, &hash)?;
        self.checksum_update(txn, &hash)
    }

    fn rollback_change(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        info: &AccountInfo,
        block: &ChangeBlock,
    ) -> Result<(), StoreError> {
        let hash = block.hash();
        let restored_rep = self.representative(txn, &block.hashables.previous)?;
        let restored_rep_account = self.rep_block_account(txn, &restored_rep)?;
        self.store.representation_subtract(
            txn,
            &block.hashables.representative,
            info.balance,
        )?;
        self.store
            .representation_add(txn, &restored_rep_account, info.balance)?;
        self.store.block_del(txn, &hash)?;
        self.change_latest(
            txn,
            account,
            &block.hashables.previous,
            &restored_rep,
            info.balance,
            info.block_count - 1,
            false,
        )?;
        self.store.frontier_del(txn, &hash)?;
        self.store
            .frontier_put(txn, &block.hashables.previous, account)?;
        self.store
            .block_successor_clear(txn, &block.hashables.previous)?;
        if info.block_count % BLOCK_INFO_MAX == 0 {
            self.store.block_info_del(txn, &hash)?;
        }
        self.checksum_update(txn, &hash)
    }

    fn rollback_state(
        &self,
        txn: &mut RwTxn,
        info: &AccountInfo,
        block: &StateBlock,
    ) -> Result<(), StoreError> {
        let hash = block.hash();
        let previous_balance = self.balance(txn, &block.hashables.previous)?;
        let is_send = block.hashables.balance < previous_balance;
        let restored_rep = if block.hashables.previous.is_zero() {
            BlockHash::ZERO
        } else {
            self.representative(txn, &block.hashables.previous)?
        };

        self.store.representation_subtract(
            txn,
            &block.hashables.representative,
            block.hashables.balance,
        )?;
        if !restored_rep.is_zero() {
            let restored_rep_account = self.rep_block_account(txn, &restored_rep)?;
            self.store
                .representation_add(txn, &restored_rep_account, previous_balance)?;
        }

        if is_send {
            let key = PendingKey::new(block.hashables.link.as_account(), hash);
            self.store.pending_del(txn, &key)?;
        } else if !block.hashables.link.is_zero() {
            let source = block.hashables.link.as_block_hash();
            let source_account = self.account(txn, &source)?;
            let amount = block.hashables.balance - previous_balance;
            self.store.pending_put(
                txn,
                &PendingKey::new(block.hashables.account, source),
                &PendingInfo::new(source_account, amount),
            )?;
        }

        self.change_latest(
            txn,
            &block.hashables.account,
            &block.hashables.previous,
            &restored_rep,
            previous_balance,
            info.block_count - 1,
            false,
        )?;
        if let Some(previous) = self.store.block_get(txn, &block.hashables.previous)? {
            self.store
                .block_successor_clear(txn, &block.hashables.previous)?;
            // A legacy predecessor becomes a head again and regains its
            // frontier entry; a state predecessor keeps none.
            if !matches!(previous, Block::State(_)) {
                self.store.frontier_put(
                    txn,
                    &block.hashables.previous,
                    &block.hashables.account,
                )?;
            }
        }
        self.store.block_del(txn, &hash)?;
        self.checksum_update(txn, &hash)
    }
}
