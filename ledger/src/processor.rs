//! Block acceptance — validate, classify, and apply index updates.
//!
//! Each variant runs its checks in a fixed order and applies all of its
//! index updates only on the progress path. Everything happens inside the
//! caller's write transaction; a rejected block changes nothing, and the
//! caller only commits on progress.

use heed::RwTxn;

use lattice_blocks::{Block, ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, StateBlock};
use lattice_crypto::validate_message;
use lattice_store::{PendingInfo, PendingKey, StoreError};
use lattice_types::{Account, Amount};

use crate::ledger::Ledger;

/// Classification of a processed block. Exhaustive; none of these are fatal
/// to the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessResult {
    /// Accepted and applied.
    Progress,
    /// Signature does not verify over the block hash.
    BadSignature,
    /// Block hash already present.
    Old,
    /// Send with a balance above its predecessor's.
    NegativeSpend,
    /// A different block already occupies this root position.
    Fork,
    /// The referenced pending entry does not exist.
    Unreceivable,
    /// Nonzero previous that is missing from the store.
    GapPrevious,
    /// Referenced source block missing from the store.
    GapSource,
    /// State blocks are rejected until the parse canary block is present.
    StateBlockDisabled,
    /// A receive references a source that is not a send.
    NotReceiveFromSend,
    /// An open's account does not match the send's destination.
    AccountMismatch,
    /// Open (or state open) of the all-zero burn account.
    OpenedBurnAccount,
    /// State balance delta disagrees with the consumed pending amount, or a
    /// pure representative change moves value.
    BalanceMismatch,
    /// This block type cannot follow its previous block.
    BlockPosition,
}

/// Result of processing one block.
#[derive(Clone, Debug)]
pub struct ProcessReturn {
    pub code: ProcessResult,
    /// Account the block belongs to (progress only).
    pub account: Account,
    /// Absolute balance delta moved by the block (progress only).
    pub amount: Amount,
    /// Destination of a newly created pending entry, when one was created.
    pub pending_account: Account,
    /// Direction of a state block; `None` for legacy blocks.
    pub state_is_send: Option<bool>,
}

impl ProcessReturn {
    fn rejected(code: ProcessResult) -> Self {
        Self {
            code,
            account: Account::ZERO,
            amount: Amount::ZERO,
            pending_account: Account::ZERO,
            state_is_send: None,
        }
    }
}

impl Ledger {
    /// Classify `block` and, on progress, apply it to every index.
    pub fn process(&self, txn: &mut RwTxn, block: &Block) -> Result<ProcessReturn, StoreError> {
        match block {
            Block::Send(b) => self.process_send(txn, block, b),
            Block::Receive(b) => self.process_receive(txn, block, b),
            Block::Open(b) => self.process_open(txn, block, b),
            Block::Change(b) => self.process_change(txn, block, b),
            Block::State(b) => {
                if !self.state_block_parsing_enabled(txn)? {
                    return Ok(ProcessReturn::rejected(ProcessResult::StateBlockDisabled));
                }
                self.process_state(txn, block, b)
            }
        }
    }

    fn process_send(
        &self,
        txn: &mut RwTxn,
        block: &Block,
        send: &SendBlock,
    ) -> Result<ProcessReturn, StoreError> {
        let hash = block.hash();
        if self.store.block_exists(txn, &hash)? {
            return Ok(ProcessReturn::rejected(ProcessResult::Old));
        }
        let Some(previous) = self.store.block_get(txn, &send.hashables.previous)? else {
            return Ok(ProcessReturn::rejected(ProcessResult::GapPrevious));
        };
        if !block.valid_predecessor(&previous) {
            return Ok(ProcessReturn::rejected(ProcessResult::BlockPosition));
        }
        // No frontier entry: the previous block exists but is not a legacy
        // head, so this is a signed fork.
        let Some(account) = self.store.frontier_get(txn, &send.hashables.previous)? else {
            return Ok(ProcessReturn::rejected(ProcessResult::Fork));
        };
        if !validate_message(&account, hash.as_bytes(), &send.signature) {
            return Ok(ProcessReturn::rejected(ProcessResult::BadSignature));
        }
        let info = self
            .store
            .account_get(txn, &account)?
            .expect("frontier account must exist");
        debug_assert_eq!(info.head, send.hashables.previous);
        let Some(amount) = info.balance.checked_sub(send.hashables.balance) else {
            return Ok(ProcessReturn::rejected(ProcessResult::NegativeSpend));
        };

        let rep_account = self.rep_block_account(txn, &info.rep_block)?;
        self.store.representation_subtract(txn, &rep_account, amount)?;
        self.store.block_put(txn, &hash, block)?;
        self.change_latest(
            txn,
            &account,
            &hash,
            &info.rep_block,
            send.hashables.balance,
            info.block_count + 1,
            false,
        )?;
        self.store.pending_put(
            txn,
            &PendingKey::new(send.hashables.destination, hash),
            &PendingInfo::new(account, amount),
        )?;
        self.store.frontier_del(txn, &send.hashables.previous)?;
        self.store.frontier_put(txn, &hash, &account)?;
        self.checksum_update(txn, &hash)?;
        Ok(ProcessReturn {
            code: ProcessResult::Progress,
            account,
            amount,
            pending_account: send.hashables.destination,
            state_is_send: None,
        })
    }

    fn process_receive(
        &self,
        txn: &mut RwTxn,
        block: &Block,
        receive: &ReceiveBlock,
    ) -> Result<ProcessReturn, StoreError> {
        let hash = block.hash();
        if self.store.block_exists(txn, &hash)? {
            return Ok(ProcessReturn::rejected(ProcessResult::Old));
        }
        let Some(previous) = self.store.block_get(txn, &receive.hashables.previous)? else {
            return Ok(ProcessReturn::rejected(ProcessResult::GapPrevious));
        };
        if !block.valid_predecessor(&previous) {
            return Ok(ProcessReturn::rejected(ProcessResult::BlockPosition));
        }
        let Some(source) = self.store.block_get(txn, &receive.hashables.source)? else {
            return Ok(ProcessReturn::rejected(ProcessResult::GapSource));
        };
        if matches!(source, Block::Receive(_) | Block::Open(_) | Block::Change(_)) {
            return Ok(ProcessReturn::rejected(ProcessResult::NotReceiveFromSend));
        }
        let Some(account) = self.store.frontier_get(txn, &receive.hashables.previous)? else {
            // The previous block exists but is not the head: a signed fork.
            return Ok(ProcessReturn::rejected(ProcessResult::Fork));
        };
        if !validate_message(&account, hash.as_bytes(), &receive.signature) {
            return Ok(ProcessReturn::rejected(ProcessResult::BadSignature));
        }
        let info = self
            .store
            .account_get(txn, &account)?
            .expect("frontier account must exist");
        debug_assert_eq!(info.head, receive.hashables.previous);
        let key = PendingKey::new(account, receive.hashables.source);
        let Some(pending) = self.store.pending_get(txn, &key)? else {
            return Ok(ProcessReturn::rejected(ProcessResult::Unreceivable));
        };
        let new_balance = info
            .balance
            .checked_add(pending.amount)
            .expect("balance overflow");

        self.store.pending_del(txn, &key)?;
        self.store.block_put(txn, &hash, block)?;
        self.change_latest(
            txn,
            &account,
            &hash,
            &info.rep_block,
            new_balance,
            info.block_count + 1,
            false,
        )?;
        let rep_account = self.rep_block_account(txn, &info.rep_block)?;
        self.store
            .representation_add(txn, &rep_account, pending.amount)?;
        self.store.frontier_del(txn, &receive.hashables.previous)?;
        self.store.frontier_put(txn, &hash, &account)?;
        self.checksum_update(txn, &hash)?;
        Ok(ProcessReturn {
            code: ProcessResult::Progress,
            account,
            amount: pending.amount,
            pending_account: Account::ZERO,
            state_is_send: None,
        })
    }

    fn process_open(
        &self,
        txn: &mut RwTxn,
        block: &Block,
        open: &OpenBlock,
    ) -> Result<ProcessReturn, StoreError> {
        let hash = block.hash();
        if self.store.block_exists(txn, &hash)? {
            return Ok(ProcessReturn::rejected(ProcessResult::Old));
        }
        let Some(source) = self.store.block_get(txn, &open.hashables.source)? else {
            return Ok(ProcessReturn::rejected(ProcessResult::GapSource));
        };
        if !validate_message(&open.hashables.account, hash.as_bytes(), &open.signature) {
            return Ok(ProcessReturn::rejected(ProcessResult::BadSignature));
        }
        if self.store.account_exists(txn, &open.hashables.account)? {
            return Ok(ProcessReturn::rejected(ProcessResult::Fork));
        }
        match &source {
            Block::Send(send) => {
                if send.hashables.destination != open.hashables.account {
                    return Ok(ProcessReturn::rejected(ProcessResult::AccountMismatch));
                }
            }
            // A state send's destination is enforced by the pending key.
            Block::State(_) => {}
            _ => return Ok(ProcessReturn::rejected(ProcessResult::NotReceiveFromSend)),
        }
        let key = PendingKey::new(open.hashables.account, open.hashables.source);
        let Some(pending) = self.store.pending_get(txn, &key)? else {
            return Ok(ProcessReturn::rejected(ProcessResult::Unreceivable));
        };
        if open.hashables.account == self.constants.burn_account {
            return Ok(ProcessReturn::rejected(ProcessResult::OpenedBurnAccount));
        }

        self.store.pending_del(txn, &key)?;
        self.store.block_put(txn, &hash, block)?;
        self.change_latest(
            txn,
            &open.hashables.account,
            &hash,
            &hash,
            pending.amount,
            1,
            false,
        )?;
        self.store
            .representation_add(txn, &open.hashables.representative, pending.amount)?;
        self.store
            .frontier_put(txn, &hash, &open.hashables.account)?;
        self.checksum_update(txn, &hash)?;
        Ok(ProcessReturn {
            code: ProcessResult::Progress,
            account: open.hashables.account,
            amount: pending.amount,
            pending_account: Account::ZERO,
            state_is_send: None,
        })
    }

    fn process_change(
        &self,
        txn: &mut RwTxn,
        block: &Block,
        change: &ChangeBlock,
    ) -> Result<ProcessReturn, StoreError> {
        let hash = block.hash();
        if self.store.block_exists(txn, &hash)? {
            return Ok(ProcessReturn::rejected(ProcessResult::Old));
        }
        let Some(previous) = self.store.block_get(txn, &change.hashables.previous)? else {
            return Ok(ProcessReturn::rejected(ProcessResult::GapPrevious));
        };
        if !block.valid_predecessor(&previous) {
            return Ok(ProcessReturn::rejected(ProcessResult::BlockPosition));
        }
        let Some(account) = self.store.frontier_get(txn, &change.hashables.previous)? else {
            return Ok(ProcessReturn::rejected(ProcessResult::Fork));
        };
        if !validate_message(&account, hash.as_bytes(), &change.signature) {
            return Ok(ProcessReturn::rejected(ProcessResult::BadSignature));
        }
        let info = self
            .store
            .account_get(txn, &account)?
            .expect("frontier account must exist");
        debug_assert_eq!(info.head, change.hashables.previous);

        self.store.block_put(txn, &hash, block)?;
        let old_rep = self.rep_block_account(txn, &info.rep_block)?;
        self.store
            .representation_subtract(txn, &old_rep, info.balance)?;
        self.store
            .representation_add(txn, &change.hashables.representative, info.balance)?;
        self.change_latest(
            txn,
            &account,
            &hash,
            &hash,
            info.balance,
            info.block_count + 1,
            false,
        )?;
        self.store.frontier_del(txn, &change.hashables.previous)?;
        self.store.frontier_put(txn, &hash, &account)?;
        self.checksum_update(txn, &hash)?;
        Ok(ProcessReturn {
            code: ProcessResult::Progress,
            account,
            amount: Amount::ZERO,
            pending_account: Account::ZERO,
            state_is_send: None,
        })
    }

    fn process_state(
        &self,
        txn: &mut RwTxn,
        block: &Block,
        state: &StateBlock,
    ) -> Result<ProcessReturn, StoreError> {
        let hash = block.hash();
        if self.store.block_exists(txn, &hash)? {
            return Ok(ProcessReturn::rejected(ProcessResult::Old));
        }
        if !validate_message(&state.hashables.account, hash.as_bytes(), &state.signature) {
            return Ok(ProcessReturn::rejected(ProcessResult::BadSignature));
        }
        if state.hashables.account == self.constants.burn_account {
            return Ok(ProcessReturn::rejected(ProcessResult::OpenedBurnAccount));
        }

        let existing = self.store.account_get(txn, &state.hashables.account)?;
        let mut is_send = false;
        let delta;
        match &existing {
            Some(info) => {
                // Reopening an opened account contests its root.
                if state.hashables.previous.is_zero() {
                    return Ok(ProcessReturn::rejected(ProcessResult::Fork));
                }
                if !self.store.block_exists(txn, &state.hashables.previous)? {
                    return Ok(ProcessReturn::rejected(ProcessResult::GapPrevious));
                }
                if state.hashables.previous != info.head {
                    return Ok(ProcessReturn::rejected(ProcessResult::Fork));
                }
                is_send = state.hashables.balance < info.balance;
                delta = if is_send {
                    info.balance - state.hashables.balance
                } else {
                    state.hashables.balance - info.balance
                };
            }
            None => {
                if !state.hashables.previous.is_zero() {
                    return Ok(ProcessReturn::rejected(ProcessResult::GapPrevious));
                }
                // A chain-initial state block must receive from somewhere.
                if state.hashables.link.is_zero() {
                    return Ok(ProcessReturn::rejected(ProcessResult::GapSource));
                }
                delta = state.hashables.balance;
            }
        }
        if !is_send {
            if !state.hashables.link.is_zero() {
                let source = state.hashables.link.as_block_hash();
                if !self.store.block_exists(txn, &source)? {
                    return Ok(ProcessReturn::rejected(ProcessResult::GapSource));
                }
                let key = PendingKey::new(state.hashables.account, source);
                let Some(pending) = self.store.pending_get(txn, &key)? else {
                    return Ok(ProcessReturn::rejected(ProcessResult::Unreceivable));
                };
                if pending.amount != delta {
                    return Ok(ProcessReturn::rejected(ProcessResult::BalanceMismatch));
                }
            } else if !delta.is_zero() {
                // With no link, only the representative may change.
                return Ok(ProcessReturn::rejected(ProcessResult::BalanceMismatch));
            }
        }

        self.store.block_put(txn, &hash, block)?;
        if let Some(info) = &existing {
            if !info.rep_block.is_zero() {
                let old_rep = self.rep_block_account(txn, &info.rep_block)?;
                self.store
                    .representation_subtract(txn, &old_rep, info.balance)?;
            }
        }
        self.store.representation_add(
            txn,
            &state.hashables.representative,
            state.hashables.balance,
        )?;
        if is_send {
            self.store.pending_put(
                txn,
                &PendingKey::new(state.hashables.link.as_account(), hash),
                &PendingInfo::new(state.hashables.account, delta),
            )?;
        } else if !state.hashables.link.is_zero() {
            self.store.pending_del(
                txn,
                &PendingKey::new(
                    state.hashables.account,
                    state.hashables.link.as_block_hash(),
                ),
            )?;
        }
        let block_count = existing.as_ref().map(|info| info.block_count).unwrap_or(0) + 1;
        self.change_latest(
            txn,
            &state.hashables.account,
            &hash,
            &hash,
            state.hashables.balance,
            block_count,
            true,
        )?;
        // Drop the old head's frontier entry: state heads have none, which
        // is what stops legacy blocks from chaining onto them.
        if let Some(info) = &existing {
            if self.store.frontier_get(txn, &info.head)?.is_some() {
                self.store.frontier_del(txn, &info.head)?;
            }
        }
        self.checksum_update(txn, &hash)?;
        Ok(ProcessReturn {
            code: ProcessResult::Progress,
            account: state.hashables.account,
            amount: delta,
            pending_account: if is_send {
                state.hashables.link.as_account()
            } else {
                Account::ZERO
            },
            state_is_send: Some(is_send),
        })
    }
}
