//! Chain visitors — derive balance, amount delta and representative from a
//! block hash by walking history.
//!
//! Legacy blocks do not carry a balance in-band, so derivation walks the
//! chain backward until it reaches a block whose balance is known directly:
//! a send (carries balance), a state block (carries balance), or a
//! blocks-info snapshot (written every 32nd block). Read-only; runs under
//! any read transaction.

use heed::RoTxn;

use lattice_blocks::Block;
use lattice_store::StoreError;
use lattice_types::{Amount, BlockHash, GENESIS_AMOUNT};

use crate::Store;

/// Balance of the account chain as of `hash`.
pub fn balance(store: &Store, txn: &RoTxn, hash: &BlockHash) -> Result<Amount, StoreError> {
    let mut result = Amount::ZERO;
    let mut current = *hash;
    while !current.is_zero() {
        let block = store
            .block_get(txn, &current)?
            .expect("chain walk hit a missing block");
        match block {
            Block::Send(b) => {
                result = result
                    .checked_add(b.hashables.balance)
                    .expect("balance overflow");
                current = BlockHash::ZERO;
            }
            Block::State(b) => {
                // A state block is always the walk's starting point: legacy
                // blocks cannot chain onto a state head.
                result = b.hashables.balance;
                current = BlockHash::ZERO;
            }
            Block::Receive(b) => match store.block_info_get(txn, &current)? {
                Some(info) => {
                    result = result.checked_add(info.balance).expect("balance overflow");
                    current = BlockHash::ZERO;
                }
                None => {
                    let received = amount(store, txn, &b.hashables.source)?;
                    result = result.checked_add(received).expect("balance overflow");
                    current = b.hashables.previous;
                }
            },
            Block::Open(b) => {
                let received = amount(store, txn, &b.hashables.source)?;
                result = result.checked_add(received).expect("balance overflow");
                current = BlockHash::ZERO;
            }
            Block::Change(b) => match store.block_info_get(txn, &current)? {
                Some(info) => {
                    result = result.checked_add(info.balance).expect("balance overflow");
                    current = BlockHash::ZERO;
                }
                None => current = b.hashables.previous,
            },
        }
    }
    Ok(result)
}

/// Balance delta contributed by `hash` alone.
///
/// A hash with no stored block resolves to the genesis amount: the only such
/// reference on a consistent store is the genesis open block's source, which
/// is the genesis public key rather than a real block.
pub fn amount(store: &Store, txn: &RoTxn, hash: &BlockHash) -> Result<Amount, StoreError> {
    let Some(block) = store.block_get(txn, hash)? else {
        return Ok(GENESIS_AMOUNT);
    };
    match block {
        Block::Send(b) => {
            let previous = balance(store, txn, &b.hashables.previous)?;
            Ok(previous
                .checked_sub(b.hashables.balance)
                .expect("send above previous balance"))
        }
        Block::Receive(b) => amount(store, txn, &b.hashables.source),
        Block::Open(b) => amount(store, txn, &b.hashables.source),
        Block::Change(_) => Ok(Amount::ZERO),
        Block::State(b) => {
            let previous = balance(store, txn, &b.hashables.previous)?;
            if b.hashables.balance < previous {
                Ok(previous - b.hashables.balance)
            } else {
                Ok(b.hashables.balance - previous)
            }
        }
    }
}

/// Hash of the block that designated the representative in force at `hash`
/// (an open, change or state block).
pub fn representative(store: &Store, txn: &RoTxn, hash: &BlockHash) -> Result<BlockHash, StoreError> {
    let mut current = *hash;
    loop {
        let block = store
            .block_get(txn, &current)?
            .expect("chain walk hit a missing block");
        match block {
            Block::Open(_) | Block::Change(_) | Block::State(_) => return Ok(current),
            Block::Send(b) => current = b.hashables.previous,
            Block::Receive(b) => current = b.hashables.previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::open_store;
    use lattice_blocks::{OpenBlock, SendBlock};
    use lattice_crypto::KeyPair;
    use lattice_types::RawKey;

    #[test]
    fn walks_resolve_balance_amount_and_representative() {
        let (_dir, store) = open_store();
        let mut txn = store.write_txn().unwrap();
        let keys = KeyPair::from_private(RawKey([1u8; 32]));

        // A genesis-style open: its source is the account key itself, which
        // has no stored block, so the received amount is the whole supply.
        let open = Block::Open(OpenBlock::new(
            BlockHash::from(keys.public),
            keys.public,
            keys.public,
            &keys.private,
            0,
        ));
        let open_hash = open.hash();
        store.block_put(&mut txn, &open_hash, &open).unwrap();

        assert_eq!(balance(&store, &txn, &open_hash).unwrap(), GENESIS_AMOUNT);
        assert_eq!(amount(&store, &txn, &open_hash).unwrap(), GENESIS_AMOUNT);
        assert_eq!(
            representative(&store, &txn, &open_hash).unwrap(),
            open_hash
        );

        let send = Block::Send(SendBlock::new(
            open_hash,
            KeyPair::from_private(RawKey([2u8; 32])).public,
            GENESIS_AMOUNT - Amount::new(5),
            &keys.private,
            0,
        ));
        let send_hash = send.hash();
        store.block_put(&mut txn, &send_hash, &send).unwrap();

        assert_eq!(
            balance(&store, &txn, &send_hash).unwrap(),
            GENESIS_AMOUNT - Amount::new(5)
        );
        assert_eq!(amount(&store, &txn, &send_hash).unwrap(), Amount::new(5));
        assert_eq!(
            representative(&store, &txn, &send_hash).unwrap(),
            open_hash
        );
    }

    #[test]
    fn balance_of_zero_hash_is_zero() {
        let (_dir, store) = open_store();
        let txn = store.read_txn().unwrap();
        assert_eq!(
            balance(&store, &txn, &BlockHash::ZERO).unwrap(),
            Amount::ZERO
        );
    }
}
