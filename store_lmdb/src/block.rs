//! Block body storage, sharded by type, with embedded successor pointers.
//!
//! Each record is `body || successor(32)`. The trailing slot is a forward
//! pointer to the next block in the chain, zero at the head. `block_put`
//! stamps the predecessor's slot; rollback clears it. This gives O(1)
//! successor lookup without a secondary index.

use heed::types::Bytes;
use heed::{Database, RoTxn, RwTxn};

use lattice_blocks::{Block, BlockType};
use lattice_store::{BlockCounts, StoreError};
use lattice_types::BlockHash;

use crate::{LmdbError, Store};

const BLOCK_TABLES: [BlockType; 5] = [
    BlockType::Send,
    BlockType::Receive,
    BlockType::Open,
    BlockType::Change,
    BlockType::State,
];

impl Store {
    fn block_table(&self, block_type: BlockType) -> Database<Bytes, Bytes> {
        match block_type {
            BlockType::Send => self.send_blocks,
            BlockType::Receive => self.receive_blocks,
            BlockType::Open => self.open_blocks,
            BlockType::Change => self.change_blocks,
            BlockType::State => self.state_blocks,
            BlockType::Invalid | BlockType::NotABlock => {
                unreachable!("no table for non-block type")
            }
        }
    }

    /// Store a block body with a zero successor slot, and stamp the
    /// predecessor's slot with this block's hash.
    pub fn block_put(
        &self,
        txn: &mut RwTxn,
        hash: &BlockHash,
        block: &Block,
    ) -> Result<(), StoreError> {
        let size = Block::serialized_size(block.block_type()).expect("storable block type");
        let mut value = Vec::with_capacity(size + 32);
        block.serialize(&mut value);
        value.extend_from_slice(BlockHash::ZERO.as_bytes());
        self.block_table(block.block_type())
            .put(txn, hash.as_bytes(), &value)
            .map_err(LmdbError::from)?;
        let previous = block.previous();
        if !previous.is_zero() {
            self.block_successor_set(txn, &previous, hash)?;
        }
        Ok(())
    }

    /// Raw record for a hash, probing the per-type tables.
    fn block_get_raw(
        &self,
        txn: &RoTxn,
        hash: &BlockHash,
    ) -> Result<Option<(BlockType, Vec<u8>)>, StoreError> {
        for block_type in BLOCK_TABLES {
            if let Some(value) = self
                .block_table(block_type)
                .get(txn, hash.as_bytes())
                .map_err(LmdbError::from)?
            {
                return Ok(Some((block_type, value.to_vec())));
            }
        }
        Ok(None)
    }

    /// Retrieve and decode a block. The copy is owned, so it outlives the
    /// transaction.
    pub fn block_get(&self, txn: &RoTxn, hash: &BlockHash) -> Result<Option<Block>, StoreError> {
        match self.block_get_raw(txn, hash)? {
            Some((block_type, record)) => {
                let size = Block::serialized_size(block_type).expect("block type");
                if record.len() != size + 32 {
                    return Err(StoreError::Corruption(format!(
                        "block record has {} bytes, expected {}",
                        record.len(),
                        size + 32
                    )));
                }
                let block =
                    Block::deserialize(block_type, &record[..size]).map_err(LmdbError::from)?;
                Ok(Some(block))
            }
            None => Ok(None),
        }
    }

    /// The forward pointer stored after the block body, or `None` at a head.
    pub fn block_successor(
        &self,
        txn: &RoTxn,
        hash: &BlockHash,
    ) -> Result<Option<BlockHash>, StoreError> {
        match self.block_get_raw(txn, hash)? {
            Some((_, record)) => {
                let tail: [u8; 32] = record[record.len() - 32..]
                    .try_into()
                    .expect("successor slot");
                let successor = BlockHash::from_bytes(tail);
                Ok((!successor.is_zero()).then_some(successor))
            }
            None => Ok(None),
        }
    }

    fn block_successor_write(
        &self,
        txn: &mut RwTxn,
        hash: &BlockHash,
        successor: &BlockHash,
    ) -> Result<(), StoreError> {
        let (block_type, mut record) = self
            .block_get_raw(txn, hash)?
            .expect("successor target must exist");
        let at = record.len() - 32;
        record[at..].copy_from_slice(successor.as_bytes());
        self.block_table(block_type)
            .put(txn, hash.as_bytes(), &record)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub(crate) fn block_successor_set(
        &self,
        txn: &mut RwTxn,
        hash: &BlockHash,
        successor: &BlockHash,
    ) -> Result<(), StoreError> {
        self.block_successor_write(txn, hash, successor)
    }

    /// Reset a block's successor slot to zero (its successor was rolled back).
    pub fn block_successor_clear(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        self.block_successor_write(txn, hash, &BlockHash::ZERO)
    }

    pub fn block_del(&self, txn: &mut RwTxn, hash: &BlockHash) -> Result<(), StoreError> {
        for block_type in BLOCK_TABLES {
            if self
                .block_table(block_type)
                .delete(txn, hash.as_bytes())
                .map_err(LmdbError::from)?
            {
                return Ok(());
            }
        }
        Ok(())
    }

    pub fn block_exists(&self, txn: &RoTxn, hash: &BlockHash) -> Result<bool, StoreError> {
        Ok(self.block_get_raw(txn, hash)?.is_some())
    }

    /// Per-type block counts.
    pub fn block_count(&self, txn: &RoTxn) -> Result<BlockCounts, StoreError> {
        Ok(BlockCounts {
            send: self.send_blocks.len(txn).map_err(LmdbError::from)?,
            receive: self.receive_blocks.len(txn).map_err(LmdbError::from)?,
            open: self.open_blocks.len(txn).map_err(LmdbError::from)?,
            change: self.change_blocks.len(txn).map_err(LmdbError::from)?,
            state: self.state_blocks.len(txn).map_err(LmdbError::from)?,
        })
    }

    /// A uniformly-ish random stored block (bootstrap seeding aid).
    pub fn block_random(&self, txn: &RoTxn) -> Result<Option<Block>, StoreError> {
        let mut entropy = [0u8; 33];
        getrandom::getrandom(&mut entropy).expect("OS entropy source unavailable");
        let offset = entropy[32] as usize % BLOCK_TABLES.len();
        for i in 0..BLOCK_TABLES.len() {
            let block_type = BLOCK_TABLES[(offset + i) % BLOCK_TABLES.len()];
            let table = self.block_table(block_type);
            let bounds = (
                std::ops::Bound::Included(&entropy[..32]),
                std::ops::Bound::Unbounded,
            );
            let hit = match table.range(txn, &bounds).map_err(LmdbError::from)?.next() {
                Some(entry) => Some(entry.map_err(LmdbError::from)?),
                None => table.first(txn).map_err(LmdbError::from)?,
            };
            if let Some((key, _)) = hit {
                let hash = BlockHash::from_bytes(key.try_into().expect("32-byte block key"));
                return self.block_get(txn, &hash);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::open_store;
    use lattice_blocks::SendBlock;
    use lattice_types::{Account, Amount, RawKey};

    fn make_send(previous: BlockHash) -> Block {
        let keys = lattice_crypto::KeyPair::from_private(RawKey([1u8; 32]));
        Block::Send(SendBlock::new(
            previous,
            Account::from_bytes([2; 32]),
            Amount::new(100),
            &keys.private,
            0,
        ))
    }

    #[test]
    fn put_get_roundtrip() {
        let (_dir, store) = open_store();
        let mut txn = store.write_txn().unwrap();
        let block = make_send(BlockHash::ZERO);
        let hash = block.hash();
        store.block_put(&mut txn, &hash, &block).unwrap();
        assert!(store.block_exists(&txn, &hash).unwrap());
        assert_eq!(store.block_get(&txn, &hash).unwrap(), Some(block));
        txn.commit().unwrap();
    }

    #[test]
    fn missing_block_is_none() {
        let (_dir, store) = open_store();
        let txn = store.read_txn().unwrap();
        let hash = BlockHash::from_bytes([9; 32]);
        assert!(!store.block_exists(&txn, &hash).unwrap());
        assert!(store.block_get(&txn, &hash).unwrap().is_none());
    }

    #[test]
    fn put_stamps_predecessor_successor() {
        let (_dir, store) = open_store();
        let mut txn = store.write_txn().unwrap();
        let first = make_send(BlockHash::ZERO);
        let first_hash = first.hash();
        store.block_put(&mut txn, &first_hash, &first).unwrap();
        assert_eq!(store.block_successor(&txn, &first_hash).unwrap(), None);

        let second = make_send(first_hash);
        let second_hash = second.hash();
        store.block_put(&mut txn, &second_hash, &second).unwrap();
        assert_eq!(
            store.block_successor(&txn, &first_hash).unwrap(),
            Some(second_hash)
        );

        store.block_successor_clear(&mut txn, &first_hash).unwrap();
        assert_eq!(store.block_successor(&txn, &first_hash).unwrap(), None);
    }

    #[test]
    fn delete_removes_block() {
        let (_dir, store) = open_store();
        let mut txn = store.write_txn().unwrap();
        let block = make_send(BlockHash::ZERO);
        let hash = block.hash();
        store.block_put(&mut txn, &hash, &block).unwrap();
        store.block_del(&mut txn, &hash).unwrap();
        assert!(!store.block_exists(&txn, &hash).unwrap());
    }

    #[test]
    fn counts_by_type() {
        let (_dir, store) = open_store();
        let mut txn = store.write_txn().unwrap();
        let block = make_send(BlockHash::ZERO);
        store.block_put(&mut txn, &block.hash(), &block).unwrap();
        let counts = store.block_count(&txn).unwrap();
        assert_eq!(counts.send, 1);
        assert_eq!(counts.sum(), 1);
    }

    #[test]
    fn random_returns_a_block_when_any_stored() {
        let (_dir, store) = open_store();
        let mut txn = store.write_txn().unwrap();
        assert!(store.block_random(&txn).unwrap().is_none());
        let block = make_send(BlockHash::ZERO);
        store.block_put(&mut txn, &block.hash(), &block).unwrap();
        assert_eq!(store.block_random(&txn).unwrap(), Some(block));
    }
}
