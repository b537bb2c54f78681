//! Checksum table — XOR-rolling digests of the stored block set.
//!
//! Keyed by `(region, depth)`; the ledger maintains slot `(0, 0)` as the XOR
//! of every stored block hash.

use heed::{RoTxn, RwTxn};

use lattice_store::StoreError;
use lattice_types::Checksum;

use crate::{LmdbError, Store};

fn checksum_key(region: u64, depth: u8) -> [u8; 9] {
    let mut key = [0u8; 9];
    key[..8].copy_from_slice(&region.to_le_bytes());
    key[8] = depth;
    key
}

impl Store {
    pub fn checksum_put(
        &self,
        txn: &mut RwTxn,
        region: u64,
        depth: u8,
        checksum: &Checksum,
    ) -> Result<(), StoreError> {
        self.checksum
            .put(txn, &checksum_key(region, depth), checksum.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn checksum_get(
        &self,
        txn: &RoTxn,
        region: u64,
        depth: u8,
    ) -> Result<Option<Checksum>, StoreError> {
        let value = self
            .checksum
            .get(txn, &checksum_key(region, depth))
            .map_err(LmdbError::from)?;
        match value {
            Some(bytes) if bytes.len() == 32 => Ok(Some(Checksum::from_bytes(
                bytes.try_into().expect("checked length"),
            ))),
            Some(_) => Err(StoreError::Corruption(
                "checksum record has unexpected length".to_string(),
            )),
            None => Ok(None),
        }
    }

    pub fn checksum_del(&self, txn: &mut RwTxn, region: u64, depth: u8) -> Result<(), StoreError> {
        self.checksum
            .delete(txn, &checksum_key(region, depth))
            .map_err(LmdbError::from)?;
        Ok(())
    }
}
