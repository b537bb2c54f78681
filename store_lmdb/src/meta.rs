//! Meta table — schema version bookkeeping.

use heed::{RoTxn, RwTxn};

use lattice_store::StoreError;

use crate::{LmdbError, Store};

const VERSION_KEY: &[u8] = b"version";

impl Store {
    /// Stored schema version. A database without a version entry is treated
    /// as v1 (the first released layout).
    pub fn version_get(&self, txn: &RoTxn) -> Result<u32, StoreError> {
        let value = self.meta.get(txn, VERSION_KEY).map_err(LmdbError::from)?;
        match value {
            Some(bytes) if bytes.len() == 4 => {
                Ok(u32::from_le_bytes(bytes.try_into().expect("checked length")))
            }
            Some(_) => Err(StoreError::Corruption(
                "version record has unexpected length".to_string(),
            )),
            None => Ok(1),
        }
    }

    pub fn version_put(&self, txn: &mut RwTxn, version: u32) -> Result<(), StoreError> {
        self.meta
            .put(txn, VERSION_KEY, &version.to_le_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }
}
