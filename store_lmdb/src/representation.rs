//! Representation table — running voting weight per representative.

use heed::{RoTxn, RwTxn};

use lattice_store::StoreError;
use lattice_types::{Account, Amount};

use crate::{LmdbError, Store};

impl Store {
    /// Weight delegated to a representative; zero when never delegated to.
    pub fn representation_get(&self, txn: &RoTxn, account: &Account) -> Result<Amount, StoreError> {
        let value = self
            .representation
            .get(txn, account.as_bytes())
            .map_err(LmdbError::from)?;
        match value {
            Some(bytes) if bytes.len() == 16 => Ok(Amount::from_le_bytes(
                bytes.try_into().expect("checked length"),
            )),
            Some(_) => Err(StoreError::Corruption(
                "representation record has unexpected length".to_string(),
            )),
            None => Ok(Amount::ZERO),
        }
    }

    pub fn representation_put(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        weight: Amount,
    ) -> Result<(), StoreError> {
        self.representation
            .put(txn, account.as_bytes(), &weight.to_le_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    /// Credit weight to a representative. Overflow cannot occur while the
    /// weight invariant holds (total weight never exceeds the supply).
    pub fn representation_add(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        amount: Amount,
    ) -> Result<(), StoreError> {
        let weight = self
            .representation_get(txn, account)?
            .checked_add(amount)
            .expect("representation weight overflow");
        self.representation_put(txn, account, weight)
    }

    /// Debit weight from a representative. Underflow cannot occur while the
    /// weight invariant holds.
    pub fn representation_subtract(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        amount: Amount,
    ) -> Result<(), StoreError> {
        let weight = self
            .representation_get(txn, account)?
            .checked_sub(amount)
            .expect("representation weight underflow");
        self.representation_put(txn, account, weight)
    }

    /// Clear the table (the upgrade ladder rebuilds it from scratch).
    pub fn representation_clear(&self, txn: &mut RwTxn) -> Result<(), StoreError> {
        self.representation.clear(txn).map_err(LmdbError::from)?;
        Ok(())
    }

    /// All representatives with recorded weight, in key order.
    pub fn representation_entries(&self, txn: &RoTxn) -> Result<Vec<(Account, Amount)>, StoreError> {
        let mut entries = Vec::new();
        for result in self.representation.iter(txn).map_err(LmdbError::from)? {
            let (key, value) = result.map_err(LmdbError::from)?;
            let account = Account::from_bytes(key.try_into().map_err(|_| {
                StoreError::Corruption("representation key has unexpected length".to_string())
            })?);
            let weight = Amount::from_le_bytes(value.try_into().map_err(|_| {
                StoreError::Corruption("representation record has unexpected length".to_string())
            })?);
            entries.push((account, weight));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::open_store;

    #[test]
    fn missing_weight_is_zero() {
        let (_dir, store) = open_store();
        let txn = store.read_txn().unwrap();
        let account = Account::from_bytes([1; 32]);
        assert_eq!(
            store.representation_get(&txn, &account).unwrap(),
            Amount::ZERO
        );
    }

    #[test]
    fn add_and_subtract() {
        let (_dir, store) = open_store();
        let mut txn = store.write_txn().unwrap();
        let account = Account::from_bytes([1; 32]);

        store
            .representation_add(&mut txn, &account, Amount::new(100))
            .unwrap();
        store
            .representation_add(&mut txn, &account, Amount::new(50))
            .unwrap();
        assert_eq!(
            store.representation_get(&txn, &account).unwrap(),
            Amount::new(150)
        );

        store
            .representation_subtract(&mut txn, &account, Amount::new(150))
            .unwrap();
        assert_eq!(
            store.representation_get(&txn, &account).unwrap(),
            Amount::ZERO
        );
    }

    #[test]
    fn clear_empties_table() {
        let (_dir, store) = open_store();
        let mut txn = store.write_txn().unwrap();
        let account = Account::from_bytes([1; 32]);
        store
            .representation_put(&mut txn, &account, Amount::new(5))
            .unwrap();
        store.representation_clear(&mut txn).unwrap();
        assert!(store.representation_entries(&txn).unwrap().is_empty());
    }
}
