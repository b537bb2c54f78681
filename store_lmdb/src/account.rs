//! Account summary table.

use heed::{RoTxn, RwTxn};

use lattice_store::{AccountInfo, StoreError};
use lattice_types::Account;

use crate::{LmdbError, Store};

impl Store {
    pub fn account_put(
        &self,
        txn: &mut RwTxn,
        account: &Account,
        info: &AccountInfo,
    ) -> Result<(), StoreError> {
        self.accounts
            .put(txn, account.as_bytes(), &info.to_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn account_get(
        &self,
        txn: &RoTxn,
        account: &Account,
    ) -> Result<Option<AccountInfo>, StoreError> {
        let value = self
            .accounts
            .get(txn, account.as_bytes())
            .map_err(LmdbError::from)?;
        value.map(AccountInfo::from_bytes).transpose()
    }

    pub fn account_del(&self, txn: &mut RwTxn, account: &Account) -> Result<(), StoreError> {
        self.accounts
            .delete(txn, account.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn account_exists(&self, txn: &RoTxn, account: &Account) -> Result<bool, StoreError> {
        Ok(self.account_get(txn, account)?.is_some())
    }

    pub fn account_count(&self, txn: &RoTxn) -> Result<u64, StoreError> {
        Ok(self.accounts.len(txn).map_err(LmdbError::from)?)
    }

    /// All account entries in key order. Copied out so callers can mutate
    /// the table while working through them (migrations do).
    pub fn account_entries(&self, txn: &RoTxn) -> Result<Vec<(Account, AccountInfo)>, StoreError> {
        let mut entries = Vec::new();
        for result in self.accounts.iter(txn).map_err(LmdbError::from)? {
            let (key, value) = result.map_err(LmdbError::from)?;
            let account = Account::from_bytes(key.try_into().map_err(|_| {
                StoreError::Corruption("account key has unexpected length".to_string())
            })?);
            entries.push((account, AccountInfo::from_bytes(value)?));
        }
        Ok(entries)
    }
}
