//! Persisted record types for the lattice ledger.
//!
//! Every value stored in a ledger table has a fixed-width canonical byte
//! layout defined here, independent of the storage backend. The backend
//! crate (`lattice-store-lmdb`) owns the tables; this crate owns what goes
//! in them.

pub mod account;
pub mod block_info;
pub mod error;
pub mod pending;
pub mod versioning;

pub use account::AccountInfo;
pub use block_info::{BlockCounts, BlockInfo};
pub use error::StoreError;
pub use pending::{PendingInfo, PendingKey};
