//! Fundamental types for the lattice ledger.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: accounts, block hashes, amounts, signatures, link fields,
//! network identifiers and epoch time.

pub mod account;
pub mod amount;
pub mod hash;
pub mod keys;
pub mod network;
pub mod time;

pub use account::Account;
pub use amount::{Amount, GENESIS_AMOUNT};
pub use hash::{BlockHash, Checksum, Link};
pub use keys::{RawKey, Signature};
pub use network::NetworkId;
pub use time::seconds_since_epoch;
