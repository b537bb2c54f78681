//! Ledger core.
//!
//! The transactional state machine of the block lattice: validates and
//! applies signed blocks against the store, undoes them exactly on rollback,
//! derives balances and representatives over historical chains, and tallies
//! representative votes to pick fork winners.

pub mod constants;
pub mod genesis;
pub mod ledger;
pub mod processor;
pub mod rollback;

pub use constants::LedgerConstants;
pub use genesis::Genesis;
pub use ledger::Ledger;
pub use processor::{ProcessResult, ProcessReturn};
