//! Fork elections and vote classification.
//!
//! An election collects one current block choice per representative for a
//! contested root. The ledger tallies those choices into weight totals; this
//! crate tracks the choices themselves and classifies incoming votes for
//! replay protection.

pub mod election;
pub mod voting;

pub use election::{TallyResult, Votes};
pub use voting::{validate_vote, VoteCode, VoteResult};
