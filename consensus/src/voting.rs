//! Vote classification and replay protection.

use std::sync::Arc;

use heed::RoTxn;

use lattice_blocks::Vote;
use lattice_store::StoreError;
use lattice_store_lmdb::Store;

/// How an incoming vote relates to what is already known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteCode {
    /// The signature does not verify under the voting account.
    Invalid,
    /// Sequence is not above the stored vote; a replay.
    Replay,
    /// Highest sequence seen from this representative.
    Vote,
}

/// Classification outcome, carrying the vote that now stands for the
/// representative (the incoming one, or the stored one it failed to beat).
#[derive(Clone, Debug)]
pub struct VoteResult {
    pub code: VoteCode,
    pub vote: Arc<Vote>,
}

/// Classify an incoming vote against the store's per-representative record.
///
/// A valid, fresher vote displaces the stored one (via the vote cache, which
/// the next flush persists); anything else leaves the record untouched.
pub fn validate_vote(
    store: &Store,
    txn: &RoTxn,
    vote: Arc<Vote>,
) -> Result<VoteResult, StoreError> {
    if !vote.validate() {
        return Ok(VoteResult {
            code: VoteCode::Invalid,
            vote,
        });
    }
    let stored = store.vote_current(txn, &vote.account)?;
    let code = match &stored {
        Some(stored) if stored.sequence >= vote.sequence => VoteCode::Replay,
        _ => VoteCode::Vote,
    };
    let standing = store.vote_max(txn, vote)?;
    Ok(VoteResult {
        code,
        vote: standing,
    })
}
