//! Per-root vote collection.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use lattice_blocks::{Block, Vote};
use lattice_types::{Account, BlockHash};

/// Outcome of applying one vote to an election.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TallyResult {
    /// First vote from this representative on this root.
    Vote,
    /// The representative switched its choice among competing blocks.
    Changed,
    /// The representative re-voted the same block.
    Confirm,
}

/// Sentinel under which an election's initial block is recorded. It compares
/// unequal to any real account and carries no delegated weight, so the
/// initial block participates in tallies without a phantom voter.
const INITIAL_VOTER: Account = Account::from_bytes([0xFF; 32]);

/// The votes of one election: the latest block choice per representative for
/// a single root.
#[derive(Clone, Debug)]
pub struct Votes {
    /// Root block hash of the fork being decided.
    pub id: BlockHash,
    /// Latest choice per representative.
    pub rep_votes: HashMap<Account, Arc<Block>>,
}

impl Votes {
    /// Start an election seeded with the block that triggered it.
    pub fn new(block: Arc<Block>) -> Self {
        let mut rep_votes = HashMap::new();
        rep_votes.insert(INITIAL_VOTER, Arc::clone(&block));
        Self {
            id: block.root(),
            rep_votes,
        }
    }

    /// Record a representative's vote, replacing any previous choice.
    pub fn vote(&mut self, vote: &Vote) -> TallyResult {
        let block = Arc::new(vote.block.clone());
        match self.rep_votes.entry(vote.account) {
            Entry::Vacant(entry) => {
                entry.insert(block);
                TallyResult::Vote
            }
            Entry::Occupied(mut entry) => {
                if **entry.get() == *block {
                    TallyResult::Confirm
                } else {
                    entry.insert(block);
                    TallyResult::Changed
                }
            }
        }
    }

    /// Number of real votes received (the seeded initial block excluded).
    pub fn voter_count(&self) -> usize {
        self.rep_votes.len() - 1
    }
}
