//! Representative votes.
//!
//! A vote binds a representative account to one block of a fork, with a
//! monotonically increasing sequence number for replay protection. The
//! signature covers `blake2b256(block_hash || sequence_le)`.

use crate::{
    deserialize_block, read_array, read_u64_le, serialize_block, Block, BlockError, BlockType,
};
use lattice_crypto::{blake2b_256_multi, sign_message, validate_message};
use lattice_types::{Account, BlockHash, RawKey, Signature};
use serde_json::{json, Value};

/// A representative's vote for one block of a fork.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vote {
    /// The representative casting the vote.
    pub account: Account,
    pub signature: Signature,
    /// Vote round sequence number; replays carry a non-increasing sequence.
    pub sequence: u64,
    pub block: Block,
}

impl Vote {
    /// Build and sign a vote.
    pub fn new(account: Account, private_key: &RawKey, sequence: u64, block: Block) -> Self {
        let digest = vote_digest(&block.hash(), sequence);
        Self {
            account,
            signature: sign_message(private_key, &digest),
            sequence,
            block,
        }
    }

    /// The digest the signature covers.
    pub fn hash(&self) -> BlockHash {
        BlockHash::from_bytes(vote_digest(&self.block.hash(), self.sequence))
    }

    /// Verify the signature against the voting account.
    pub fn validate(&self) -> bool {
        validate_message(&self.account, self.hash().as_bytes(), &self.signature)
    }

    /// Self-contained wire form: the embedded block carries its own tag.
    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.account.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.sequence.to_le_bytes());
        serialize_block(out, &self.block);
    }

    /// Envelope wire form: the outer message already carries the block type,
    /// so the embedded block is untagged.
    pub fn serialize_untagged(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.account.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.sequence.to_le_bytes());
        self.block.serialize(out);
    }

    /// Parse the self-contained wire form.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, BlockError> {
        let mut at = 0;
        let account = Account::from_bytes(read_array(bytes, &mut at)?);
        let signature = Signature(read_array(bytes, &mut at)?);
        let sequence = read_u64_le(bytes, &mut at)?;
        let (block, _) = deserialize_block(&bytes[at..])?;
        Ok(Self {
            account,
            signature,
            sequence,
            block,
        })
    }

    /// Parse the envelope wire form, with the block type supplied by the
    /// outer message.
    pub fn deserialize_with_type(bytes: &[u8], block_type: BlockType) -> Result<Self, BlockError> {
        let mut at = 0;
        let account = Account::from_bytes(read_array(bytes, &mut at)?);
        let signature = Signature(read_array(bytes, &mut at)?);
        let sequence = read_u64_le(bytes, &mut at)?;
        let size = Block::serialized_size(block_type)?;
        let body = bytes.get(at..at + size).ok_or(BlockError::Truncated)?;
        let block = Block::deserialize(block_type, body)?;
        Ok(Self {
            account,
            signature,
            sequence,
            block,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "account": self.account.encode_account(),
            "signature": self.signature.encode_hex(),
            "sequence": self.sequence.to_string(),
            "block": self.block.to_json(),
        })
    }
}

fn vote_digest(block_hash: &BlockHash, sequence: u64) -> [u8; 32] {
    blake2b_256_multi(&[block_hash.as_bytes(), &sequence.to_le_bytes()])
}
