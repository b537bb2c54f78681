//! Open blocks — the first block of a legacy account chain.

use crate::{json_str, read_array, read_u64_le, work_from_hex, work_to_hex, BlockError};
use lattice_crypto::{blake2b_256_multi, sign_message};
use lattice_types::{Account, BlockHash, RawKey, Signature};
use serde_json::{json, Value};

/// Fields contributing to an open block's hash, in canonical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenHashables {
    /// Hash of the send block being received.
    pub source: BlockHash,
    pub representative: Account,
    pub account: Account,
}

impl OpenHashables {
    fn digest(&self) -> [u8; 32] {
        blake2b_256_multi(&[
            self.source.as_bytes(),
            self.representative.as_bytes(),
            self.account.as_bytes(),
        ])
    }
}

/// Chain-initial block; consumes a pending send and designates the first
/// representative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenBlock {
    pub hashables: OpenHashables,
    pub signature: Signature,
    pub work: u64,
}

impl OpenBlock {
    /// Serialized body size: source + representative + account + signature + work.
    pub const SIZE: usize = 32 + 32 + 32 + 64 + 8;

    /// Build and sign an open block.
    pub fn new(
        source: BlockHash,
        representative: Account,
        account: Account,
        private_key: &RawKey,
        work: u64,
    ) -> Self {
        let hashables = OpenHashables {
            source,
            representative,
            account,
        };
        let signature = sign_message(private_key, &hashables.digest());
        Self {
            hashables,
            signature,
            work,
        }
    }

    /// Build an open block with an externally supplied signature, for the
    /// hard-coded genesis blocks whose private keys are not available.
    pub fn with_signature(
        source: BlockHash,
        representative: Account,
        account: Account,
        signature: Signature,
        work: u64,
    ) -> Self {
        Self {
            hashables: OpenHashables {
                source,
                representative,
                account,
            },
            signature,
            work,
        }
    }

    pub fn hash(&self) -> BlockHash {
        BlockHash::from_bytes(self.hashables.digest())
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.hashables.source.as_bytes());
        out.extend_from_slice(self.hashables.representative.as_bytes());
        out.extend_from_slice(self.hashables.account.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlockError> {
        let mut at = 0;
        let source = BlockHash::from_bytes(read_array(bytes, &mut at)?);
        let representative = Account::from_bytes(read_array(bytes, &mut at)?);
        let account = Account::from_bytes(read_array(bytes, &mut at)?);
        let signature = Signature(read_array(bytes, &mut at)?);
        let work = read_u64_le(bytes, &mut at)?;
        Ok(Self {
            hashables: OpenHashables {
                source,
                representative,
                account,
            },
            signature,
            work,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "open",
            "source": self.hashables.source.encode_hex(),
            "representative": self.hashables.representative.encode_account(),
            "account": self.hashables.account.encode_account(),
            "work": work_to_hex(self.work),
            "signature": self.signature.encode_hex(),
        })
    }

    pub fn from_json(value: &Value) -> Result<Self, BlockError> {
        if json_str(value, "type")? != "open" {
            return Err(BlockError::UnexpectedType);
        }
        let source = BlockHash::decode_hex(json_str(value, "source")?)
            .ok_or(BlockError::InvalidField("source"))?;
        let representative = Account::decode_account(json_str(value, "representative")?)
            .ok_or(BlockError::InvalidField("representative"))?;
        let account = Account::decode_account(json_str(value, "account")?)
            .ok_or(BlockError::InvalidField("account"))?;
        let work = work_from_hex(json_str(value, "work")?)?;
        let signature = Signature::decode_hex(json_str(value, "signature")?)
            .ok_or(BlockError::InvalidField("signature"))?;
        Ok(Self {
            hashables: OpenHashables {
                source,
                representative,
                account,
            },
            signature,
            work,
        })
    }
}
