//! Change blocks — re-delegate voting weight without moving funds.

use crate::{json_str, read_array, read_u64_le, work_from_hex, work_to_hex, BlockError};
use lattice_crypto::{blake2b_256_multi, sign_message};
use lattice_types::{Account, BlockHash, RawKey, Signature};
use serde_json::{json, Value};

/// Fields contributing to a change block's hash, in canonical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeHashables {
    pub previous: BlockHash,
    pub representative: Account,
}

impl ChangeHashables {
    fn digest(&self) -> [u8; 32] {
        blake2b_256_multi(&[self.previous.as_bytes(), self.representative.as_bytes()])
    }
}

/// Representative change block; the account balance is untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeBlock {
    pub hashables: ChangeHashables,
    pub signature: Signature,
    pub work: u64,
}

impl ChangeBlock {
    /// Serialized body size: previous + representative + signature + work.
    pub const SIZE: usize = 32 + 32 + 64 + 8;

    /// Build and sign a change block.
    pub fn new(
        previous: BlockHash,
        representative: Account,
        private_key: &RawKey,
        work: u64,
    ) -> Self {
        let hashables = ChangeHashables {
            previous,
            representative,
        };
        let signature = sign_message(private_key, &hashables.digest());
        Self {
            hashables,
            signature,
            work,
        }
    }

    pub fn hash(&self) -> BlockHash {
        BlockHash::from_bytes(self.hashables.digest())
    }

    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.hashables.previous.as_bytes());
        out.extend_from_slice(self.hashables.representative.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlockError> {
        let mut at = 0;
        let previous = BlockHash::from_bytes(read_array(bytes, &mut at)?);
        let representative = Account::from_bytes(read_array(bytes, &mut at)?);
        let signature = Signature(read_array(bytes, &mut at)?);
        let work = read_u64_le(bytes, &mut at)?;
        Ok(Self {
            hashables: ChangeHashables {
                previous,
                representative,
            },
            signature,
            work,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "change",
            "previous": self.hashables.previous.encode_hex(),
            "representative": self.hashables.representative.encode_account(),
            "work": work_to_hex(self.work),
            "signature": self.signature.encode_hex(),
        })
    }

    pub fn from_json(value: &Value) -> Result<Self, BlockError> {
        if json_str(value, "type")? != "change" {
            return Err(BlockError::UnexpectedType);
        }
        let previous = BlockHash::decode_hex(json_str(value, "previous")?)
            .ok_or(BlockError::InvalidField("previous"))?;
        let representative = Account::decode_account(json_str(value, "representative")?)
            .ok_or(BlockError::InvalidField("representative"))?;
        let work = work_from_hex(json_str(value, "work")?)?;
        let signature = Signature::decode_hex(json_str(value, "signature")?)
            .ok_or(BlockError::InvalidField("signature"))?;
        Ok(Self {
            hashables: ChangeHashables {
                previous,
                representative,
            },
            signature,
            work,
        })
    }
}
