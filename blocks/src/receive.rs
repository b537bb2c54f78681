//! Receive blocks — credit the recipient's chain by consuming a pending send.

use crate::{json_str, read_array, read_u64_le, work_from_hex, work_to_hex, BlockError};
use lattice_crypto::{blake2b_256_multi, sign_message};
use lattice_types::{BlockHash, RawKey, Signature};
use serde_json::{json, Value};

/// Fields contributing to a receive block's hash, in canonical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiveHashables {
    pub previous: BlockHash,
    /// Hash of the send block being received.
    pub source: BlockHash,
}

impl ReceiveHashables {
    fn digest(&self) -> [u8; 32] {
        blake2b_256_multi(&[self.previous.as_bytes(), self.source.as_bytes()])
    }
}

/// Credit block on the recipient's chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiveBlock {
    pub hashables: ReceiveHashables,
    pub signature: Signature,
    pub work: u64,
}

impl ReceiveBlock {
    /// Serialized body size: previous + source + signature + work.
    pub const SIZE: usize = 32 + 32 + 64 + 8;

    /// Build and sign a receive block.
    pub fn new(previous: BlockHash, source: BlockHash, private_key: &RawKey, work: u64) -> Self {
        let hashables = ReceiveHashables { previous, source };
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
        out.extend_from_slice(self.hashables.source.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlockError> {
        let mut at = 0;
        let previous = BlockHash::from_bytes(read_array(bytes, &mut at)?);
        let source = BlockHash::from_bytes(read_array(bytes, &mut at)?);
        let signature = Signature(read_array(bytes, &mut at)?);
        let work = read_u64_le(bytes, &mut at)?;
        Ok(Self {
            hashables: ReceiveHashables { previous, source },
            signature,
            work,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "receive",
            "previous": self.hashables.previous.encode_hex(),
            "source": self.hashables.source.encode_hex(),
            "work": work_to_hex(self.work),
            "signature": self.signature.encode_hex(),
        })
    }

    pub fn from_json(value: &Value) -> Result<Self, BlockError> {
        if json_str(value, "type")? != "receive" {
            return Err(BlockError::UnexpectedType);
        }
        let previous = BlockHash::decode_hex(json_str(value, "previous")?)
            .ok_or(BlockError::InvalidField("previous"))?;
        let source = BlockHash::decode_hex(json_str(value, "source")?)
            .ok_or(BlockError::InvalidField("source"))?;
        let work = work_from_hex(json_str(value, "work")?)?;
        let signature = Signature::decode_hex(json_str(value, "signature")?)
            .ok_or(BlockError::InvalidField("signature"))?;
        Ok(Self {
            hashables: ReceiveHashables { previous, source },
            signature,
            work,
        })
    }
}
