//! Send blocks — debit the sender's chain and create a pending entry.

use crate::{json_str, read_array, read_u64_le, work_from_hex, work_to_hex, BlockError};
use lattice_crypto::{blake2b_256_multi, sign_message};
use lattice_types::{Account, Amount, BlockHash, RawKey, Signature};
use serde_json::{json, Value};

/// Fields contributing to a send block's hash, in canonical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendHashables {
    pub previous: BlockHash,
    pub destination: Account,
    /// Sender's balance after the send. The transferred amount is the
    /// difference from the predecessor's balance.
    pub balance: Amount,
}

impl SendHashables {
    fn digest(&self) -> [u8; 32] {
        blake2b_256_multi(&[
            self.previous.as_bytes(),
            self.destination.as_bytes(),
            &self.balance.to_le_bytes(),
        ])
    }
}

/// Debit block on the sender's chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendBlock {
    pub hashables: SendHashables,
    pub signature: Signature,
    pub work: u64,
}

impl SendBlock {
    /// Serialized body size: previous + destination + balance + signature + work.
    pub const SIZE: usize = 32 + 32 + 16 + 64 + 8;

    /// Build and sign a send block.
    pub fn new(
        previous: BlockHash,
        destination: Account,
        balance: Amount,
        private_key: &RawKey,
        work: u64,
    ) -> Self {
        let hashables = SendHashables {
            previous,
            destination,
            balance,
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
        out.extend_from_slice(self.hashables.destination.as_bytes());
        out.extend_from_slice(&self.hashables.balance.to_le_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_le_bytes());
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlockError> {
        let mut at = 0;
        let previous = BlockHash::from_bytes(read_array(bytes, &mut at)?);
        let destination = Account::from_bytes(read_array(bytes, &mut at)?);
        let balance = Amount::from_le_bytes(read_array(bytes, &mut at)?);
        let signature = Signature(read_array(bytes, &mut at)?);
        let work = read_u64_le(bytes, &mut at)?;
        Ok(Self {
            hashables: SendHashables {
                previous,
                destination,
                balance,
            },
            signature,
            work,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "send",
            "previous": self.hashables.previous.encode_hex(),
            "destination": self.hashables.destination.encode_account(),
            "balance": self.hashables.balance.encode_hex(),
            "work": work_to_hex(self.work),
            "signature": self.signature.encode_hex(),
        })
    }

    pub fn from_json(value: &Value) -> Result<Self, BlockError> {
        if json_str(value, "type")? != "send" {
            return Err(BlockError::UnexpectedType);
        }
        let previous = BlockHash::decode_hex(json_str(value, "previous")?)
            .ok_or(BlockError::InvalidField("previous"))?;
        let destination = Account::decode_account(json_str(value, "destination")?)
            .ok_or(BlockError::InvalidField("destination"))?;
        let balance = Amount::decode_hex(json_str(value, "balance")?)
            .ok_or(BlockError::InvalidField("balance"))?;
        let work = work_from_hex(json_str(value, "work")?)?;
        let signature = Signature::decode_hex(json_str(value, "signature")?)
            .ok_or(BlockError::InvalidField("signature"))?;
        Ok(Self {
            hashables: SendHashables {
                previous,
                destination,
                balance,
            },
            signature,
            work,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_crypto::{validate_message, KeyPair};

    fn sample() -> (KeyPair, SendBlock) {
        let keys = KeyPair::from_private(RawKey([9u8; 32]));
        let block = SendBlock::new(
            BlockHash::from_bytes([1; 32]),
            Account::from_bytes([2; 32]),
            Amount::new(12345),
            &keys.private,
            0x1234,
        );
        (keys, block)
    }

    #[test]
    fn hash_ignores_signature_and_work() {
        let (_, block) = sample();
        let mut other = block.clone();
        other.signature = Signature::ZERO;
        other.work = 0;
        assert_eq!(block.hash(), other.hash());
    }

    #[test]
    fn hash_covers_every_hashable() {
        let (_, block) = sample();
        let mut other = block.clone();
        other.hashables.balance = Amount::new(1);
        assert_ne!(block.hash(), other.hash());
    }

    #[test]
    fn signature_covers_hash() {
        let (keys, block) = sample();
        assert!(validate_message(
            &keys.public,
            block.hash().as_bytes(),
            &block.signature
        ));
    }

    #[test]
    fn binary_roundtrip() {
        let (_, block) = sample();
        let mut bytes = Vec::new();
        block.serialize(&mut bytes);
        assert_eq!(bytes.len(), SendBlock::SIZE);
        assert_eq!(SendBlock::from_bytes(&bytes).unwrap(), block);
    }

    #[test]
    fn json_roundtrip() {
        let (_, block) = sample();
        let value = block.to_json();
        assert_eq!(value["type"], "send");
        assert_eq!(SendBlock::from_json(&value).unwrap(), block);
    }

    #[test]
    fn json_rejects_foreign_type() {
        let (_, block) = sample();
        let mut value = block.to_json();
        value["type"] = Value::from("receive");
        assert!(SendBlock::from_json(&value).is_err());
    }
}
