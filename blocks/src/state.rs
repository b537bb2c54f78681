//! State blocks — the unified replacement for the four legacy variants.
//!
//! A state block carries the full account state: account, previous,
//! representative, balance and a link whose meaning depends on the balance
//! direction (destination account on send, source hash on receive, zero on a
//! pure representative change). Its hash is prefixed with a 32-byte
//! big-endian preamble whose least significant byte is the wire tag 6, so a
//! state pre-image can never collide with a legacy one.

use crate::{json_str, read_array, read_u64_be, work_from_hex, work_to_hex, BlockError, BlockType};
use lattice_crypto::{blake2b_256_multi, sign_message};
use lattice_types::{Account, Amount, BlockHash, Link, RawKey, Signature};
use serde_json::{json, Value};

/// The 32-byte hash preamble distinguishing state pre-images.
const PREAMBLE: [u8; 32] = {
    let mut preamble = [0u8; 32];
    preamble[31] = BlockType::State.tag();
    preamble
};

/// Fields contributing to a state block's hash, in canonical order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateHashables {
    /// Public key that operates this account chain.
    pub account: Account,
    /// Previous block in this chain; zero when the block opens the account.
    pub previous: BlockHash,
    pub representative: Account,
    /// Balance of the account after this block.
    pub balance: Amount,
    /// Destination account if sending, source block hash if receiving, zero
    /// for a pure representative change.
    pub link: Link,
}

impl StateHashables {
    fn digest(&self) -> [u8; 32] {
        blake2b_256_multi(&[
            &PREAMBLE,
            self.account.as_bytes(),
            self.previous.as_bytes(),
            self.representative.as_bytes(),
            &self.balance.to_le_bytes(),
            self.link.as_bytes(),
        ])
    }
}

/// Unified block carrying the full account state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateBlock {
    pub hashables: StateHashables,
    pub signature: Signature,
    pub work: u64,
}

impl StateBlock {
    /// Serialized body size: account + previous + representative + balance +
    /// link + signature + work.
    pub const SIZE: usize = 32 + 32 + 32 + 16 + 32 + 64 + 8;

    /// Build and sign a state block.
    pub fn new(
        account: Account,
        previous: BlockHash,
        representative: Account,
        balance: Amount,
        link: Link,
        private_key: &RawKey,
        work: u64,
    ) -> Self {
        let hashables = StateHashables {
            account,
            previous,
            representative,
            balance,
            link,
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

    /// Work is serialized big-endian, unlike the legacy variants.
    pub fn serialize(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.hashables.account.as_bytes());
        out.extend_from_slice(self.hashables.previous.as_bytes());
        out.extend_from_slice(self.hashables.representative.as_bytes());
        out.extend_from_slice(&self.hashables.balance.to_le_bytes());
        out.extend_from_slice(self.hashables.link.as_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out.extend_from_slice(&self.work.to_be_bytes());
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BlockError> {
        let mut at = 0;
        let account = Account::from_bytes(read_array(bytes, &mut at)?);
        let previous = BlockHash::from_bytes(read_array(bytes, &mut at)?);
        let representative = Account::from_bytes(read_array(bytes, &mut at)?);
        let balance = Amount::from_le_bytes(read_array(bytes, &mut at)?);
        let link = Link::from_bytes(read_array(bytes, &mut at)?);
        let signature = Signature(read_array(bytes, &mut at)?);
        let work = read_u64_be(bytes, &mut at)?;
        Ok(Self {
            hashables: StateHashables {
                account,
                previous,
                representative,
                balance,
                link,
            },
            signature,
            work,
        })
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "state",
            "account": self.hashables.account.encode_account(),
            "previous": self.hashables.previous.encode_hex(),
            "representative": self.hashables.representative.encode_account(),
            "balance": self.hashables.balance.encode_dec(),
            "link": self.hashables.link.encode_hex(),
            "link_as_account": self.hashables.link.as_account().encode_account(),
            "signature": self.signature.encode_hex(),
            "work": work_to_hex(self.work),
        })
    }

    pub fn from_json(value: &Value) -> Result<Self, BlockError> {
        if json_str(value, "type")? != "state" {
            return Err(BlockError::UnexpectedType);
        }
        let account = Account::decode_account(json_str(value, "account")?)
            .ok_or(BlockError::InvalidField("account"))?;
        let previous = BlockHash::decode_hex(json_str(value, "previous")?)
            .ok_or(BlockError::InvalidField("previous"))?;
        let representative = Account::decode_account(json_str(value, "representative")?)
            .ok_or(BlockError::InvalidField("representative"))?;
        let balance = Amount::decode_dec(json_str(value, "balance")?)
            .ok_or(BlockError::InvalidField("balance"))?;
        let link =
            Link::decode(json_str(value, "link")?).ok_or(BlockError::InvalidField("link"))?;
        let signature = Signature::decode_hex(json_str(value, "signature")?)
            .ok_or(BlockError::InvalidField("signature"))?;
        let work = work_from_hex(json_str(value, "work")?)?;
        Ok(Self {
            hashables: StateHashables {
                account,
                previous,
                representative,
                balance,
                link,
            },
            signature,
            work,
        })
    }
}
