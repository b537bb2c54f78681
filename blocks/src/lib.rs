//! Block model for the lattice ledger.
//!
//! Each account owns an independent chain of blocks. Four legacy variants
//! (send, receive, open, change) carry only the fields their operation
//! needs; the unified state variant carries the full account state. Every
//! variant has a canonical binary form, a canonical JSON form, and a
//! Blake2b-256 hash over its "hashables" (the fields that contribute to the
//! block identity — signature and work are excluded).

pub mod change;
pub mod open;
pub mod receive;
pub mod send;
pub mod state;
pub mod vote;

pub use change::{ChangeBlock, ChangeHashables};
pub use open::{OpenBlock, OpenHashables};
pub use receive::{ReceiveBlock, ReceiveHashables};
pub use send::{SendBlock, SendHashables};
pub use state::{StateBlock, StateHashables};
pub use vote::Vote;

use lattice_types::{Account, BlockHash, Signature};
use serde_json::Value;
use thiserror::Error;

/// Errors from block and vote codecs.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("unknown block type tag: {0}")]
    UnknownType(u8),

    #[error("block body truncated")]
    Truncated,

    #[error("invalid {0} field")]
    InvalidField(&'static str),

    #[error("unexpected block type")]
    UnexpectedType,
}

/// Wire tag selecting a block variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    Invalid = 0,
    NotABlock = 1,
    Send = 2,
    Receive = 3,
    Open = 4,
    Change = 5,
    State = 6,
}

impl BlockType {
    pub fn from_tag(tag: u8) -> Result<Self, BlockError> {
        match tag {
            0 => Ok(Self::Invalid),
            1 => Ok(Self::NotABlock),
            2 => Ok(Self::Send),
            3 => Ok(Self::Receive),
            4 => Ok(Self::Open),
            5 => Ok(Self::Change),
            6 => Ok(Self::State),
            other => Err(BlockError::UnknownType(other)),
        }
    }

    pub const fn tag(&self) -> u8 {
        *self as u8
    }
}

/// A block of any variant. Closed tagged union; all dispatch is by match so
/// the compiler checks exhaustiveness when a variant is added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Send(SendBlock),
    Receive(ReceiveBlock),
    Open(OpenBlock),
    Change(ChangeBlock),
    State(StateBlock),
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::Send(_) => BlockType::Send,
            Block::Receive(_) => BlockType::Receive,
            Block::Open(_) => BlockType::Open,
            Block::Change(_) => BlockType::Change,
            Block::State(_) => BlockType::State,
        }
    }

    /// Blake2b-256 digest of the hashables.
    pub fn hash(&self) -> BlockHash {
        match self {
            Block::Send(b) => b.hash(),
            Block::Receive(b) => b.hash(),
            Block::Open(b) => b.hash(),
            Block::Change(b) => b.hash(),
            Block::State(b) => b.hash(),
        }
    }

    /// Previous block in the account's chain; zero for an open block.
    pub fn previous(&self) -> BlockHash {
        match self {
            Block::Send(b) => b.hashables.previous,
            Block::Receive(b) => b.hashables.previous,
            Block::Open(_) => BlockHash::ZERO,
            Block::Change(b) => b.hashables.previous,
            Block::State(b) => b.hashables.previous,
        }
    }

    /// Source block for receive/open blocks, zero otherwise. State blocks
    /// return zero here; the ledger infers their source from the link.
    pub fn source(&self) -> BlockHash {
        match self {
            Block::Receive(b) => b.hashables.source,
            Block::Open(b) => b.hashables.source,
            _ => BlockHash::ZERO,
        }
    }

    /// The election root: previous for non-initial blocks, the account
    /// number for chain-initial blocks. Competing forks share a root.
    pub fn root(&self) -> BlockHash {
        match self {
            Block::Send(b) => b.hashables.previous,
            Block::Receive(b) => b.hashables.previous,
            Block::Open(b) => BlockHash::from(b.hashables.account),
            Block::Change(b) => b.hashables.previous,
            Block::State(b) => {
                if !b.hashables.previous.is_zero() {
                    b.hashables.previous
                } else {
                    BlockHash::from(b.hashables.account)
                }
            }
        }
    }

    /// Representative designated by this block; zero for blocks that do not
    /// carry one.
    pub fn representative(&self) -> Account {
        match self {
            Block::Open(b) => b.hashables.representative,
            Block::Change(b) => b.hashables.representative,
            Block::State(b) => b.hashables.representative,
            _ => Account::ZERO,
        }
    }

    pub fn signature(&self) -> Signature {
        match self {
            Block::Send(b) => b.signature,
            Block::Receive(b) => b.signature,
            Block::Open(b) => b.signature,
            Block::Change(b) => b.signature,
            Block::State(b) => b.signature,
        }
    }

    pub fn work(&self) -> u64 {
        match self {
            Block::Send(b) => b.work,
            Block::Receive(b) => b.work,
            Block::Open(b) => b.work,
            Block::Change(b) => b.work,
            Block::State(b) => b.work,
        }
    }

    pub fn set_work(&mut self, work: u64) {
        match self {
            Block::Send(b) => b.work = work,
            Block::Receive(b) => b.work = work,
            Block::Open(b) => b.work = work,
            Block::Change(b) => b.work = work,
            Block::State(b) => b.work = work,
        }
    }

    /// Whether this block may legally follow `previous` in a chain.
    ///
    /// Legacy blocks may follow only legacy blocks; a state block may follow
    /// anything; nothing follows before an open. This is what stops legacy
    /// blocks from being appended onto a state head.
    pub fn valid_predecessor(&self, previous: &Block) -> bool {
        match self {
            Block::Open(_) => false,
            Block::State(_) => true,
            _ => matches!(
                previous.block_type(),
                BlockType::Send | BlockType::Receive | BlockType::Open | BlockType::Change
            ),
        }
    }

    /// Untagged canonical body, as stored in the per-type block tables.
    pub fn serialize(&self, out: &mut Vec<u8>) {
        match self {
            Block::Send(b) => b.serialize(out),
            Block::Receive(b) => b.serialize(out),
            Block::Open(b) => b.serialize(out),
            Block::Change(b) => b.serialize(out),
            Block::State(b) => b.serialize(out),
        }
    }

    /// Canonical JSON form.
    pub fn to_json(&self) -> Value {
        match self {
            Block::Send(b) => b.to_json(),
            Block::Receive(b) => b.to_json(),
            Block::Open(b) => b.to_json(),
            Block::Change(b) => b.to_json(),
            Block::State(b) => b.to_json(),
        }
    }

    /// Size of the untagged body for a variant.
    pub fn serialized_size(block_type: BlockType) -> Result<usize, BlockError> {
        match block_type {
            BlockType::Send => Ok(SendBlock::SIZE),
            BlockType::Receive => Ok(ReceiveBlock::SIZE),
            BlockType::Open => Ok(OpenBlock::SIZE),
            BlockType::Change => Ok(ChangeBlock::SIZE),
            BlockType::State => Ok(StateBlock::SIZE),
            BlockType::Invalid | BlockType::NotABlock => Err(BlockError::UnexpectedType),
        }
    }

    /// Decode an untagged body of a known variant.
    pub fn deserialize(block_type: BlockType, bytes: &[u8]) -> Result<Self, BlockError> {
        match block_type {
            BlockType::Send => SendBlock::from_bytes(bytes).map(Block::Send),
            BlockType::Receive => ReceiveBlock::from_bytes(bytes).map(Block::Receive),
            BlockType::Open => OpenBlock::from_bytes(bytes).map(Block::Open),
            BlockType::Change => ChangeBlock::from_bytes(bytes).map(Block::Change),
            BlockType::State => StateBlock::from_bytes(bytes).map(Block::State),
            BlockType::Invalid | BlockType::NotABlock => Err(BlockError::UnexpectedType),
        }
    }

    /// Parse the canonical JSON form, dispatching on the `type` key.
    pub fn from_json(value: &Value) -> Result<Self, BlockError> {
        match json_str(value, "type")? {
            "send" => SendBlock::from_json(value).map(Block::Send),
            "receive" => ReceiveBlock::from_json(value).map(Block::Receive),
            "open" => OpenBlock::from_json(value).map(Block::Open),
            "change" => ChangeBlock::from_json(value).map(Block::Change),
            "state" => StateBlock::from_json(value).map(Block::State),
            _ => Err(BlockError::UnexpectedType),
        }
    }
}

/// Serialize a block prefixed with its 1-byte wire tag.
pub fn serialize_block(out: &mut Vec<u8>, block: &Block) {
    out.push(block.block_type().tag());
    block.serialize(out);
}

/// Deserialize a tag-prefixed block, returning it and the bytes consumed.
pub fn deserialize_block(bytes: &[u8]) -> Result<(Block, usize), BlockError> {
    let (&tag, body) = bytes.split_first().ok_or(BlockError::Truncated)?;
    let block_type = BlockType::from_tag(tag)?;
    let size = Block::serialized_size(block_type)?;
    if body.len() < size {
        return Err(BlockError::Truncated);
    }
    let block = Block::deserialize(block_type, &body[..size])?;
    Ok((block, 1 + size))
}

// Byte-cursor helpers shared by the variant codecs.

pub(crate) fn read_array<const N: usize>(
    bytes: &[u8],
    at: &mut usize,
) -> Result<[u8; N], BlockError> {
    let end = *at + N;
    let slice = bytes.get(*at..end).ok_or(BlockError::Truncated)?;
    *at = end;
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    Ok(out)
}

pub(crate) fn read_u64_le(bytes: &[u8], at: &mut usize) -> Result<u64, BlockError> {
    read_array::<8>(bytes, at).map(u64::from_le_bytes)
}

pub(crate) fn read_u64_be(bytes: &[u8], at: &mut usize) -> Result<u64, BlockError> {
    read_array::<8>(bytes, at).map(u64::from_be_bytes)
}

// JSON helpers shared by the variant codecs.

pub(crate) fn json_str<'a>(value: &'a Value, key: &'static str) -> Result<&'a str, BlockError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or(BlockError::InvalidField(key))
}

pub(crate) fn work_to_hex(work: u64) -> String {
    format!("{:016x}", work)
}

pub(crate) fn work_from_hex(s: &str) -> Result<u64, BlockError> {
    if s.len() != 16 {
        return Err(BlockError::InvalidField("work"));
    }
    u64::from_str_radix(s, 16).map_err(|_| BlockError::InvalidField("work"))
}
