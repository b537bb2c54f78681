//! Per-network ledger constants.
//!
//! Each network variant carries its genesis account and open block. The
//! constants object is built once at startup and passed into the ledger by
//! reference; nothing here is ambient process state.

use lattice_blocks::OpenBlock;
use lattice_crypto::KeyPair;
use lattice_types::{Account, Amount, BlockHash, NetworkId, Signature, GENESIS_AMOUNT};

/// Test-network genesis private key. Published so tests and local networks
/// can extend the genesis chain.
const TEST_GENESIS_KEY: &str = "7C9A4E62D0B15F3381AD5CE8FA06931B247E0D5590C1F7A4E8263B9D104C8E55";

const BETA_GENESIS_ACCOUNT: &str =
    "1A7EDC05B8F2334C9B6E17D04A5F82E6C3D9B1007F64A2E85D1B39C46870F2D4";
const BETA_GENESIS_SIGNATURE: &str =
    "52C19F0A386BD74EE191A51C0EE0C2D2A8F36E64D10B8A3C5E7F49021B6D83E7\
     D0A45F17C92B30E864FD1A52B79C6083EAD2F15B04C7A89361EC0D5429B8F104";
const BETA_GENESIS_WORK: u64 = 0x375cb22ae6ab2f1c;

const LIVE_GENESIS_ACCOUNT: &str =
    "C40D1E86A7553929B7E543F29D0C3E175B9F04826ADE13BC9E847A05F12D66B3";
const LIVE_GENESIS_SIGNATURE: &str =
    "A8E13597F04DC2661B5E87230F9A4CD5183BE6740921CFA53D6B04E89172AD30\
     4E6C5B2291D08F7A3655E0C49D183BF261A09E74528C3DB16F40A21E85C7B906";
const LIVE_GENESIS_WORK: u64 = 0x62f05417dd3fb691;

/// Constants that parameterize a ledger for one network.
#[derive(Clone, Debug)]
pub struct LedgerConstants {
    pub network: NetworkId,
    pub genesis_account: Account,
    pub genesis_block: OpenBlock,
    pub genesis_amount: Amount,
    /// The all-zero public key; opening it is rejected.
    pub burn_account: Account,
    /// Until this block is present in the store, state blocks are rejected.
    pub state_block_parse_canary: BlockHash,
    /// Gates state-block creation on the collaborator side.
    pub state_block_generate_canary: BlockHash,
}

impl LedgerConstants {
    pub fn for_network(network: NetworkId) -> Self {
        match network {
            NetworkId::Test => Self::test(),
            NetworkId::Beta => Self::from_published(
                NetworkId::Beta,
                BETA_GENESIS_ACCOUNT,
                BETA_GENESIS_SIGNATURE,
                BETA_GENESIS_WORK,
            ),
            NetworkId::Live => Self::from_published(
                NetworkId::Live,
                LIVE_GENESIS_ACCOUNT,
                LIVE_GENESIS_SIGNATURE,
                LIVE_GENESIS_WORK,
            ),
        }
    }

    /// The test network's genesis key pair.
    pub fn test_genesis_keys() -> KeyPair {
        KeyPair::from_hex(TEST_GENESIS_KEY).expect("well-formed test genesis key")
    }

    fn test() -> Self {
        let keys = Self::test_genesis_keys();
        // The genesis open's source field holds the genesis public key: the
        // supply comes from nowhere, not from a stored send.
        let genesis_block = OpenBlock::new(
            BlockHash::from(keys.public),
            keys.public,
            keys.public,
            &keys.private,
            0,
        );
        Self {
            network: NetworkId::Test,
            genesis_account: keys.public,
            genesis_block,
            genesis_amount: GENESIS_AMOUNT,
            burn_account: Account::ZERO,
            state_block_parse_canary: BlockHash::ZERO,
            state_block_generate_canary: BlockHash::ZERO,
        }
    }

    /// Beta and live genesis blocks were signed at launch; only the public
    /// parts are published.
    fn from_published(network: NetworkId, account: &str, signature: &str, work: u64) -> Self {
        let genesis_account = Account::decode_hex(account).expect("well-formed genesis account");
        let signature = Signature::decode_hex(signature).expect("well-formed genesis signature");
        let genesis_block = OpenBlock::with_signature(
            BlockHash::from(genesis_account),
            genesis_account,
            genesis_account,
            signature,
            work,
        );
        Self {
            network,
            genesis_account,
            genesis_block,
            genesis_amount: GENESIS_AMOUNT,
            burn_account: Account::ZERO,
            state_block_parse_canary: BlockHash::ZERO,
            state_block_generate_canary: BlockHash::ZERO,
        }
    }
}
