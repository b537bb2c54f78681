//! End-to-end ledger scenarios on a test-network genesis.

use std::sync::Arc;

use lattice_blocks::{Block, ChangeBlock, OpenBlock, ReceiveBlock, SendBlock, StateBlock, Vote};
use lattice_consensus::Votes;
use lattice_crypto::KeyPair;
use lattice_ledger::{Genesis, Ledger, LedgerConstants, ProcessResult};
use lattice_store::{PendingInfo, PendingKey};
use lattice_store_lmdb::Store;
use lattice_types::{
    Account, Amount, BlockHash, Checksum, Link, NetworkId, RawKey, GENESIS_AMOUNT,
};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    store: Arc<Store>,
    ledger: Ledger,
    genesis_keys: KeyPair,
    genesis_hash: BlockHash,
}

/// Fresh store with the test genesis applied. `state_enabled` points the
/// parse canary at the genesis block so state blocks are accepted.
fn open_ledger_with(state_enabled: bool) -> Fixture {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(Store::open(dir.path()).unwrap());
    let mut constants = LedgerConstants::for_network(NetworkId::Test);
    let genesis = Genesis::new(&constants);
    let genesis_hash = genesis.hash();
    if state_enabled {
        constants.state_block_parse_canary = genesis_hash;
    }
    let ledger = Ledger::new(Arc::clone(&store), constants);
    let mut txn = store.write_txn().unwrap();
    genesis.initialize(&mut txn, &store).unwrap();
    txn.commit().unwrap();
    Fixture {
        _dir: dir,
        store,
        ledger,
        genesis_keys: LedgerConstants::test_genesis_keys(),
        genesis_hash,
    }
}

fn open_ledger() -> Fixture {
    open_ledger_with(true)
}

fn keys(byte: u8) -> KeyPair {
    KeyPair::from_private(RawKey([byte; 32]))
}

/// Process within a fresh write transaction, committing afterwards.
fn process(fixture: &Fixture, block: &Block) -> ProcessResult {
    let mut txn = fixture.store.write_txn().unwrap();
    let result = fixture.ledger.process(&mut txn, block).unwrap();
    txn.commit().unwrap();
    result.code
}

/// Tables that every scenario reasons about, with volatile modification
/// timestamps masked out.
#[derive(Debug, PartialEq)]
struct Snapshot {
    accounts: Vec<(Account, BlockHash, BlockHash, BlockHash, Amount, u64)>,
    pending: Vec<(PendingKey, PendingInfo)>,
    representation: Vec<(Account, Amount)>,
    frontier_count: u64,
    block_sum: u64,
    checksum: Option<Checksum>,
}

fn snapshot(fixture: &Fixture) -> Snapshot {
    let txn = fixture.store.read_txn().unwrap();
    Snapshot {
        accounts: fixture
            .store
            .account_entries(&txn)
            .unwrap()
            .into_iter()
            .map(|(account, info)| {
                (
                    account,
                    info.head,
                    info.rep_block,
                    info.open_block,
                    info.balance,
                    info.block_count,
                )
            })
            .collect(),
        pending: fixture.store.pending_entries(&txn).unwrap(),
        representation: fixture
            .store
            .representation_entries(&txn)
            .unwrap()
            .into_iter()
            .filter(|(_, weight)| !weight.is_zero())
            .collect(),
        frontier_count: fixture.store.frontier_count(&txn).unwrap(),
        block_sum: fixture.store.block_count(&txn).unwrap().sum(),
        checksum: fixture.store.checksum_get(&txn, 0, 0).unwrap(),
    }
}

/// Supply conservation: account balances plus pending amounts equal the
/// genesis amount.
fn assert_conserved(fixture: &Fixture) {
    let txn = fixture.store.read_txn().unwrap();
    assert_eq!(fixture.ledger.supply(&txn).unwrap(), GENESIS_AMOUNT);
}

/// Builds the scenario shared by several tests: genesis sends 1 raw to a new
/// account, which opens with itself as representative. Returns the new
/// account's keys and the send and open blocks.
fn send_and_open(fixture: &Fixture) -> (KeyPair, Block, Block) {
    let recipient = keys(11);
    let send = Block::Send(SendBlock::new(
        fixture.genesis_hash,
        recipient.public,
        GENESIS_AMOUNT - Amount::new(1),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(fixture, &send), ProcessResult::Progress);
    let open = Block::Open(OpenBlock::new(
        send.hash(),
        recipient.public,
        recipient.public,
        &recipient.private,
        0,
    ));
    assert_eq!(process(fixture, &open), ProcessResult::Progress);
    (recipient, send, open)
}

#[test]
fn genesis_only_store() {
    let fixture = open_ledger();
    let txn = fixture.store.read_txn().unwrap();
    let genesis_account = fixture.ledger.constants.genesis_account;

    assert_eq!(
        fixture
            .ledger
            .account_balance(&txn, &genesis_account)
            .unwrap(),
        GENESIS_AMOUNT
    );
    assert_eq!(
        fixture.ledger.weight(&txn, &genesis_account).unwrap(),
        GENESIS_AMOUNT
    );
    assert_eq!(
        fixture
            .store
            .frontier_get(&txn, &fixture.genesis_hash)
            .unwrap(),
        Some(genesis_account)
    );
    assert_eq!(fixture.ledger.supply(&txn).unwrap(), GENESIS_AMOUNT);
    assert_eq!(
        fixture.ledger.account(&txn, &fixture.genesis_hash).unwrap(),
        genesis_account
    );
    assert_eq!(
        fixture.store.checksum_get(&txn, 0, 0).unwrap(),
        Some(Checksum::from(fixture.genesis_hash))
    );
}

#[test]
fn send_then_open() {
    let fixture = open_ledger();
    let genesis_account = fixture.ledger.constants.genesis_account;
    let recipient = keys(11);

    let send = Block::Send(SendBlock::new(
        fixture.genesis_hash,
        recipient.public,
        GENESIS_AMOUNT - Amount::new(1),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &send), ProcessResult::Progress);

    {
        let txn = fixture.store.read_txn().unwrap();
        let key = PendingKey::new(recipient.public, send.hash());
        assert_eq!(
            fixture.store.pending_get(&txn, &key).unwrap(),
            Some(PendingInfo::new(genesis_account, Amount::new(1)))
        );
        assert_eq!(
            fixture
                .ledger
                .account_balance(&txn, &genesis_account)
                .unwrap(),
            GENESIS_AMOUNT - Amount::new(1)
        );
        assert_eq!(
            fixture
                .ledger
                .account_pending(&txn, &recipient.public)
                .unwrap(),
            Amount::new(1)
        );
    }
    assert_conserved(&fixture);

    let open = Block::Open(OpenBlock::new(
        send.hash(),
        recipient.public,
        recipient.public,
        &recipient.private,
        0,
    ));
    assert_eq!(process(&fixture, &open), ProcessResult::Progress);

    let txn = fixture.store.read_txn().unwrap();
    assert!(fixture
        .store
        .pending_get(&txn, &PendingKey::new(recipient.public, send.hash()))
        .unwrap()
        .is_none());
    let info = fixture
        .store
        .account_get(&txn, &recipient.public)
        .unwrap()
        .unwrap();
    assert_eq!(info.head, open.hash());
    assert_eq!(info.rep_block, open.hash());
    assert_eq!(info.balance, Amount::new(1));
    assert_eq!(info.block_count, 1);
    assert_eq!(
        fixture.ledger.weight(&txn, &recipient.public).unwrap(),
        Amount::new(1)
    );
    assert_eq!(
        fixture.ledger.weight(&txn, &genesis_account).unwrap(),
        GENESIS_AMOUNT - Amount::new(1)
    );
    drop(txn);
    assert_conserved(&fixture);
}

#[test]
fn stored_blocks_rehash_to_their_keys() {
    let fixture = open_ledger();
    let (_, send, open) = send_and_open(&fixture);
    let txn = fixture.store.read_txn().unwrap();
    for hash in [fixture.genesis_hash, send.hash(), open.hash()] {
        let block = fixture.store.block_get(&txn, &hash).unwrap().unwrap();
        assert_eq!(block.hash(), hash);
    }
}

#[test]
fn account_balances_match_balance_visitor() {
    let fixture = open_ledger();
    send_and_open(&fixture);
    let txn = fixture.store.read_txn().unwrap();
    for (_, info) in fixture.store.account_entries(&txn).unwrap() {
        assert_eq!(
            fixture.ledger.balance(&txn, &info.head).unwrap(),
            info.balance
        );
    }
}

#[test]
fn representation_matches_delegated_balances() {
    let fixture = open_ledger();
    send_and_open(&fixture);
    let txn = fixture.store.read_txn().unwrap();
    for (_, info) in fixture.store.account_entries(&txn).unwrap() {
        let rep_block = fixture
            .store
            .block_get(&txn, &info.rep_block)
            .unwrap()
            .unwrap();
        let weight = fixture
            .store
            .representation_get(&txn, &rep_block.representative())
            .unwrap();
        // Each account here delegates to a distinct representative.
        assert_eq!(weight, info.balance);
    }
}

#[test]
fn fork_rejected_without_side_effects() {
    let fixture = open_ledger();
    let (_, _send, _open) = send_and_open(&fixture);
    let before = snapshot(&fixture);

    let elsewhere = keys(12);
    let forked = Block::Send(SendBlock::new(
        fixture.genesis_hash,
        elsewhere.public,
        GENESIS_AMOUNT - Amount::new(2),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &forked), ProcessResult::Fork);
    assert_eq!(snapshot(&fixture), before);

    // The contested root resolves to the block already in place.
    let txn = fixture.store.read_txn().unwrap();
    let standing = fixture
        .ledger
        .forked_block(&txn, &forked)
        .unwrap()
        .unwrap();
    assert_eq!(standing.hash(), _send.hash());
}

#[test]
fn replay_rejected_as_old() {
    let fixture = open_ledger();
    let (_, send, _) = send_and_open(&fixture);
    assert_eq!(process(&fixture, &send), ProcessResult::Old);
}

#[test]
fn rollback_send_cascades_and_restores_genesis_state() {
    let fixture = open_ledger();
    let before = snapshot(&fixture);
    let genesis_account = fixture.ledger.constants.genesis_account;
    let (recipient, send, _open) = send_and_open(&fixture);

    let mut txn = fixture.store.write_txn().unwrap();
    fixture.ledger.rollback(&mut txn, &send.hash()).unwrap();
    txn.commit().unwrap();

    // Exactly the genesis-only state, including the dependent account's
    // removal and the frontier back at the genesis block.
    assert_eq!(snapshot(&fixture), before);
    let txn = fixture.store.read_txn().unwrap();
    assert!(fixture
        .store
        .account_get(&txn, &recipient.public)
        .unwrap()
        .is_none());
    assert_eq!(
        fixture
            .store
            .frontier_get(&txn, &fixture.genesis_hash)
            .unwrap(),
        Some(genesis_account)
    );
    assert_eq!(
        fixture.store.checksum_get(&txn, 0, 0).unwrap(),
        Some(Checksum::from(fixture.genesis_hash))
    );
}

#[test]
fn legacy_receive_and_rollback() {
    let fixture = open_ledger();
    let (recipient, _send1, open) = send_and_open(&fixture);
    let genesis_account = fixture.ledger.constants.genesis_account;

    let txn = fixture.store.read_txn().unwrap();
    let genesis_head = fixture
        .ledger
        .latest(&txn, &genesis_account)
        .unwrap()
        .unwrap();
    drop(txn);
    let send2 = Block::Send(SendBlock::new(
        genesis_head,
        recipient.public,
        GENESIS_AMOUNT - Amount::new(3),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &send2), ProcessResult::Progress);

    let receive = Block::Receive(ReceiveBlock::new(
        open.hash(),
        send2.hash(),
        &recipient.private,
        0,
    ));
    assert_eq!(process(&fixture, &receive), ProcessResult::Progress);

    {
        let txn = fixture.store.read_txn().unwrap();
        assert_eq!(
            fixture
                .ledger
                .account_balance(&txn, &recipient.public)
                .unwrap(),
            Amount::new(3)
        );
        assert_eq!(
            fixture.ledger.weight(&txn, &recipient.public).unwrap(),
            Amount::new(3)
        );
        assert_eq!(
            fixture.ledger.amount(&txn, &receive.hash()).unwrap(),
            Amount::new(2)
        );
    }
    assert_conserved(&fixture);

    // Receiving the same send twice is unreceivable.
    let again = Block::Receive(ReceiveBlock::new(
        receive.hash(),
        send2.hash(),
        &recipient.private,
        0,
    ));
    assert_eq!(process(&fixture, &again), ProcessResult::Unreceivable);

    let mut txn = fixture.store.write_txn().unwrap();
    fixture.ledger.rollback(&mut txn, &receive.hash()).unwrap();
    txn.commit().unwrap();

    let txn = fixture.store.read_txn().unwrap();
    assert_eq!(
        fixture
            .ledger
            .account_balance(&txn, &recipient.public)
            .unwrap(),
        Amount::new(1)
    );
    assert_eq!(
        fixture
            .store
            .pending_get(&txn, &PendingKey::new(recipient.public, send2.hash()))
            .unwrap(),
        Some(PendingInfo::new(genesis_account, Amount::new(2)))
    );
    drop(txn);
    assert_conserved(&fixture);
}

#[test]
fn state_send_and_state_open() {
    let fixture = open_ledger();
    let genesis_account = fixture.ledger.constants.genesis_account;
    let recipient = keys(21);

    let state_send = Block::State(StateBlock::new(
        genesis_account,
        fixture.genesis_hash,
        genesis_account,
        GENESIS_AMOUNT - Amount::new(1),
        Link::from(recipient.public),
        &fixture.genesis_keys.private,
        0,
    ));
    let mut txn = fixture.store.write_txn().unwrap();
    let result = fixture.ledger.process(&mut txn, &state_send).unwrap();
    txn.commit().unwrap();
    assert_eq!(result.code, ProcessResult::Progress);
    assert_eq!(result.state_is_send, Some(true));
    assert_eq!(result.amount, Amount::new(1));
    assert_eq!(result.pending_account, recipient.public);

    {
        let txn = fixture.store.read_txn().unwrap();
        // State heads carry their account in-band: no frontier entry, and
        // the old legacy frontier is gone.
        assert!(fixture
            .store
            .frontier_get(&txn, &state_send.hash())
            .unwrap()
            .is_none());
        assert!(fixture
            .store
            .frontier_get(&txn, &fixture.genesis_hash)
            .unwrap()
            .is_none());
        assert_eq!(
            fixture.ledger.account(&txn, &state_send.hash()).unwrap(),
            genesis_account
        );
    }

    let state_open = Block::State(StateBlock::new(
        recipient.public,
        BlockHash::ZERO,
        recipient.public,
        Amount::new(1),
        Link::from(state_send.hash()),
        &recipient.private,
        0,
    ));
    let mut txn = fixture.store.write_txn().unwrap();
    let result = fixture.ledger.process(&mut txn, &state_open).unwrap();
    txn.commit().unwrap();
    assert_eq!(result.code, ProcessResult::Progress);
    assert_eq!(result.state_is_send, Some(false));

    let txn = fixture.store.read_txn().unwrap();
    assert!(fixture
        .store
        .pending_get(
            &txn,
            &PendingKey::new(recipient.public, state_send.hash())
        )
        .unwrap()
        .is_none());
    assert_eq!(
        fixture.ledger.weight(&txn, &recipient.public).unwrap(),
        Amount::new(1)
    );
    assert_eq!(
        fixture.ledger.weight(&txn, &genesis_account).unwrap(),
        GENESIS_AMOUNT - Amount::new(1)
    );
    drop(txn);
    assert_conserved(&fixture);
}

#[test]
fn state_rollback_cascades_through_state_chains() {
    let fixture = open_ledger();
    let before = snapshot(&fixture);
    let genesis_account = fixture.ledger.constants.genesis_account;
    let recipient = keys(21);

    let state_send = Block::State(StateBlock::new(
        genesis_account,
        fixture.genesis_hash,
        genesis_account,
        GENESIS_AMOUNT - Amount::new(1),
        Link::from(recipient.public),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &state_send), ProcessResult::Progress);
    let state_open = Block::State(StateBlock::new(
        recipient.public,
        BlockHash::ZERO,
        recipient.public,
        Amount::new(1),
        Link::from(state_send.hash()),
        &recipient.private,
        0,
    ));
    assert_eq!(process(&fixture, &state_open), ProcessResult::Progress);

    let mut txn = fixture.store.write_txn().unwrap();
    fixture
        .ledger
        .rollback(&mut txn, &state_send.hash())
        .unwrap();
    txn.commit().unwrap();

    assert_eq!(snapshot(&fixture), before);
    let txn = fixture.store.read_txn().unwrap();
    assert_eq!(
        fixture
            .store
            .frontier_get(&txn, &fixture.genesis_hash)
            .unwrap(),
        Some(genesis_account)
    );
}

#[test]
fn state_blocks_disabled_without_canary() {
    let fixture = open_ledger_with(false);
    let genesis_account = fixture.ledger.constants.genesis_account;
    let state_send = Block::State(StateBlock::new(
        genesis_account,
        fixture.genesis_hash,
        genesis_account,
        GENESIS_AMOUNT - Amount::new(1),
        Link::from(keys(21).public),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(
        process(&fixture, &state_send),
        ProcessResult::StateBlockDisabled
    );
}

#[test]
fn legacy_block_cannot_follow_state_head() {
    let fixture = open_ledger();
    let genesis_account = fixture.ledger.constants.genesis_account;
    let state_change = Block::State(StateBlock::new(
        genesis_account,
        fixture.genesis_hash,
        genesis_account,
        GENESIS_AMOUNT,
        Link::ZERO,
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &state_change), ProcessResult::Progress);

    let legacy = Block::Send(SendBlock::new(
        state_change.hash(),
        keys(12).public,
        GENESIS_AMOUNT - Amount::new(1),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &legacy), ProcessResult::BlockPosition);
}

#[test]
fn outcome_taxonomy_rejections() {
    let fixture = open_ledger();
    let genesis_account = fixture.ledger.constants.genesis_account;
    let stranger = keys(33);

    // Previous unknown entirely.
    let dangling = Block::Send(SendBlock::new(
        BlockHash::from_bytes([0xAA; 32]),
        stranger.public,
        Amount::new(1),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &dangling), ProcessResult::GapPrevious);

    // Signed by the wrong key.
    let forged = Block::Send(SendBlock::new(
        fixture.genesis_hash,
        stranger.public,
        GENESIS_AMOUNT - Amount::new(1),
        &stranger.private,
        0,
    ));
    assert_eq!(process(&fixture, &forged), ProcessResult::BadSignature);

    // Open whose source was never seen.
    let sourceless = Block::Open(OpenBlock::new(
        BlockHash::from_bytes([0xBB; 32]),
        stranger.public,
        stranger.public,
        &stranger.private,
        0,
    ));
    assert_eq!(process(&fixture, &sourceless), ProcessResult::GapSource);

    // Chain-initial state block with nothing to receive.
    let unlinked = Block::State(StateBlock::new(
        stranger.public,
        BlockHash::ZERO,
        stranger.public,
        Amount::new(1),
        Link::ZERO,
        &stranger.private,
        0,
    ));
    assert_eq!(process(&fixture, &unlinked), ProcessResult::GapSource);

    // Pure representative change must not move value.
    let value_moving_change = Block::State(StateBlock::new(
        genesis_account,
        fixture.genesis_hash,
        genesis_account,
        GENESIS_AMOUNT - Amount::new(5),
        Link::ZERO,
        &fixture.genesis_keys.private,
        0,
    ));
    // A balance decrease with a zero link is a send to the zero link.
    assert_eq!(process(&fixture, &value_moving_change), ProcessResult::Progress);
    let mut txn = fixture.store.write_txn().unwrap();
    fixture
        .ledger
        .rollback(&mut txn, &value_moving_change.hash())
        .unwrap();
    txn.commit().unwrap();

    // A balance increase with a zero link has no source: mismatch.
    // (Impossible from genesis; use a sub-account.)
    let (recipient, _, open) = send_and_open(&fixture);
    let inflating = Block::State(StateBlock::new(
        recipient.public,
        open.hash(),
        recipient.public,
        Amount::new(10),
        Link::ZERO,
        &recipient.private,
        0,
    ));
    assert_eq!(process(&fixture, &inflating), ProcessResult::BalanceMismatch);
}

#[test]
fn negative_spend_rejected() {
    let fixture = open_ledger();
    let (_, send, _) = send_and_open(&fixture);
    // Head balance is now GENESIS - 1; claiming more is a negative spend.
    let overdraw = Block::Send(SendBlock::new(
        send.hash(),
        keys(13).public,
        GENESIS_AMOUNT,
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &overdraw), ProcessResult::NegativeSpend);
}

#[test]
fn open_account_mismatch_rejected() {
    let fixture = open_ledger();
    let recipient = keys(14);
    let interloper = keys(15);
    let send = Block::Send(SendBlock::new(
        fixture.genesis_hash,
        recipient.public,
        GENESIS_AMOUNT - Amount::new(1),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &send), ProcessResult::Progress);

    let hijack = Block::Open(OpenBlock::new(
        send.hash(),
        interloper.public,
        interloper.public,
        &interloper.private,
        0,
    ));
    assert_eq!(process(&fixture, &hijack), ProcessResult::AccountMismatch);
}

#[test]
fn receive_from_non_send_rejected() {
    let fixture = open_ledger();
    let (recipient, _, open) = send_and_open(&fixture);
    // The open block itself is not a send; receiving from it is malformed.
    let bogus = Block::Receive(ReceiveBlock::new(
        open.hash(),
        open.hash(),
        &recipient.private,
        0,
    ));
    assert_eq!(process(&fixture, &bogus), ProcessResult::NotReceiveFromSend);
}

#[test]
fn state_receive_with_wrong_amount_rejected() {
    let fixture = open_ledger();
    let recipient = keys(16);
    let send = Block::Send(SendBlock::new(
        fixture.genesis_hash,
        recipient.public,
        GENESIS_AMOUNT - Amount::new(5),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &send), ProcessResult::Progress);

    // Pending amount is 5, but this open claims 4.
    let short = Block::State(StateBlock::new(
        recipient.public,
        BlockHash::ZERO,
        recipient.public,
        Amount::new(4),
        Link::from(send.hash()),
        &recipient.private,
        0,
    ));
    assert_eq!(process(&fixture, &short), ProcessResult::BalanceMismatch);
}

#[test]
fn change_block_moves_weight_and_rolls_back() {
    let fixture = open_ledger();
    let genesis_account = fixture.ledger.constants.genesis_account;
    let delegate = keys(17);

    let change = Block::Change(ChangeBlock::new(
        fixture.genesis_hash,
        delegate.public,
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &change), ProcessResult::Progress);

    {
        let txn = fixture.store.read_txn().unwrap();
        assert_eq!(
            fixture.ledger.weight(&txn, &delegate.public).unwrap(),
            GENESIS_AMOUNT
        );
        assert_eq!(
            fixture.ledger.weight(&txn, &genesis_account).unwrap(),
            Amount::ZERO
        );
        assert_eq!(
            fixture.ledger.representative(&txn, &change.hash()).unwrap(),
            change.hash()
        );
        assert_eq!(
            fixture.ledger.amount(&txn, &change.hash()).unwrap(),
            Amount::ZERO
        );
    }

    let mut txn = fixture.store.write_txn().unwrap();
    fixture.ledger.rollback(&mut txn, &change.hash()).unwrap();
    txn.commit().unwrap();

    let txn = fixture.store.read_txn().unwrap();
    assert_eq!(
        fixture.ledger.weight(&txn, &genesis_account).unwrap(),
        GENESIS_AMOUNT
    );
    assert_eq!(
        fixture.ledger.weight(&txn, &delegate.public).unwrap(),
        Amount::ZERO
    );
}

#[test]
fn blocks_info_written_every_32nd_block() {
    let fixture = open_ledger();
    let genesis_account = fixture.ledger.constants.genesis_account;
    let sink = keys(18);

    // The genesis open is block 1; 31 sends make the head the 32nd block.
    let mut head = fixture.genesis_hash;
    let mut balance = GENESIS_AMOUNT;
    let mut last = None;
    for _ in 0..31 {
        balance = balance - Amount::new(1);
        let send = Block::Send(SendBlock::new(
            head,
            sink.public,
            balance,
            &fixture.genesis_keys.private,
            0,
        ));
        assert_eq!(process(&fixture, &send), ProcessResult::Progress);
        head = send.hash();
        last = Some(send);
    }

    {
        let txn = fixture.store.read_txn().unwrap();
        let info = fixture
            .store
            .account_get(&txn, &genesis_account)
            .unwrap()
            .unwrap();
        assert_eq!(info.block_count, 32);
        let entry = fixture.store.block_info_get(&txn, &head).unwrap().unwrap();
        assert_eq!(entry.account, genesis_account);
        assert_eq!(entry.balance, balance);
        // The snapshot short-circuits the account walk from the chain start.
        assert_eq!(
            fixture.ledger.account(&txn, &fixture.genesis_hash).unwrap(),
            genesis_account
        );
    }

    let mut txn = fixture.store.write_txn().unwrap();
    fixture
        .ledger
        .rollback(&mut txn, &last.unwrap().hash())
        .unwrap();
    txn.commit().unwrap();

    let txn = fixture.store.read_txn().unwrap();
    assert!(!fixture.store.block_info_exists(&txn, &head).unwrap());
    let info = fixture
        .store
        .account_get(&txn, &genesis_account)
        .unwrap()
        .unwrap();
    assert_eq!(info.block_count, 31);
}

#[test]
fn apply_then_rollback_is_identity() {
    let fixture = open_ledger();
    let genesis_account = fixture.ledger.constants.genesis_account;

    // Work through legacy and state blocks alike, then unwind everything.
    let (recipient, send1, _open) = send_and_open(&fixture);
    let txn = fixture.store.read_txn().unwrap();
    let genesis_head = fixture
        .ledger
        .latest(&txn, &genesis_account)
        .unwrap()
        .unwrap();
    drop(txn);
    let baseline = snapshot(&fixture);

    let send2 = Block::Send(SendBlock::new(
        genesis_head,
        recipient.public,
        GENESIS_AMOUNT - Amount::new(4),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &send2), ProcessResult::Progress);
    let receive = Block::Receive(ReceiveBlock::new(
        fixture
            .ledger
            .latest(&fixture.store.read_txn().unwrap(), &recipient.public)
            .unwrap()
            .unwrap(),
        send2.hash(),
        &recipient.private,
        0,
    ));
    assert_eq!(process(&fixture, &receive), ProcessResult::Progress);
    let state_change = Block::State(StateBlock::new(
        recipient.public,
        receive.hash(),
        genesis_account,
        Amount::new(4),
        Link::ZERO,
        &recipient.private,
        0,
    ));
    assert_eq!(process(&fixture, &state_change), ProcessResult::Progress);
    assert_conserved(&fixture);

    let mut txn = fixture.store.write_txn().unwrap();
    fixture.ledger.rollback(&mut txn, &send2.hash()).unwrap();
    txn.commit().unwrap();

    assert_eq!(snapshot(&fixture), baseline);
    assert_conserved(&fixture);
    let _ = send1;
}

#[test]
fn tally_tie_breaks_by_descending_hash() {
    let mut fixture = open_ledger();
    let alice = keys(41);
    let bob = keys(42);
    let weight = Amount::new(1_000_000);
    fixture.ledger.bootstrap_weights.insert(alice.public, weight);
    fixture.ledger.bootstrap_weights.insert(bob.public, weight);
    fixture.ledger.bootstrap_weight_max_blocks = u64::MAX;

    // Two competing sends with the same root.
    let first = Block::Send(SendBlock::new(
        fixture.genesis_hash,
        keys(43).public,
        GENESIS_AMOUNT - Amount::new(1),
        &fixture.genesis_keys.private,
        0,
    ));
    let second = Block::Send(SendBlock::new(
        fixture.genesis_hash,
        keys(44).public,
        GENESIS_AMOUNT - Amount::new(2),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(first.root(), second.root());

    let mut votes = Votes::new(Arc::new(first.clone()));
    votes.vote(&Vote::new(alice.public, &alice.private, 1, first.clone()));
    votes.vote(&Vote::new(bob.public, &bob.private, 1, second.clone()));

    let txn = fixture.store.read_txn().unwrap();
    let tally = fixture.ledger.tally(&txn, &votes).unwrap();
    assert_eq!(tally.len(), 2);
    assert_eq!(tally[0].0, weight);
    assert_eq!(tally[1].0, weight);

    let expected = if first.hash() > second.hash() {
        first.hash()
    } else {
        second.hash()
    };
    let (winning_weight, winner) = fixture.ledger.winner(&txn, &votes).unwrap();
    assert_eq!(winning_weight, weight);
    assert_eq!(winner.hash(), expected);
}

#[test]
fn weight_switches_to_ledger_after_bootstrap_cutoff() {
    let mut fixture = open_ledger();
    let phantom = keys(45);
    fixture
        .ledger
        .bootstrap_weights
        .insert(phantom.public, Amount::new(7));
    // Cutoff below the current block count: the override never applies.
    fixture.ledger.bootstrap_weight_max_blocks = 1;

    let txn = fixture.store.read_txn().unwrap();
    assert_eq!(
        fixture.ledger.weight(&txn, &phantom.public).unwrap(),
        Amount::ZERO
    );
}

#[test]
fn successor_and_roots() {
    let fixture = open_ledger();
    let genesis_account = fixture.ledger.constants.genesis_account;
    let (recipient, send, _open) = send_and_open(&fixture);

    let txn = fixture.store.read_txn().unwrap();
    // The genesis account's "successor" is its open block.
    let from_account = fixture
        .ledger
        .successor(&txn, &BlockHash::from(genesis_account))
        .unwrap()
        .unwrap();
    assert_eq!(from_account.hash(), fixture.genesis_hash);
    // A block's successor follows the chain.
    let from_block = fixture
        .ledger
        .successor(&txn, &fixture.genesis_hash)
        .unwrap()
        .unwrap();
    assert_eq!(from_block.hash(), send.hash());

    assert_eq!(
        fixture.ledger.latest_root(&txn, &keys(46).public).unwrap(),
        BlockHash::from(keys(46).public)
    );
    assert_eq!(
        fixture.ledger.latest_root(&txn, &recipient.public).unwrap(),
        fixture.ledger.latest(&txn, &recipient.public).unwrap().unwrap()
    );
}

#[test]
fn block_destination_and_source_resolve_state_direction() {
    let fixture = open_ledger();
    let genesis_account = fixture.ledger.constants.genesis_account;
    let recipient = keys(47);

    let state_send = Block::State(StateBlock::new(
        genesis_account,
        fixture.genesis_hash,
        genesis_account,
        GENESIS_AMOUNT - Amount::new(1),
        Link::from(recipient.public),
        &fixture.genesis_keys.private,
        0,
    ));
    assert_eq!(process(&fixture, &state_send), ProcessResult::Progress);

    let txn = fixture.store.read_txn().unwrap();
    assert_eq!(
        fixture
            .ledger
            .block_destination(&txn, &state_send)
            .unwrap(),
        recipient.public
    );
    assert_eq!(
        fixture.ledger.block_source(&txn, &state_send).unwrap(),
        BlockHash::ZERO
    );
    drop(txn);

    let state_open = Block::State(StateBlock::new(
        recipient.public,
        BlockHash::ZERO,
        recipient.public,
        Amount::new(1),
        Link::from(state_send.hash()),
        &recipient.private,
        0,
    ));
    assert_eq!(process(&fixture, &state_open), ProcessResult::Progress);

    let txn = fixture.store.read_txn().unwrap();
    assert_eq!(
        fixture.ledger.block_source(&txn, &state_open).unwrap(),
        state_send.hash()
    );
    assert_eq!(
        fixture
            .ledger
            .block_destination(&txn, &state_open)
            .unwrap(),
        Account::ZERO
    );
}
