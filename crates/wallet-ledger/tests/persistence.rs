use wallet_ledger::{
    InMemoryStore, JsonFileStore, KeyExport, KeyPrimitives, LedgerError, MoneroPrimitives,
    RawWallet, Transaction, TxInput, TxOutput, Wallet, WalletKeys, WalletOptions,
};

fn tx_key(seed: u8) -> [u8; 32] {
    MoneroPrimitives::default()
        .secret_to_public(&[seed; 32])
        .unwrap()
}

fn populated(keys: WalletKeys) -> Wallet {
    let mut w = Wallet::new(keys, MoneroPrimitives::default());
    let mut receive = Transaction::new([1u8; 32], tx_key(1));
    receive.block_height = 10;
    receive.fully_checked = true;
    receive.payment_id = Some("deadbeef".into());
    receive.outs.push(TxOutput::new(10, 0, 100));
    receive.outs.push(TxOutput::new(3, 1, 101));
    w.add(receive);

    let mut fusion = Transaction::new([2u8; 32], tx_key(2));
    fusion.fusion = true;
    fusion.block_height = 12;
    fusion.outs.push(TxOutput::new(1, 0, 0));
    w.add(fusion);

    w.set_last_height(42);
    w.set_creation_height(5);
    w.set_options(WalletOptions {
        check_miner_tx: true,
        read_speed: 25,
    });
    w
}

fn spend_keys() -> WalletKeys {
    WalletKeys::from_secrets(&MoneroPrimitives::default(), [7u8; 32], [5u8; 32]).unwrap()
}

fn assert_equivalent(a: &Wallet, b: &Wallet) {
    assert_eq!(a.transactions(), b.transactions());
    assert_eq!(a.last_height(), b.last_height());
    assert_eq!(a.creation_height(), b.creation_height());
    assert_eq!(a.options(), b.options());
    assert_eq!(a.keys().public, b.keys().public);
    assert_eq!(a.keys().view_secret(), b.keys().view_secret());
    assert_eq!(a.keys().spend_secret(), b.keys().spend_secret());
}

#[test]
fn full_key_export_round_trips() {
    let mut w = populated(spend_keys());
    w.reconcile();
    let raw = w.export_to_raw(true).unwrap();
    assert!(matches!(raw.keys, KeyExport::Full(_)));

    let back = Wallet::load_from_raw(&raw, true, MoneroPrimitives::default()).unwrap();
    assert_equivalent(&w, &back);
    assert!(!back.has_pending_changes());
}

#[test]
fn reduced_export_round_trips_for_both_wallet_kinds() {
    let w = populated(spend_keys());
    let raw = w.export_to_raw(false).unwrap();
    assert!(matches!(raw.keys, KeyExport::Secrets { .. }));
    let back = Wallet::load_from_raw(&raw, false, MoneroPrimitives::default()).unwrap();
    assert_eq!(back.keys().public, w.keys().public);

    let view_only = populated(WalletKeys::view_only([5u8; 32], spend_keys().public));
    let raw = view_only.export_to_raw(false).unwrap();
    assert!(matches!(raw.keys, KeyExport::ViewOnly { .. }));
    let back = Wallet::load_from_raw(&raw, false, MoneroPrimitives::default()).unwrap();
    assert!(back.is_view_only());
    assert_equivalent(&view_only, &back);
}

#[test]
fn loading_reconciles_unprocessed_ledger() {
    let prims = MoneroPrimitives::default();
    let mut w = populated(spend_keys());
    let derivation = prims.derive(&tx_key(1), w.keys().view_secret()).unwrap();
    let ki = prims
        .key_image(
            &derivation,
            0,
            &w.keys().public.spend,
            w.keys().spend_secret().unwrap(),
        )
        .unwrap();

    let mut spend = Transaction::new([3u8; 32], tx_key(3));
    spend.block_height = 20;
    spend.fully_checked = true;
    spend.ins.push(TxInput::unresolved(ki));
    spend.ins.push(TxInput::unresolved([0x55; 32]));
    w.add(spend);
    let raw = w.export_to_raw(true).unwrap();

    let loaded = Wallet::load_from_raw(&raw, true, prims).unwrap();
    let spent = loaded.find_by_tx_pub_key(&tx_key(3)).unwrap();
    assert_eq!(spent.ins.len(), 1);
    assert_eq!(spent.ins[0].amount, Some(10));
    assert!(loaded.has_pending_changes());
    assert_eq!(loaded.amount(), 3);
}

#[test]
fn raw_wallet_json_uses_camel_case_layout() {
    let w = populated(spend_keys());
    let json = serde_json::to_value(w.export_to_raw(false).unwrap()).unwrap();
    assert_eq!(json["lastHeight"], 42);
    assert_eq!(json["creationHeight"], 5);
    assert_eq!(json["nonce"], "");
    assert_eq!(json["options"]["readSpeed"], 25);
    assert_eq!(json["transactions"][0]["outs"][1]["globalIndex"], 101);
    assert!(json["keys"]["secrets"]["spend"].is_string());

    let back: RawWallet = serde_json::from_value(json).unwrap();
    assert_eq!(back.last_height, 42);
}

#[test]
fn stores_persist_and_clear_pending_changes() {
    let store = InMemoryStore::new();
    let mut w = populated(spend_keys());
    w.reconcile();
    assert!(w.has_pending_changes());
    w.save(&store, false).unwrap();
    assert!(!w.has_pending_changes());

    let back = Wallet::open(&store, false, MoneroPrimitives::default())
        .unwrap()
        .unwrap();
    assert_eq!(back.transactions().len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let file = JsonFileStore::new(dir.path().join("wallet.json"));
    assert!(Wallet::open(&file, true, MoneroPrimitives::default())
        .unwrap()
        .is_none());
    w.save(&file, true).unwrap();
    let back = Wallet::open(&file, true, MoneroPrimitives::default())
        .unwrap()
        .unwrap();
    assert_equivalent(&w, &back);
}

#[test]
fn repeated_tx_pub_key_collapses_on_load() {
    let mut w = Wallet::new(spend_keys(), MoneroPrimitives::default());
    let mut receive = Transaction::new([1u8; 32], tx_key(1));
    receive.block_height = 10;
    receive.fully_checked = true;
    receive.outs.push(TxOutput::new(10, 0, 100));
    w.add(receive);
    let mut other = Transaction::new([6u8; 32], tx_key(6));
    other.fully_checked = true;
    other.outs.push(TxOutput::new(1, 0, 0));
    w.add(other);

    let mut raw = w.export_to_raw(true).unwrap();
    let mut copy = raw.transactions[0].clone();
    copy.hash = hex::encode([9u8; 32]);
    raw.transactions.push(copy);

    let mut loaded = Wallet::load_from_raw(&raw, true, MoneroPrimitives::default()).unwrap();
    assert_eq!(loaded.transactions().len(), 2);
    // Last occurrence wins, first position is kept.
    assert_eq!(loaded.transactions()[0].hash, [9u8; 32]);
    assert_eq!(loaded.transactions()[1].tx_pub_key, tx_key(6));
    assert_eq!(loaded.amount(), 11);
    assert!(loaded.has_pending_changes());

    let mut replacement = Transaction::new([8u8; 32], tx_key(1));
    replacement.fully_checked = true;
    replacement.outs.push(TxOutput::new(10, 0, 100));
    assert!(loaded.add_new(replacement, true));
    let matching = loaded
        .transactions()
        .iter()
        .filter(|tx| tx.tx_pub_key == tx_key(1))
        .count();
    assert_eq!(matching, 1);
    assert_eq!(loaded.amount(), 11);
}

#[test]
fn structurally_broken_raw_wallet_fails_to_load() {
    let w = populated(spend_keys());

    let mut bad_hash = w.export_to_raw(false).unwrap();
    bad_hash.transactions[0].hash = "not hex".into();
    let err = Wallet::load_from_raw(&bad_hash, false, MoneroPrimitives::default()).unwrap_err();
    assert!(
        matches!(err, LedgerError::Malformed { field: "hash", .. }),
        "unexpected error: {err}"
    );

    let view_only = populated(WalletKeys::view_only([5u8; 32], spend_keys().public));
    let mut bad_key = view_only.export_to_raw(false).unwrap();
    if let KeyExport::ViewOnly { view_secret, .. } = &mut bad_key.keys {
        *view_secret = hex::encode([5u8; 16]);
    }
    let err = Wallet::load_from_raw(&bad_key, false, MoneroPrimitives::default()).unwrap_err();
    assert!(
        matches!(err, LedgerError::Malformed { field: "viewSecret", .. }),
        "unexpected error: {err}"
    );
}
