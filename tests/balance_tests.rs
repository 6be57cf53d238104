// Ledger state-transition tests: applying transactions, confirming blocks,
// and the coin-set invariants that must hold after every step.

use std::collections::HashSet;
use rust_decimal::Decimal;
use coinledger::{
    registry::{GAS_ASSET_ID, NEO_ASSET_ID},
    AssetBalance, AssetBalanceSnapshot, Balance, Coin, LedgerError, LedgerTx, Transaction, TxId, TxInput, TxOutput,
};

fn out(asset_id: &str, value: i64) -> TxOutput {
    TxOutput { asset_id: asset_id.to_string(), value: Decimal::new(value, 0), script_hash: "recipient".into() }
}

fn spend_of(tx: &Transaction, index: u32) -> TxInput {
    TxInput { prev_hash: tx.hash(), prev_index: index }
}

fn assert_consistent(asset: &AssetBalance) {
    let ids = |coins: &[Coin]| coins.iter().map(|c| (c.txid, c.index)).collect::<HashSet<_>>();
    let (u, s, p) = (ids(asset.unspent()), ids(asset.spent()), ids(asset.unconfirmed()));
    assert!(u.is_disjoint(&s), "unspent and spent overlap");
    assert!(u.is_disjoint(&p), "unspent and unconfirmed overlap");
    assert!(s.is_disjoint(&p), "spent and unconfirmed overlap");
    let sum: Decimal = asset.unspent().iter().map(|c| c.value).sum();
    assert_eq!(asset.balance(), sum, "balance must equal the unspent sum");
}

fn assert_all_consistent(balance: &Balance) {
    for asset in balance.assets().values() {
        assert_consistent(asset);
    }
}

#[test]
fn test_receive_confirm_spend_lifecycle() {
    println!("🧪 Testing pending → confirmed → spent lifecycle...");

    // Scenario A: pending receive
    let mut balance = Balance::default();
    let receive = Transaction::new(vec![], vec![out(GAS_ASSET_ID, 10)]);
    balance.apply_tx(&receive, false).expect("apply pending tx");

    assert!(balance.tokens().is_empty(), "tokens must be unaffected");
    let gas = balance.asset("GAS").expect("GAS asset created on demand");
    assert_eq!(gas.unconfirmed().len(), 1);
    assert_eq!(gas.unconfirmed()[0].value, Decimal::new(10, 0));
    assert_eq!(gas.unconfirmed()[0].txid, receive.hash());
    assert_eq!(gas.unconfirmed()[0].index, 0);
    assert!(gas.unspent().is_empty());
    assert_eq!(gas.balance(), Decimal::ZERO);
    assert_eq!(gas.unconfirmed_total(), Decimal::new(10, 0));
    assert_all_consistent(&balance);

    // Scenario B: block lands
    balance.confirm();
    let gas = balance.asset("GAS").unwrap();
    assert_eq!(gas.unspent().len(), 1);
    assert!(gas.unconfirmed().is_empty());
    assert_eq!(gas.balance(), Decimal::new(10, 0));
    assert_all_consistent(&balance);

    // Scenario C: the coin is spent by a confirmed tx
    let spend = Transaction::new(vec![spend_of(&receive, 0)], vec![]);
    balance.apply_tx(&spend, true).expect("apply spend");
    let gas = balance.asset("GAS").unwrap();
    assert!(gas.unspent().is_empty());
    assert_eq!(gas.spent().len(), 1);
    assert!(gas.spent()[0].matches_outpoint(&receive.hash(), 0));
    assert_eq!(gas.balance(), Decimal::ZERO);
    assert_all_consistent(&balance);

    println!("✅ Lifecycle test passed");
}

#[test]
fn test_confirmed_output_replaces_pending_copy() {
    let mut balance = Balance::default();
    let tx = Transaction::new(vec![], vec![out(NEO_ASSET_ID, 3), out(GAS_ASSET_ID, 2)]);

    balance.apply_tx(&tx, false).unwrap();
    balance.apply_tx(&tx, true).unwrap();

    let neo = balance.asset("NEO").unwrap();
    let gas = balance.asset("GAS").unwrap();
    assert!(neo.unconfirmed().is_empty(), "pending NEO copy must be dropped");
    assert!(gas.unconfirmed().is_empty(), "pending GAS copy must be dropped");
    assert_eq!(neo.unspent().len(), 1);
    assert_eq!(gas.unspent().len(), 1);
    assert_eq!(gas.unspent()[0].index, 1, "output index is positional across assets");
    assert_eq!(neo.balance(), Decimal::new(3, 0));
    assert_all_consistent(&balance);
}

#[test]
fn test_spend_phase_precedes_receive_phase() {
    let mut balance = Balance::default();
    let funding = Transaction::new(vec![], vec![out(GAS_ASSET_ID, 7)]);
    balance.apply_tx(&funding, true).unwrap();

    // Spends the funding coin and pays change back in the same tx.
    let payment = Transaction::new(vec![spend_of(&funding, 0)], vec![out(GAS_ASSET_ID, 4)]);
    balance.apply_tx(&payment, true).unwrap();

    let gas = balance.asset("GAS").unwrap();
    assert_eq!(gas.spent().len(), 1);
    assert_eq!(gas.unspent().len(), 1);
    assert!(gas.unspent()[0].matches_outpoint(&payment.hash(), 0));
    assert_eq!(gas.balance(), Decimal::new(4, 0));
    assert_all_consistent(&balance);
}

#[test]
fn test_foreign_inputs_are_ignored() {
    let mut balance = Balance::default();
    let funding = Transaction::new(vec![], vec![out(GAS_ASSET_ID, 5)]);
    balance.apply_tx(&funding, true).unwrap();
    let before = balance.clone();

    let foreign = Transaction::new(
        vec![TxInput { prev_hash: TxId([9; 32]), prev_index: 0 }, spend_of(&funding, 1)],
        vec![],
    );
    balance.apply_tx(&foreign, true).expect("unowned inputs are not errors");
    assert_eq!(balance, before);
}

#[test]
fn test_unknown_asset_fails_without_mutation() {
    let mut balance = Balance::default();
    let funding = Transaction::new(vec![], vec![out(GAS_ASSET_ID, 5)]);
    balance.apply_tx(&funding, true).unwrap();
    let before = balance.clone();

    let bad = Transaction::new(vec![spend_of(&funding, 0)], vec![out(&"ab".repeat(32), 1)]);
    match balance.apply_tx(&bad, true) {
        Err(LedgerError::UnknownAsset(id)) => assert_eq!(id, "ab".repeat(32)),
        other => panic!("expected UnknownAsset, got {:?}", other.map(|_| ())),
    }
    assert_eq!(balance, before, "no input may be spent when an output is rejected");
}

#[test]
fn test_empty_transaction_is_noop() {
    let mut balance = Balance::new("AKaddress", "TestNet");
    balance.add_asset("neo", None);
    let before = balance.clone();
    balance.apply_tx(&Transaction::default(), true).unwrap();
    balance.apply_tx(&Transaction::default(), false).unwrap();
    assert_eq!(balance, before);
}

#[test]
fn test_confirm_after_drain_is_idempotent() {
    let mut balance = Balance::default();
    balance.apply_tx(&Transaction::new(vec![], vec![out(GAS_ASSET_ID, 1)]), false).unwrap();
    balance.apply_tx(&Transaction::new(vec![], vec![out(GAS_ASSET_ID, 2)]).with_nonce(1), false).unwrap();

    balance.confirm();
    let once = balance.clone();
    balance.confirm();
    assert_eq!(balance, once);

    let gas = balance.asset("GAS").unwrap();
    assert_eq!(gas.unspent().iter().map(|c| c.value).collect::<Vec<_>>(), vec![Decimal::new(1, 0), Decimal::new(2, 0)]);
    assert_eq!(gas.balance(), Decimal::new(3, 0));
}

#[test]
fn test_spend_uses_first_asset_in_symbol_order() {
    // A malformed wallet holding the same coin under two symbols: only the
    // first listed asset gives it up.
    let txid = TxId([4; 32]);
    let coin = Coin::new(txid, 0, Decimal::new(1, 0));
    let snap = AssetBalanceSnapshot { unspent: vec![coin], ..Default::default() };

    let mut balance = Balance::default();
    balance.add_asset("NEO", Some(snap.clone())).add_asset("GAS", Some(snap));
    balance
        .apply_tx(&Transaction::new(vec![TxInput { prev_hash: txid, prev_index: 0 }], vec![]), true)
        .unwrap();

    assert_eq!(balance.asset("NEO").unwrap().spent().len(), 1);
    assert_eq!(balance.asset("GAS").unwrap().unspent().len(), 1);
}

#[test]
fn test_add_asset_twice_keeps_latest() {
    // Scenario E
    let mut balance = Balance::default();
    let first = AssetBalanceSnapshot {
        unspent: vec![Coin::new(TxId([1; 32]), 0, Decimal::new(1, 0))],
        ..Default::default()
    };
    let second = AssetBalanceSnapshot {
        unspent: vec![Coin::new(TxId([2; 32]), 0, Decimal::new(8, 0))],
        ..Default::default()
    };
    balance.add_asset("gas", Some(first)).add_asset("Gas", Some(second));

    assert_eq!(balance.asset_symbols(), &["GAS".to_string(), "GAS".to_string()]);
    assert_eq!(balance.assets().len(), 1);
    assert_eq!(balance.asset("gas").unwrap().balance(), Decimal::new(8, 0));
}

#[test]
fn test_add_token_normalizes_and_appends() {
    let mut balance = Balance::default();
    balance.add_token("rpx", 0).add_token("RPX", Decimal::new(125, 1)).add_token("dbc", 3u64);

    assert_eq!(balance.token_symbols(), &["RPX".to_string(), "RPX".to_string(), "DBC".to_string()]);
    assert_eq!(balance.token("rpx"), Some(Decimal::new(125, 1)));
    assert_eq!(balance.token("DBC"), Some(Decimal::new(3, 0)));
    assert_eq!(balance.token("NOPE"), None);
}

#[test]
fn test_snapshot_balance_field_is_recomputed() {
    let snap = AssetBalanceSnapshot {
        balance: Decimal::new(999, 0),
        unspent: vec![
            Coin::new(TxId([1; 32]), 0, Decimal::new(15, 1)),
            Coin::new(TxId([1; 32]), 1, Decimal::new(25, 1)),
        ],
        ..Default::default()
    };
    let asset = AssetBalance::from_snapshot(snap);
    assert_eq!(asset.balance(), Decimal::new(4, 0));
    assert_consistent(&asset);
}
