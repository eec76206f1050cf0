//! End-to-end market day at the default sealing difficulty.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use stockyard::prelude::*;

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

#[test]
fn full_market_day_settles_and_seals() {
    let mut accounts = AccountRegistry::new();
    let mut batches = BatchRegistry::new();
    let mut ledger = Ledger::new();
    let mut book = FuturesBook::new();

    accounts.register("P", dec(0)).unwrap();
    accounts.register("B1", dec(1000)).unwrap();
    accounts.register("B2", dec(1000)).unwrap();
    accounts.register("B3", dec(1000)).unwrap();

    let lot = batches.record("P", 100, "Angus", "Farm1");
    let delivery = NaiveDate::from_ymd_opt(2026, 11, 15).unwrap();
    let contract = book
        .open_contract("P", lot, 50, delivery, &batches)
        .unwrap();

    book.submit_bid(contract, "B1", dec(200), &accounts).unwrap();
    book.submit_bid(contract, "B2", dec(300), &accounts).unwrap();

    let winner = book
        .adjudicate(contract, &mut accounts, &mut ledger)
        .unwrap()
        .clone();
    assert_eq!(winner.bidder, "B2");
    assert_eq!(winner.amount, dec(300));

    // Winner pays 300 and receives the 10% bonus; the producer takes 90%.
    assert_eq!(accounts.balance("B2"), Some(dec(730)));
    assert_eq!(accounts.balance("P"), Some(dec(270)));
    assert_eq!(accounts.balance("B1"), Some(dec(1000)));
    assert_eq!(accounts.balance("B3"), Some(dec(1000)));

    // Genesis plus exactly one settlement block, sealed at the default
    // four-zero prefix and linked to genesis.
    assert_eq!(ledger.len(), 2);
    let sealed = ledger.last_block();
    assert!(sealed.hash.starts_with("0000"));
    assert_eq!(sealed.previous_hash, ledger.blocks()[0].hash);
    assert_eq!(sealed.payload["winner"], "B2");
    ledger.verify().unwrap();

    // Re-adjudication is rejected with no further block or transfer.
    assert!(matches!(
        book.adjudicate(contract, &mut accounts, &mut ledger),
        Err(MarketError::ContractAlreadyAdjudicated(_))
    ));
    assert_eq!(ledger.len(), 2);
    assert_eq!(accounts.balance("B2"), Some(dec(730)));
    assert_eq!(accounts.balance("P"), Some(dec(270)));
}
