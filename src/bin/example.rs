use std::time::Instant;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use stockyard::prelude::*;

/// Drives one market day end to end: register wallets, declare a lot,
/// open a forward contract, collect bids, adjudicate, and print the
/// resulting balances, standings, and chain.
fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let start = Instant::now();

    let mut accounts = AccountRegistry::new();
    let mut batches = BatchRegistry::new();
    let mut ledger = Ledger::new();
    let mut book = FuturesBook::new();
    let mut tally = MiningTally::new();

    accounts.register("la-esperanza", Decimal::ZERO)?;
    accounts.register("frigorifico-sur", Decimal::from(1000))?;
    accounts.register("carnes-del-plata", Decimal::from(1000))?;
    accounts.register("export-andes", Decimal::from(1000))?;

    let lot = batches.record("la-esperanza", 100, "Angus", "Santa Elena");
    let delivery = NaiveDate::from_ymd_opt(2026, 11, 15)
        .context("delivery date out of range")?;
    let contract =
        book.open_contract("la-esperanza", lot, 50, delivery, &batches)?;

    book.submit_bid(contract, "frigorifico-sur", Decimal::from(200), &accounts)?;
    book.submit_bid(
        contract,
        "carnes-del-plata",
        Decimal::from(300),
        &accounts,
    )?;

    let winner = book.adjudicate(contract, &mut accounts, &mut ledger)?.clone();
    println!(
        "{contract} adjudicated to {} at {}",
        winner.bidder, winner.amount
    );

    // Cosmetic mining round.
    let mut rng = rand::thread_rng();
    for _ in 0..5 {
        tally.credit_random(&mut rng, &accounts);
    }

    println!("\nAdjudicated contracts");
    for (id, c) in book.iter() {
        if let Some(bid) = c.winner() {
            println!(
                "  {id} {} -> {} at {} (delivery {})",
                c.producer, bid.bidder, bid.amount, c.delivery
            );
        }
    }

    println!("\nMiner standings");
    for (id, count) in tally.standings() {
        println!("  {id}: {count}");
    }

    println!("\nWallets");
    for account in accounts.iter() {
        println!("  {}: {}", account.id, account.balance);
    }

    ledger.verify().context("chain audit failed")?;
    println!("\nChain ({} blocks, audit passed)", ledger.len());
    for block in ledger.blocks() {
        println!("  #{} nonce={} {}", block.index, block.nonce, block.hash);
    }

    println!("\nElapsed time: {:.4} secs", start.elapsed().as_secs_f64());

    Ok(())
}
