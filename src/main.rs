//! Virtual AMM ledger simulation.
//!
//! Walks a deployment through trading, a full round trip, shutdown and
//! archival, and an operator price reset.

use rust_decimal_macros::dec;
use vamm_ledger::*;

const ALICE: AccountId = AccountId(101);
const BOB: AccountId = AccountId(102);
const ETH: MarketId = MarketId(1);

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    println!("Virtual AMM Perpetual Ledger Simulation");
    println!("Constant Product Curve, Virtual Reserves, Token Owned Positions\n");

    scenario_1_basic_trading();
    scenario_2_round_trip();
    scenario_3_shutdown_and_archive();
    scenario_4_reserve_adjustment();

    println!("\nAll simulations completed successfully.");
}

fn deploy() -> Deployment {
    let config = ProtocolConfig::from_env().unwrap_or_default();
    let mut deployment = Deployment::from_config(config).unwrap();
    deployment.bootstrap().unwrap();
    deployment.set_time(Timestamp::now());
    for trader in [ALICE, BOB] {
        deployment
            .ledger
            .vault_mut()
            .fund(trader, Wad::from_decimal(dec!(10000)).unwrap())
            .unwrap();
    }
    deployment
}

fn wad(value: rust_decimal::Decimal) -> Wad {
    Wad::from_decimal(value).unwrap()
}

/// Longs push the price up, shorts push it down.
fn scenario_1_basic_trading() {
    println!("Scenario 1: Basic Trading\n");

    let mut d = deploy();
    let seed = d.config.market(ETH).unwrap().clone();
    println!("  {} seeded with {} base / {} asset", seed.symbol, seed.reserve_base, seed.reserve_asset);
    println!("  Mark price: {}\n", d.ledger.get_mark_price(ETH).unwrap());

    let quote = d.ledger.preview_open_position(ETH, wad(dec!(100)), Side::Long).unwrap();
    println!("  Preview: 100 long buys {} @ {}", quote.asset_amount, quote.entry_price);

    let alice_id = d.ledger.open_position(ALICE, ETH, wad(dec!(100)), Side::Long).unwrap();
    let alice = d.ledger.get_position(alice_id).unwrap();
    println!("  Alice opens {}: {} long, size {}", alice.id, alice.collateral, alice.size);
    println!("  Mark price now: {}", d.ledger.get_mark_price(ETH).unwrap());

    let bob_id = d.ledger.open_position(BOB, ETH, wad(dec!(250)), Side::Short).unwrap();
    let bob = d.ledger.get_position(bob_id).unwrap();
    println!("  Bob opens {}: {} short, size {}", bob.id, bob.collateral, bob.size);
    println!("  Mark price now: {}\n", d.ledger.get_mark_price(ETH).unwrap());

    let overview = market_overview(&d.authority, &d.ledger, ETH).unwrap();
    println!(
        "  Market: {} ({:?}), {} open positions, vault holds {}",
        overview.lifecycle_status,
        overview.ledger_status,
        overview.open_positions,
        d.ledger.vault().custody()
    );
    println!();
}

/// Open and immediately close: only rounding dust stays in the pool.
fn scenario_2_round_trip() {
    println!("Scenario 2: Round Trip\n");

    let mut d = deploy();
    let before = d.ledger.get_market(ETH).unwrap().clone();

    for side in [Side::Long, Side::Short] {
        let id = d.ledger.open_position(ALICE, ETH, wad(dec!(500)), side).unwrap();
        let receipt = d.ledger.close_position(ALICE, id).unwrap();
        println!("  {} 500: pnl {}, payout {}", side, receipt.pnl, receipt.payout);
    }

    let after = d.ledger.get_market(ETH).unwrap();
    println!("  Reserves before: {} / {}", before.reserve_base, before.reserve_asset);
    println!("  Reserves after:  {} / {}", after.reserve_base, after.reserve_asset);
    println!("  Product kept: {}", after.invariant() >= before.invariant());
    println!("  Alice wallet: {}\n", d.ledger.vault().balance_of(ALICE));
}

/// Shutdown blocks opens, settle freezes, archive waits for the last close.
fn scenario_3_shutdown_and_archive() {
    println!("Scenario 3: Shutdown and Archival\n");

    let mut d = deploy();
    let operator = d.config.operator;
    let id = d.ledger.open_position(ALICE, ETH, wad(dec!(100)), Side::Long).unwrap();

    d.authority.start_shutdown_process(operator, &mut d.ledger, ETH).unwrap();
    let blocked = d.ledger.open_position(BOB, ETH, wad(dec!(100)), Side::Long);
    println!("  Shutdown started; Bob's open: {:?}", blocked.err());

    d.authority.settle_market(operator, &mut d.ledger, ETH).unwrap();
    println!("  Settled at {}", d.ledger.get_mark_price(ETH).unwrap());

    let early = d.authority.archive_market(operator, &mut d.ledger, ETH);
    println!("  Archive with Alice still open: {:?}", early.err());

    // token moves to bob; bob closes
    d.ledger.token_mut().transfer(ALICE, BOB, id).unwrap();
    let receipt = d.ledger.close_position(BOB, id).unwrap();
    println!("  Bob closes transferred {} for {}", id, receipt.payout);

    d.authority.archive_market(operator, &mut d.ledger, ETH).unwrap();
    println!("  Market status: {}", d.authority.status(ETH));
    println!("  Authority events: {}, ledger events: {}\n", d.authority.events().len(), d.ledger.events().len());
}

/// Operator resets the curve; open positions take the new price.
fn scenario_4_reserve_adjustment() {
    println!("Scenario 4: Reserve Adjustment\n");

    let mut d = deploy();
    let operator = d.config.operator;
    let id = d.ledger.open_position(ALICE, ETH, wad(dec!(1000)), Side::Long).unwrap();
    println!("  Alice long 1000, mark {}", d.ledger.get_mark_price(ETH).unwrap());

    let market = d.ledger.get_market(ETH).unwrap().clone();
    let doubled = market.reserve_base.checked_add(market.reserve_base).unwrap();
    d.authority
        .adjust_market_reserves(operator, &mut d.ledger, ETH, doubled, market.reserve_asset)
        .unwrap();
    println!("  Operator doubles base reserve, mark {}", d.ledger.get_mark_price(ETH).unwrap());

    let position = position_overview(&d.ledger, id).unwrap();
    println!(
        "  Alice unrealized pnl {}, payout {}",
        position.unrealized_pnl, position.payout
    );

    d.authority.pause_market(operator, &mut d.ledger, ETH).unwrap();
    let rejected = d
        .authority
        .adjust_market_reserves(operator, &mut d.ledger, ETH, market.reserve_base, market.reserve_asset);
    println!("  Adjust while paused: {:?}", rejected.err());

    let book = portfolio(&d.ledger, ALICE).unwrap();
    println!(
        "  Alice portfolio: {} positions, collateral {}, payout {}",
        book.positions.len(),
        book.total_collateral,
        book.total_payout
    );
}
