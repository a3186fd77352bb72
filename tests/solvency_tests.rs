//! Solvency tests.
//!
//! The vault must always be able to pay every close, and its books must match
//! what actually moved between wallets and custody.

use proptest::prelude::*;
use vamm_ledger::*;

const LEDGER: AccountId = AccountId(901);
const AUTHORITY: AccountId = AccountId(900);
const MARKET: MarketId = MarketId(1);

fn ledger_with_traders(traders: u64) -> InMemoryLedger {
    let mut ledger = ClearingLedger::new(
        LedgerConfig::default(),
        InMemoryVault::new(LEDGER),
        InMemoryPositionToken::new(LEDGER),
    );
    ledger
        .initialize_market(AUTHORITY, MARKET, Wad::from_units(10_000), Wad::from_units(1_000))
        .unwrap();
    for t in 1..=traders {
        ledger.vault_mut().fund(AccountId(t), Wad::from_units(1_000)).unwrap();
    }
    ledger
}

// (trader 1..=4, side, collateral 1..=100 units). small enough that no
// position can lose its whole collateral
fn trades_strategy() -> impl Strategy<Value = (Vec<(u64, Side, u64)>, Vec<usize>)> {
    prop::collection::vec(
        (
            1u64..=4u64,
            prop_oneof![Just(Side::Long), Just(Side::Short)],
            1u64..=100u64,
        ),
        1..=8,
    )
    .prop_flat_map(|trades| {
        let order: Vec<usize> = (0..trades.len()).collect();
        (Just(trades), Just(order).prop_shuffle())
    })
}

proptest! {
    /// every position closes in any order, and custody never goes short
    #[test]
    fn closes_always_paid(input in trades_strategy()) {
        let (trades, order) = input;
        let mut ledger = ledger_with_traders(4);
        let mut ids = Vec::new();

        for (trader, side, collateral) in &trades {
            let id = ledger
                .open_position(AccountId(*trader), MARKET, Wad::from_units(*collateral), *side)
                .unwrap();
            ids.push((AccountId(*trader), id));
        }

        for index in order {
            let (trader, id) = ids[index];
            let receipt = ledger.close_position(trader, id);
            prop_assert!(receipt.is_ok(), "close of {} failed: {:?}", id, receipt);
        }

        prop_assert_eq!(ledger.position_count(), 0);
        prop_assert_eq!(ledger.token().supply(), 0);
        let market = ledger.get_market(MARKET).unwrap();
        prop_assert_eq!(market.reserve_asset, Wad::from_units(1_000));
        prop_assert!(market.reserve_base >= Wad::from_units(10_000));
    }

    /// custody == deposited - withdrawn, and wallets + custody is conserved
    #[test]
    fn vault_books_balance(input in trades_strategy()) {
        let (trades, order) = input;
        let mut ledger = ledger_with_traders(4);
        let mut ids = Vec::new();

        for (trader, side, collateral) in &trades {
            let id = ledger
                .open_position(AccountId(*trader), MARKET, Wad::from_units(*collateral), *side)
                .unwrap();
            ids.push((AccountId(*trader), id));
        }
        for index in order.iter().take(order.len() / 2) {
            let (trader, id) = ids[*index];
            ledger.close_position(trader, id).unwrap();
        }

        let vault = ledger.vault();
        prop_assert_eq!(
            vault.custody(),
            vault.total_deposited().checked_sub(vault.total_withdrawn()).unwrap()
        );

        let mut total = vault.custody();
        for t in 1..=4 {
            total = total.checked_add(vault.balance_of(AccountId(t))).unwrap();
        }
        prop_assert_eq!(total, Wad::from_units(4_000));
    }
}

#[test]
fn winners_paid_from_losers_collateral() {
    let mut ledger = ledger_with_traders(2);
    let alice = AccountId(1);
    let bob = AccountId(2);

    let a = ledger.open_position(alice, MARKET, Wad::from_units(100), Side::Long).unwrap();
    let b = ledger.open_position(bob, MARKET, Wad::from_units(500), Side::Long).unwrap();

    // alice got in first and profits from bob's buying
    let alice_receipt = ledger.close_position(alice, a).unwrap();
    assert!(alice_receipt.payout > Wad::from_units(100));

    let bob_receipt = ledger.close_position(bob, b).unwrap();
    assert!(bob_receipt.pnl.is_negative());

    let paid = alice_receipt.payout.checked_add(bob_receipt.payout).unwrap();
    assert!(paid <= Wad::from_units(600));
    assert_eq!(
        ledger.vault().custody(),
        Wad::from_units(600).checked_sub(paid).unwrap()
    );
}

#[test]
fn failed_close_moves_nothing() {
    let mut ledger = ledger_with_traders(2);
    let alice = AccountId(1);
    let id = ledger.open_position(alice, MARKET, Wad::from_units(100), Side::Short).unwrap();

    let custody = ledger.vault().custody();
    let reserves = ledger
        .get_market(MARKET)
        .map(|m| (m.reserve_base, m.reserve_asset))
        .unwrap();

    assert!(matches!(
        ledger.close_position(AccountId(2), id),
        Err(LedgerError::Unauthorized(_))
    ));
    assert_eq!(ledger.vault().custody(), custody);
    assert_eq!(
        ledger.get_market(MARKET).map(|m| (m.reserve_base, m.reserve_asset)).unwrap(),
        reserves
    );
    assert_eq!(ledger.token().owner_of(id), Ok(alice));
}
