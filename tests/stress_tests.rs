//! Stress tests
//!
//! These tests push the curve toward its limits and run many traders through
//! a full deployment to verify the ledger stays consistent.

use rust_decimal_macros::dec;
use vamm_ledger::*;

fn deployed(config: ProtocolConfig, traders: u64, funds: u64) -> Deployment {
    let mut d = Deployment::from_config(config).unwrap();
    d.bootstrap().unwrap();
    for t in 1..=traders {
        d.ledger
            .vault_mut()
            .fund(AccountId(1_000 + t), Wad::from_units(funds))
            .unwrap();
    }
    d
}

fn trader(n: u64) -> AccountId {
    AccountId(1_000 + n)
}

/// Trades that would empty one side of the curve.
mod liquidity_edge_tests {
    use super::*;

    const ETH: MarketId = MarketId(1);

    #[test]
    fn short_cannot_take_whole_base_reserve() {
        let mut d = deployed(ProtocolConfig::default(), 1, 100_000);
        let err = d
            .ledger
            .open_position(trader(1), ETH, Wad::from_units(10_000), Side::Short)
            .unwrap_err();
        assert_eq!(err, LedgerError::Math(MathError::InsufficientLiquidity));
        assert_eq!(d.ledger.vault().custody(), Wad::ZERO);
        assert_eq!(d.ledger.next_position_id(), PositionId(1));
    }

    #[test]
    fn huge_long_approaches_but_never_drains_asset() {
        let mut d = deployed(ProtocolConfig::default(), 1, 20_000_000);
        let id = d
            .ledger
            .open_position(trader(1), ETH, Wad::from_units(19_990_000), Side::Long)
            .unwrap();

        // 1000 * 10000 / 20_000_000 left in the pool
        let market = d.ledger.get_market(ETH).unwrap();
        assert!(market.reserve_asset > Wad::ZERO);
        assert!(market.reserve_asset < Wad::from_units(1));
        assert_eq!(market.reserve_asset, Wad::from_raw(500_000_000_000_000_000));
        assert!(d.ledger.get_mark_price(ETH).unwrap() > Wad::from_units(1_000_000));

        // selling it all back restores the asset side exactly
        d.ledger.close_position(trader(1), id).unwrap();
        assert_eq!(d.ledger.get_market(ETH).unwrap().reserve_asset, Wad::from_units(1_000));
    }

    #[test]
    fn dust_collateral() {
        let mut d = deployed(ProtocolConfig::default(), 1, 1);
        let dust = Wad::from_raw(1);

        // one raw unit of base buys less than one raw unit of asset
        assert_eq!(
            d.ledger.open_position(trader(1), ETH, dust, Side::Long),
            Err(LedgerError::Math(MathError::InvalidInput))
        );
        let id = d.ledger.open_position(trader(1), ETH, dust, Side::Short).unwrap();
        let receipt = d.ledger.close_position(trader(1), id).unwrap();
        assert!(receipt.payout <= dust);
    }
}

/// Many traders sharing one curve.
mod crowd_tests {
    use super::*;

    const ETH: MarketId = MarketId(1);
    const BTC: MarketId = MarketId(2);

    #[test]
    fn fifty_traders_in_and_out() {
        let mut d = deployed(ProtocolConfig::testnet(), 50, 100_000);
        let start = d.ledger.get_market(ETH).unwrap().invariant();
        let mut ids = Vec::new();

        for n in 1..=50u64 {
            let side = if n % 3 == 0 { Side::Short } else { Side::Long };
            let collateral = Wad::from_units(100 * n);
            let id = d.ledger.open_position(trader(n), ETH, collateral, side).unwrap();
            ids.push((trader(n), id));
            d.advance_time(1_000);
        }
        assert_eq!(d.ledger.get_market(ETH).unwrap().open_positions, 50);

        // unwind newest first
        for (owner, id) in ids.into_iter().rev() {
            d.ledger.close_position(owner, id).unwrap();
        }

        let market = d.ledger.get_market(ETH).unwrap();
        assert_eq!(market.open_positions, 0);
        assert!(market.invariant() >= start);
        assert_eq!(market.reserve_asset, Wad::from_decimal(dec!(1000)).unwrap());
        assert_eq!(d.ledger.position_count(), 0);
    }

    #[test]
    fn markets_do_not_share_reserves() {
        let mut d = deployed(ProtocolConfig::testnet(), 2, 100_000);
        let btc_before = d.ledger.get_mark_price(BTC).unwrap();

        for _ in 0..20 {
            d.ledger
                .open_position(trader(1), ETH, Wad::from_units(1_000), Side::Long)
                .unwrap();
        }
        assert_eq!(d.ledger.get_mark_price(BTC).unwrap(), btc_before);

        let id = d.ledger.open_position(trader(2), BTC, Wad::from_units(500), Side::Short).unwrap();
        let info = d.ledger.get_position(id).unwrap();
        assert_eq!(info.market_id, BTC);
        assert_eq!(d.ledger.get_market(BTC).unwrap().open_positions, 1);
        assert_eq!(d.ledger.get_market(ETH).unwrap().open_positions, 20);
    }

    #[test]
    fn positions_change_hands() {
        let mut d = deployed(ProtocolConfig::default(), 3, 10_000);
        let id = d
            .ledger
            .open_position(trader(1), MarketId(1), Wad::from_units(100), Side::Long)
            .unwrap();

        d.ledger.token_mut().transfer(trader(1), trader(2), id).unwrap();
        d.ledger.token_mut().transfer(trader(2), trader(3), id).unwrap();
        assert!(d.ledger.token_mut().transfer(trader(1), trader(2), id).is_err());

        assert_eq!(d.ledger.get_position(id).unwrap().owner, trader(3));
        assert!(d.ledger.positions_of(trader(1)).is_empty());

        let before = d.ledger.vault().balance_of(trader(3));
        let receipt = d.ledger.close_position(trader(3), id).unwrap();
        assert_eq!(
            d.ledger.vault().balance_of(trader(3)),
            before.checked_add(receipt.payout).unwrap()
        );
        assert_eq!(d.ledger.vault().balance_of(trader(1)), Wad::from_units(9_900));
    }

    #[test]
    fn event_log_stays_bounded() {
        let config = ProtocolConfig {
            max_events: 16,
            ..ProtocolConfig::default()
        };
        let mut d = deployed(config, 1, 100_000);
        for _ in 0..40 {
            let id = d
                .ledger
                .open_position(trader(1), MarketId(1), Wad::from_units(10), Side::Long)
                .unwrap();
            d.ledger.close_position(trader(1), id).unwrap();
        }
        assert_eq!(d.ledger.events().len(), 16);
        assert!(matches!(
            d.ledger.events().last().map(|e| &e.payload),
            Some(EventPayload::PositionClosed(_))
        ));
    }
}

/// Operator resets while positions are open.
mod operator_tests {
    use super::*;

    const ETH: MarketId = MarketId(1);

    #[test]
    fn reset_moves_open_pnl() {
        let mut d = deployed(ProtocolConfig::default(), 2, 10_000);
        let op = d.config.operator;
        let long = d.ledger.open_position(trader(1), ETH, Wad::from_units(100), Side::Long).unwrap();
        let short = d.ledger.open_position(trader(2), ETH, Wad::from_units(100), Side::Short).unwrap();

        let market = d.ledger.get_market(ETH).unwrap().clone();
        let lower = market.reserve_base.checked_sub(Wad::from_units(1_000)).unwrap();
        d.authority
            .adjust_market_reserves(op, &mut d.ledger, ETH, lower, market.reserve_asset)
            .unwrap();

        let long_view = position_overview(&d.ledger, long).unwrap();
        let short_view = position_overview(&d.ledger, short).unwrap();
        assert!(long_view.unrealized_pnl.is_negative());
        assert!(!short_view.unrealized_pnl.is_negative());

        d.ledger.close_position(trader(2), short).unwrap();
        d.ledger.close_position(trader(1), long).unwrap();
        assert_eq!(d.ledger.get_market(ETH).unwrap().open_positions, 0);
    }
}
