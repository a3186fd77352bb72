// 12.0 views.rs: read-only aggregation over the authority and the ledger.
// nothing here mutates; every figure is what a close would realize right now.

use serde::{Deserialize, Serialize};

use crate::custody::Vault;
use crate::ledger::{ClearingLedger, LedgerError};
use crate::lifecycle::{LifecycleStatus, MarketAuthority};
use crate::market::MarketStatus;
use crate::math::MathError;
use crate::ownership::PositionToken;
use crate::position::PositionInfo;
use crate::types::{AccountId, MarketId, PositionId, SignedWad, Wad};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub market_id: MarketId,
    pub lifecycle_status: LifecycleStatus,
    pub ledger_status: MarketStatus,
    // live curve, not the authority's seed
    pub reserve_base: Wad,
    pub reserve_asset: Wad,
    pub mark_price: Wad,
    pub open_positions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOverview {
    pub position: PositionInfo,
    pub mark_price: Wad,
    pub unrealized_pnl: SignedWad,
    pub payout: Wad,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub owner: AccountId,
    pub positions: Vec<PositionOverview>,
    pub total_collateral: Wad,
    pub total_payout: Wad,
}

impl Portfolio {
    /// `total_payout - total_collateral`.
    pub fn net_pnl(&self) -> Result<SignedWad, MathError> {
        SignedWad::difference(self.total_payout, self.total_collateral)
    }
}

pub fn market_overview<V: Vault, T: PositionToken>(
    authority: &MarketAuthority,
    ledger: &ClearingLedger<V, T>,
    market_id: MarketId,
) -> Result<MarketOverview, LedgerError> {
    let market = ledger
        .get_market(market_id)
        .ok_or(LedgerError::MarketNotFound(market_id))?;
    Ok(MarketOverview {
        market_id,
        lifecycle_status: authority.status(market_id),
        ledger_status: market.status,
        reserve_base: market.reserve_base,
        reserve_asset: market.reserve_asset,
        mark_price: ledger.get_mark_price(market_id)?,
        open_positions: market.open_positions,
    })
}

pub fn position_overview<V: Vault, T: PositionToken>(
    ledger: &ClearingLedger<V, T>,
    position_id: PositionId,
) -> Result<PositionOverview, LedgerError> {
    let position = ledger.get_position(position_id)?;
    let quote = ledger.preview_close_position(position_id)?;
    Ok(PositionOverview {
        position,
        mark_price: quote.exit_price,
        unrealized_pnl: quote.pnl,
        payout: quote.payout,
    })
}

// each position is valued alone against the current curve; closing them one
// after another would move the price between closes
pub fn portfolio<V: Vault, T: PositionToken>(
    ledger: &ClearingLedger<V, T>,
    owner: AccountId,
) -> Result<Portfolio, LedgerError> {
    let mut positions = Vec::new();
    let mut total_collateral = Wad::ZERO;
    let mut total_payout = Wad::ZERO;

    for info in ledger.positions_of(owner) {
        let overview = position_overview(ledger, info.id)?;
        total_collateral = total_collateral.checked_add(overview.position.collateral)?;
        total_payout = total_payout.checked_add(overview.payout)?;
        positions.push(overview);
    }

    Ok(Portfolio {
        owner,
        positions,
        total_collateral,
        total_payout,
    })
}
