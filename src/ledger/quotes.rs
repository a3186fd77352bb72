//! Read-only projections: mark price, position lookup and trade previews.

use super::core::ClearingLedger;
use super::results::{CloseQuote, LedgerError, OpenQuote};
use crate::amm;
use crate::custody::Vault;
use crate::ownership::PositionToken;
use crate::position::PositionInfo;
use crate::types::{AccountId, MarketId, PositionId, Side, Wad};

impl<V: Vault, T: PositionToken> ClearingLedger<V, T> {
    pub fn get_mark_price(&self, market_id: MarketId) -> Result<Wad, LedgerError> {
        let market = self
            .markets
            .get(&market_id)
            .ok_or(LedgerError::MarketNotFound(market_id))?;
        Ok(amm::mark_price(market.reserve_base, market.reserve_asset)?)
    }

    pub fn get_position(&self, position_id: PositionId) -> Result<PositionInfo, LedgerError> {
        let position = self
            .positions
            .get(&position_id)
            .ok_or(LedgerError::PositionNotFound(position_id))?;
        let owner = self.token.owner_of(position_id)?;
        Ok(position.with_owner(owner))
    }

    /// Asset amount and entry price an open would get right now. Ignores market
    /// status so quotes keep working while a market is paused.
    pub fn preview_open_position(
        &self,
        market_id: MarketId,
        collateral: Wad,
        side: Side,
    ) -> Result<OpenQuote, LedgerError> {
        if collateral.is_zero() {
            return Err(LedgerError::InvalidInput("collateral must be positive"));
        }
        let market = self
            .markets
            .get(&market_id)
            .ok_or(LedgerError::MarketNotFound(market_id))?;

        let entry_price = amm::mark_price(market.reserve_base, market.reserve_asset)?;
        let fill = match side {
            Side::Long => amm::open_long(collateral, market.reserve_base, market.reserve_asset)?,
            Side::Short => amm::open_short(collateral, market.reserve_base, market.reserve_asset)?,
        };
        Ok(OpenQuote {
            asset_amount: fill.size,
            entry_price,
        })
    }

    pub fn preview_close_position(&self, position_id: PositionId) -> Result<CloseQuote, LedgerError> {
        let position = self
            .positions
            .get(&position_id)
            .ok_or(LedgerError::PositionNotFound(position_id))?;
        let market = self
            .markets
            .get(&position.market_id)
            .ok_or(LedgerError::MarketNotFound(position.market_id))?;

        let exit_price = amm::mark_price(market.reserve_base, market.reserve_asset)?;
        let fill = match position.side {
            Side::Long => amm::close_long(
                position.size,
                position.collateral,
                market.reserve_base,
                market.reserve_asset,
            )?,
            Side::Short => amm::close_short(
                position.size,
                position.collateral,
                market.reserve_base,
                market.reserve_asset,
            )?,
        };
        Ok(CloseQuote {
            pnl: fill.pnl,
            payout: fill.payout(position.collateral)?,
            exit_price,
        })
    }

    /// Every open position whose token `owner` currently holds, oldest first.
    pub fn positions_of(&self, owner: AccountId) -> Vec<PositionInfo> {
        let mut held: Vec<PositionInfo> = self
            .positions
            .values()
            .filter_map(|p| match self.token.owner_of(p.id) {
                Ok(holder) if holder == owner => Some(p.with_owner(holder)),
                _ => None,
            })
            .collect();
        held.sort_by_key(|p| p.id);
        held
    }
}
