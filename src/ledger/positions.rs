//! Opening and closing positions.
//!
//! Each operation computes every new value first, then runs the collaborator
//! calls, then commits ledger state. A collaborator failure after an earlier
//! collaborator succeeded is compensated before the error is returned, so a
//! failed call leaves vault, token and ledger exactly as they were.

use super::core::ClearingLedger;
use super::results::{CloseReceipt, LedgerError};
use crate::amm;
use crate::custody::Vault;
use crate::events::{EventPayload, PositionClosedEvent, PositionOpenedEvent};
use crate::ownership::PositionToken;
use crate::position::Position;
use crate::types::{AccountId, MarketId, PositionId, Side, Wad};

impl<V: Vault, T: PositionToken> ClearingLedger<V, T> {
    /// Commit `collateral` from `caller` and open a position on the curve.
    pub fn open_position(
        &mut self,
        caller: AccountId,
        market_id: MarketId,
        collateral: Wad,
        side: Side,
    ) -> Result<PositionId, LedgerError> {
        self.non_reentrant(|ledger| ledger.open_position_locked(caller, market_id, collateral, side))
    }

    /// Close a position held by `caller` and pay out `max(0, collateral + pnl)`.
    pub fn close_position(
        &mut self,
        caller: AccountId,
        position_id: PositionId,
    ) -> Result<CloseReceipt, LedgerError> {
        self.non_reentrant(|ledger| ledger.close_position_locked(caller, position_id))
    }

    fn open_position_locked(
        &mut self,
        caller: AccountId,
        market_id: MarketId,
        collateral: Wad,
        side: Side,
    ) -> Result<PositionId, LedgerError> {
        if collateral.is_zero() {
            return Err(LedgerError::InvalidInput("collateral must be positive"));
        }

        let market = self
            .markets
            .get(&market_id)
            .filter(|m| m.is_active())
            .ok_or(LedgerError::MarketNotActive(market_id))?;

        let entry_price = amm::mark_price(market.reserve_base, market.reserve_asset)?;
        let fill = match side {
            Side::Long => amm::open_long(collateral, market.reserve_base, market.reserve_asset)?,
            Side::Short => amm::open_short(collateral, market.reserve_base, market.reserve_asset)?,
        };
        let open_positions = market
            .open_positions
            .checked_add(1)
            .ok_or(LedgerError::InvalidInput("open position counter exhausted"))?;

        let position_id = PositionId(self.next_position_id);
        let ledger_account = self.config.ledger_account;

        self.vault.deposit(ledger_account, caller, collateral)?;
        if let Err(e) = self.token.mint(ledger_account, caller, position_id) {
            if let Err(refund) = self.vault.withdraw(ledger_account, caller, collateral) {
                tracing::error!(%caller, %position_id, error = %refund, "refund after failed mint did not go through");
            }
            tracing::warn!(%caller, %position_id, error = %e, "open rolled back");
            return Err(e.into());
        }

        // commit
        self.next_position_id += 1;
        let timestamp = self.current_time;
        let market = self
            .markets
            .get_mut(&market_id)
            .ok_or(LedgerError::MarketNotFound(market_id))?;
        market.set_reserves(fill.new_reserve_base, fill.new_reserve_asset, timestamp);
        market.open_positions = open_positions;

        let position = Position::new(
            position_id,
            market_id,
            side,
            collateral,
            fill.size,
            entry_price,
            timestamp,
        );
        self.positions.insert(position_id, position);

        tracing::info!(
            %position_id,
            trader = %caller,
            %market_id,
            %side,
            %collateral,
            size = %fill.size,
            %entry_price,
            "position opened"
        );

        self.emit_event(EventPayload::PositionOpened(PositionOpenedEvent {
            position_id,
            trader: caller,
            market_id,
            side,
            collateral,
            size: fill.size,
            entry_price,
            reserve_base: fill.new_reserve_base,
            reserve_asset: fill.new_reserve_asset,
        }));

        Ok(position_id)
    }

    fn close_position_locked(
        &mut self,
        caller: AccountId,
        position_id: PositionId,
    ) -> Result<CloseReceipt, LedgerError> {
        let position = self
            .positions
            .get(&position_id)
            .cloned()
            .ok_or(LedgerError::PositionNotFound(position_id))?;

        let owner = self.token.owner_of(position_id)?;
        if owner != caller {
            return Err(LedgerError::Unauthorized(caller));
        }

        let market_id = position.market_id;
        let market = self
            .markets
            .get(&market_id)
            .ok_or(LedgerError::MarketNotFound(market_id))?;

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
        let payout = fill.payout(position.collateral)?;

        let ledger_account = self.config.ledger_account;
        self.token.burn(ledger_account, position_id)?;
        if !payout.is_zero() {
            if let Err(e) = self.vault.withdraw(ledger_account, owner, payout) {
                if let Err(remint) = self.token.mint(ledger_account, owner, position_id) {
                    tracing::error!(%owner, %position_id, error = %remint, "re-mint after failed payout did not go through");
                }
                tracing::warn!(%owner, %position_id, error = %e, "close rolled back");
                return Err(e.into());
            }
        }

        // commit
        let timestamp = self.current_time;
        self.positions.remove(&position_id);
        if let Some(market) = self.markets.get_mut(&market_id) {
            market.set_reserves(fill.new_reserve_base, fill.new_reserve_asset, timestamp);
            market.open_positions = market.open_positions.saturating_sub(1);
        }

        tracing::info!(
            %position_id,
            trader = %owner,
            %market_id,
            pnl = %fill.pnl,
            %payout,
            %exit_price,
            "position closed"
        );

        self.emit_event(EventPayload::PositionClosed(PositionClosedEvent {
            position_id,
            trader: owner,
            market_id,
            side: position.side,
            size: position.size,
            exit_price,
            realized_pnl: fill.pnl,
            payout,
            reserve_base: fill.new_reserve_base,
            reserve_asset: fill.new_reserve_asset,
        }));

        Ok(CloseReceipt {
            position_id,
            owner,
            pnl: fill.pnl,
            payout,
            exit_price,
        })
    }
}
