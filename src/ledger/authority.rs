//! Authority-only entry points. Every one checks the sender against the
//! configured authority before reading anything.

use super::core::ClearingLedger;
use super::results::LedgerError;
use crate::amm;
use crate::custody::Vault;
use crate::events::{
    EventPayload, MarketInitializedEvent, MarketStatusUpdatedEvent, PriceFrozenEvent,
    ReservesUpdatedEvent,
};
use crate::lifecycle::LifecycleStatus;
use crate::market::{Market, MarketStatus};
use crate::ownership::PositionToken;
use crate::sync::{LedgerChannel, SyncCommand};
use crate::types::{AccountId, MarketId, Wad};

impl<V: Vault, T: PositionToken> ClearingLedger<V, T> {
    /// Create an Active market. Shorthand for [`Self::initialize_market_as`].
    pub fn initialize_market(
        &mut self,
        sender: AccountId,
        market_id: MarketId,
        reserve_base: Wad,
        reserve_asset: Wad,
    ) -> Result<(), LedgerError> {
        self.initialize_market_as(sender, market_id, reserve_base, reserve_asset, LifecycleStatus::Active)
    }

    /// Create a market whose status already mirrors the authority's `status`.
    pub fn initialize_market_as(
        &mut self,
        sender: AccountId,
        market_id: MarketId,
        reserve_base: Wad,
        reserve_asset: Wad,
        status: LifecycleStatus,
    ) -> Result<(), LedgerError> {
        self.ensure_authority(sender)?;
        if self.markets.contains_key(&market_id) {
            return Err(LedgerError::MarketAlreadyExists(market_id));
        }
        if reserve_base.is_zero() || reserve_asset.is_zero() {
            return Err(LedgerError::InvalidInput("reserves must be positive"));
        }

        let mut market = Market::new(market_id, reserve_base, reserve_asset, self.current_time);
        market.status = MarketStatus::from(status);
        let status = market.status;
        self.markets.insert(market_id, market);

        tracing::info!(%market_id, %reserve_base, %reserve_asset, ?status, "market initialized");
        self.emit_event(EventPayload::MarketInitialized(MarketInitializedEvent {
            market_id,
            reserve_base,
            reserve_asset,
            status,
        }));
        Ok(())
    }

    /// Operator price override. Only while the market is tradeable.
    pub fn update_reserves(
        &mut self,
        sender: AccountId,
        market_id: MarketId,
        reserve_base: Wad,
        reserve_asset: Wad,
    ) -> Result<(), LedgerError> {
        self.ensure_authority(sender)?;
        if reserve_base.is_zero() || reserve_asset.is_zero() {
            return Err(LedgerError::InvalidInput("reserves must be positive"));
        }
        let timestamp = self.current_time;
        let market = self
            .markets
            .get_mut(&market_id)
            .filter(|m| m.is_active())
            .ok_or(LedgerError::MarketNotActive(market_id))?;

        let (old_reserve_base, old_reserve_asset) = (market.reserve_base, market.reserve_asset);
        let open_positions = market.open_positions;
        market.set_reserves(reserve_base, reserve_asset, timestamp);

        if open_positions > 0 {
            // payouts now follow the new curve and may exceed what custody holds
            tracing::warn!(
                %market_id,
                open_positions,
                %reserve_base,
                %reserve_asset,
                "reserves overridden with positions open"
            );
        } else {
            tracing::info!(%market_id, %reserve_base, %reserve_asset, "reserves overridden");
        }
        self.emit_event(EventPayload::ReservesUpdated(ReservesUpdatedEvent {
            market_id,
            old_reserve_base,
            old_reserve_asset,
            new_reserve_base: reserve_base,
            new_reserve_asset: reserve_asset,
            open_positions,
        }));
        Ok(())
    }

    /// Stop new opens for good. Closes keep working at the curve price.
    pub fn freeze_price(&mut self, sender: AccountId, market_id: MarketId) -> Result<(), LedgerError> {
        self.ensure_authority(sender)?;
        let market = self
            .markets
            .get_mut(&market_id)
            .ok_or(LedgerError::MarketNotFound(market_id))?;

        let final_price = amm::mark_price(market.reserve_base, market.reserve_asset)?;
        let old_status = market.status;
        market.status = MarketStatus::ClosingOnly;

        tracing::info!(%market_id, %final_price, "price frozen");
        self.emit_event(EventPayload::PriceFrozen(PriceFrozenEvent {
            market_id,
            final_price,
        }));
        if old_status != MarketStatus::ClosingOnly {
            self.emit_event(EventPayload::MarketStatusUpdated(MarketStatusUpdatedEvent {
                market_id,
                old_status,
                new_status: MarketStatus::ClosingOnly,
            }));
        }
        Ok(())
    }

    pub fn update_market_status(
        &mut self,
        sender: AccountId,
        market_id: MarketId,
        status: LifecycleStatus,
    ) -> Result<(), LedgerError> {
        self.ensure_authority(sender)?;
        let market = self
            .markets
            .get_mut(&market_id)
            .ok_or(LedgerError::MarketNotFound(market_id))?;

        let old_status = market.status;
        let new_status = MarketStatus::from(status);
        market.status = new_status;

        tracing::info!(%market_id, ?status, ?new_status, "market status mirrored");
        self.emit_event(EventPayload::MarketStatusUpdated(MarketStatusUpdatedEvent {
            market_id,
            old_status,
            new_status,
        }));
        Ok(())
    }

    pub fn has_open_positions(&self, sender: AccountId, market_id: MarketId) -> Result<bool, LedgerError> {
        self.ensure_authority(sender)?;
        Ok(self
            .markets
            .get(&market_id)
            .map(|m| m.open_positions > 0)
            .unwrap_or(false))
    }
}

impl<V: Vault, T: PositionToken> LedgerChannel for ClearingLedger<V, T> {
    fn push(&mut self, sender: AccountId, command: SyncCommand) -> Result<(), LedgerError> {
        match command {
            SyncCommand::InitializeMarket {
                market_id,
                reserve_base,
                reserve_asset,
                status,
            } => self.initialize_market_as(sender, market_id, reserve_base, reserve_asset, status),
            SyncCommand::UpdateReserves {
                market_id,
                reserve_base,
                reserve_asset,
            } => self.update_reserves(sender, market_id, reserve_base, reserve_asset),
            SyncCommand::FreezePrice { market_id } => self.freeze_price(sender, market_id),
            SyncCommand::UpdateMarketStatus { market_id, status } => {
                self.update_market_status(sender, market_id, status)
            }
        }
    }

    fn query_open_positions(&self, sender: AccountId, market_id: MarketId) -> Result<bool, LedgerError> {
        self.has_open_positions(sender, market_id)
    }
}
