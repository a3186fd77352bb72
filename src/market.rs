//! Ledger-side market record.
//!
//! The ledger only knows three states. The lifecycle authority keeps the full
//! state machine and pushes its status down through [`MarketStatus::from`].

use crate::lifecycle::LifecycleStatus;
use crate::math::widening_mul;
use crate::types::{MarketId, Timestamp, Wad};
use serde::{Deserialize, Serialize};

/// Ledger projection of the market lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarketStatus {
    /// Known to the ledger but not tradeable
    #[default]
    Uninitialized,
    /// Opens and closes allowed
    Active,
    /// Closes only
    ClosingOnly,
}

impl From<LifecycleStatus> for MarketStatus {
    fn from(status: LifecycleStatus) -> Self {
        match status {
            LifecycleStatus::None | LifecycleStatus::Created => MarketStatus::Uninitialized,
            LifecycleStatus::Active => MarketStatus::Active,
            LifecycleStatus::Paused
            | LifecycleStatus::ClosingOnly
            | LifecycleStatus::Settled
            | LifecycleStatus::Archived => MarketStatus::ClosingOnly,
        }
    }
}

/// `reserve_base * reserve_asset` at full 256 bit width. Field order makes the
/// derived `Ord` compare the high limb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Invariant {
    pub hi: u128,
    pub lo: u128,
}

/// Virtual reserves and bookkeeping for one market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub reserve_base: Wad,
    pub reserve_asset: Wad,
    pub status: MarketStatus,
    /// Positions opened and not yet closed
    pub open_positions: u64,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

impl Market {
    pub fn new(id: MarketId, reserve_base: Wad, reserve_asset: Wad, timestamp: Timestamp) -> Self {
        Self {
            id,
            reserve_base,
            reserve_asset,
            status: MarketStatus::Active,
            open_positions: 0,
            created_at: timestamp,
            last_updated: timestamp,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MarketStatus::Active
    }

    pub fn invariant(&self) -> Invariant {
        let (hi, lo) = widening_mul(self.reserve_base.raw(), self.reserve_asset.raw());
        Invariant { hi, lo }
    }

    pub fn set_reserves(&mut self, reserve_base: Wad, reserve_asset: Wad, timestamp: Timestamp) {
        self.reserve_base = reserve_base;
        self.reserve_asset = reserve_asset;
        self.last_updated = timestamp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_market_is_active() {
        let market = Market::new(
            MarketId(1),
            Wad::from_units(10_000),
            Wad::from_units(1_000),
            Timestamp::from_millis(0),
        );
        assert!(market.is_active());
        assert_eq!(market.open_positions, 0);
    }

    #[test]
    fn status_projection() {
        assert_eq!(MarketStatus::from(LifecycleStatus::Created), MarketStatus::Uninitialized);
        assert_eq!(MarketStatus::from(LifecycleStatus::Active), MarketStatus::Active);
        assert_eq!(MarketStatus::from(LifecycleStatus::Paused), MarketStatus::ClosingOnly);
        assert_eq!(MarketStatus::from(LifecycleStatus::Settled), MarketStatus::ClosingOnly);
        assert_eq!(MarketStatus::from(LifecycleStatus::Archived), MarketStatus::ClosingOnly);
    }

    #[test]
    fn invariant_orders_by_product() {
        let mut market = Market::new(
            MarketId(1),
            Wad::from_units(10_000),
            Wad::from_units(1_000),
            Timestamp::from_millis(0),
        );
        let before = market.invariant();
        market.set_reserves(Wad::from_units(10_001), Wad::from_units(1_000), Timestamp::from_millis(5));
        assert!(market.invariant() > before);
        assert_eq!(market.last_updated, Timestamp::from_millis(5));
    }
}
