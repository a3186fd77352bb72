// 5.0 position.rs: one record per open position. economics only; who controls
// the position is whatever the ownership token says.

use crate::types::{AccountId, MarketId, PositionId, Side, Timestamp, Wad};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub market_id: MarketId,
    pub side: Side,
    // committed at open, never changes
    pub collateral: Wad,
    // asset units
    pub size: Wad,
    // mark price before the opening trade moved the curve
    pub entry_price: Wad,
    pub opened_at: Timestamp,
}

impl Position {
    pub fn new(
        id: PositionId,
        market_id: MarketId,
        side: Side,
        collateral: Wad,
        size: Wad,
        entry_price: Wad,
        opened_at: Timestamp,
    ) -> Self {
        Self {
            id,
            market_id,
            side,
            collateral,
            size,
            entry_price,
            opened_at,
        }
    }

    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }

    pub fn is_short(&self) -> bool {
        self.side == Side::Short
    }

    pub fn with_owner(&self, owner: AccountId) -> PositionInfo {
        PositionInfo {
            id: self.id,
            owner,
            market_id: self.market_id,
            side: self.side,
            collateral: self.collateral,
            size: self.size,
            entry_price: self.entry_price,
            opened_at: self.opened_at,
        }
    }
}

// 5.1: trader facing view. owner resolved through the token at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub id: PositionId,
    pub owner: AccountId,
    pub market_id: MarketId,
    pub side: Side,
    pub collateral: Wad,
    pub size: Wad,
    pub entry_price: Wad,
    pub opened_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_carries_owner() {
        let position = Position::new(
            PositionId(7),
            MarketId(1),
            Side::Short,
            Wad::from_units(50),
            Wad::from_units(5),
            Wad::from_units(10),
            Timestamp::from_millis(1_000),
        );
        assert!(position.is_short());

        let info = position.with_owner(AccountId(42));
        assert_eq!(info.owner, AccountId(42));
        assert_eq!(info.id, PositionId(7));
        assert_eq!(info.collateral, Wad::from_units(50));
        assert_eq!(info.opened_at, Timestamp::from_millis(1_000));
    }
}
