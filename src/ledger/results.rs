// 9.0.2: result types and errors for ledger operations.

use crate::custody::CustodyError;
use crate::math::MathError;
use crate::ownership::OwnershipError;
use crate::types::{AccountId, MarketId, PositionId, SignedWad, Wad};
use serde::{Deserialize, Serialize};

/// What `preview_open_position` projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenQuote {
    pub asset_amount: Wad,
    pub entry_price: Wad,
}

/// What closing a position right now would realize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseQuote {
    pub pnl: SignedWad,
    pub payout: Wad,
    pub exit_price: Wad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseReceipt {
    pub position_id: PositionId,
    pub owner: AccountId,
    pub pnl: SignedWad,
    pub payout: Wad,
    pub exit_price: Wad,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Market {0} is not active")]
    MarketNotActive(MarketId),

    #[error("Market {0} not found")]
    MarketNotFound(MarketId),

    #[error("Market {0} already exists")]
    MarketAlreadyExists(MarketId),

    #[error("{0} is not authorized")]
    Unauthorized(AccountId),

    #[error("Position {0} not found")]
    PositionNotFound(PositionId),

    #[error("Ledger operation already in progress")]
    ReentrantCall,

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Ownership error: {0}")]
    Ownership(#[from] OwnershipError),
}
