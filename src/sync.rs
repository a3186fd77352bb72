//! Authority → ledger synchronization.
//!
//! The lifecycle authority never touches ledger state directly. It sends one
//! [`SyncCommand`] per change through a [`LedgerChannel`] and commits its own
//! record only after the ledger accepted it.

use crate::ledger::LedgerError;
use crate::lifecycle::LifecycleStatus;
use crate::types::{AccountId, MarketId, Wad};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncCommand {
    /// Create the ledger market already mirroring `status`, so a market is
    /// never visible to the ledger under a status the authority never held.
    InitializeMarket {
        market_id: MarketId,
        reserve_base: Wad,
        reserve_asset: Wad,
        status: LifecycleStatus,
    },
    UpdateReserves {
        market_id: MarketId,
        reserve_base: Wad,
        reserve_asset: Wad,
    },
    FreezePrice {
        market_id: MarketId,
    },
    UpdateMarketStatus {
        market_id: MarketId,
        status: LifecycleStatus,
    },
}

impl SyncCommand {
    pub fn market_id(&self) -> MarketId {
        match self {
            SyncCommand::InitializeMarket { market_id, .. }
            | SyncCommand::UpdateReserves { market_id, .. }
            | SyncCommand::FreezePrice { market_id }
            | SyncCommand::UpdateMarketStatus { market_id, .. } => *market_id,
        }
    }
}

/// The authority-only surface of the ledger.
pub trait LedgerChannel {
    fn push(&mut self, sender: AccountId, command: SyncCommand) -> Result<(), LedgerError>;

    /// Whether any position in `market_id` is still open.
    fn query_open_positions(&self, sender: AccountId, market_id: MarketId) -> Result<bool, LedgerError>;
}
