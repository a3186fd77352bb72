// 10.0 lifecycle.rs: market lifecycle authority. single source of truth for a
// market's status and for operator-set reserves.
//
//   None -> Created -> Active <-> Paused
//   {Active, Paused} -> ClosingOnly -> Settled -> Archived
//
// every transition is operator-only, pushes its sync command to the ledger
// first, and commits the local record only if the push went through.

use crate::events::{EventLog, EventPayload, LifecycleTransitionEvent, ReservesAdjustedEvent};
use crate::ledger::LedgerError;
use crate::sync::{LedgerChannel, SyncCommand};
use crate::types::{AccountId, MarketId, Timestamp, Wad};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LifecycleStatus {
    #[default]
    None,
    Created,
    Active,
    Paused,
    ClosingOnly,
    Settled,
    Archived,
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleStatus::None => "none",
            LifecycleStatus::Created => "created",
            LifecycleStatus::Active => "active",
            LifecycleStatus::Paused => "paused",
            LifecycleStatus::ClosingOnly => "closing_only",
            LifecycleStatus::Settled => "settled",
            LifecycleStatus::Archived => "archived",
        };
        write!(f, "{}", name)
    }
}

// 10.1: the authority's view of a market. reserves are the operator-set seed,
// not the live curve; the ledger owns that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub id: MarketId,
    pub status: LifecycleStatus,
    pub reserve_base: Wad,
    pub reserve_asset: Wad,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityConfig {
    /// Sender identity used on the ledger channel.
    pub authority_account: AccountId,
    /// The only account allowed to drive transitions.
    pub operator: AccountId,
    pub max_events: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityError {
    #[error("{0} is not the operator")]
    Unauthorized(AccountId),

    #[error("Market {market_id} is {status}, expected one of {expected:?}")]
    InvalidMarketStatus {
        market_id: MarketId,
        status: LifecycleStatus,
        expected: Vec<LifecycleStatus>,
    },

    #[error("Market {0} already exists")]
    MarketAlreadyExists(MarketId),

    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("Market {0} still has open positions")]
    OpenPositionsRemaining(MarketId),

    #[error("Ledger rejected sync: {0}")]
    Ledger(#[from] LedgerError),
}

#[derive(Debug)]
pub struct MarketAuthority {
    config: AuthorityConfig,
    markets: HashMap<MarketId, MarketRecord>,
    log: EventLog,
    current_time: Timestamp,
}

impl MarketAuthority {
    pub fn new(config: AuthorityConfig) -> Self {
        let log = EventLog::new(config.max_events);
        Self {
            config,
            markets: HashMap::new(),
            log,
            current_time: Timestamp::from_millis(0),
        }
    }

    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    pub fn advance_time(&mut self, millis: i64) {
        self.current_time = Timestamp::from_millis(self.current_time.as_millis() + millis);
    }

    pub fn get_market(&self, market_id: MarketId) -> Option<&MarketRecord> {
        self.markets.get(&market_id)
    }

    /// `None` for markets never created.
    pub fn status(&self, market_id: MarketId) -> LifecycleStatus {
        self.markets
            .get(&market_id)
            .map(|m| m.status)
            .unwrap_or_default()
    }

    pub fn markets_iter(&self) -> impl Iterator<Item = (&MarketId, &MarketRecord)> {
        self.markets.iter()
    }

    pub fn events(&self) -> &[crate::events::Event] {
        self.log.events()
    }

    // 10.2: None -> Created. seeds reserves on both sides; the ledger holds the
    // market closed until listing.
    pub fn create_market<C: LedgerChannel>(
        &mut self,
        caller: AccountId,
        ledger: &mut C,
        market_id: MarketId,
        reserve_base: Wad,
        reserve_asset: Wad,
    ) -> Result<(), AuthorityError> {
        self.ensure_operator(caller)?;
        if self.markets.contains_key(&market_id) {
            return Err(AuthorityError::MarketAlreadyExists(market_id));
        }
        if reserve_base.is_zero() || reserve_asset.is_zero() {
            return Err(AuthorityError::InvalidInput("reserves must be positive"));
        }

        // one push: the ledger either holds the market as Created or not at all
        ledger.push(
            self.config.authority_account,
            SyncCommand::InitializeMarket {
                market_id,
                reserve_base,
                reserve_asset,
                status: LifecycleStatus::Created,
            },
        )?;

        self.markets.insert(
            market_id,
            MarketRecord {
                id: market_id,
                status: LifecycleStatus::Created,
                reserve_base,
                reserve_asset,
                created_at: self.current_time,
                updated_at: self.current_time,
            },
        );
        self.record_transition(caller, market_id, LifecycleStatus::None, LifecycleStatus::Created);
        Ok(())
    }

    pub fn list_market<C: LedgerChannel>(
        &mut self,
        caller: AccountId,
        ledger: &mut C,
        market_id: MarketId,
    ) -> Result<(), AuthorityError> {
        self.transition(
            caller,
            ledger,
            market_id,
            &[LifecycleStatus::Created],
            LifecycleStatus::Active,
        )
    }

    pub fn pause_market<C: LedgerChannel>(
        &mut self,
        caller: AccountId,
        ledger: &mut C,
        market_id: MarketId,
    ) -> Result<(), AuthorityError> {
        self.transition(
            caller,
            ledger,
            market_id,
            &[LifecycleStatus::Active],
            LifecycleStatus::Paused,
        )
    }

    pub fn resume_market<C: LedgerChannel>(
        &mut self,
        caller: AccountId,
        ledger: &mut C,
        market_id: MarketId,
    ) -> Result<(), AuthorityError> {
        self.transition(
            caller,
            ledger,
            market_id,
            &[LifecycleStatus::Paused],
            LifecycleStatus::Active,
        )
    }

    /// No way back from here.
    pub fn start_shutdown_process<C: LedgerChannel>(
        &mut self,
        caller: AccountId,
        ledger: &mut C,
        market_id: MarketId,
    ) -> Result<(), AuthorityError> {
        self.transition(
            caller,
            ledger,
            market_id,
            &[LifecycleStatus::Active, LifecycleStatus::Paused],
            LifecycleStatus::ClosingOnly,
        )
    }

    pub fn settle_market<C: LedgerChannel>(
        &mut self,
        caller: AccountId,
        ledger: &mut C,
        market_id: MarketId,
    ) -> Result<(), AuthorityError> {
        self.transition(
            caller,
            ledger,
            market_id,
            &[LifecycleStatus::ClosingOnly],
            LifecycleStatus::Settled,
        )
    }

    /// Only once the ledger reports every position closed.
    pub fn archive_market<C: LedgerChannel>(
        &mut self,
        caller: AccountId,
        ledger: &mut C,
        market_id: MarketId,
    ) -> Result<(), AuthorityError> {
        self.transition(
            caller,
            ledger,
            market_id,
            &[LifecycleStatus::Settled],
            LifecycleStatus::Archived,
        )
    }

    // 10.3: operator price setting, separate from trade flow. the ledger only
    // accepts it while the market is tradeable.
    pub fn adjust_market_reserves<C: LedgerChannel>(
        &mut self,
        caller: AccountId,
        ledger: &mut C,
        market_id: MarketId,
        reserve_base: Wad,
        reserve_asset: Wad,
    ) -> Result<(), AuthorityError> {
        self.ensure_operator(caller)?;
        let status = self.status(market_id);
        if status == LifecycleStatus::None {
            return Err(AuthorityError::InvalidMarketStatus {
                market_id,
                status,
                expected: vec![
                    LifecycleStatus::Created,
                    LifecycleStatus::Active,
                    LifecycleStatus::Paused,
                    LifecycleStatus::ClosingOnly,
                    LifecycleStatus::Settled,
                    LifecycleStatus::Archived,
                ],
            });
        }
        if reserve_base.is_zero() || reserve_asset.is_zero() {
            return Err(AuthorityError::InvalidInput("reserves must be positive"));
        }

        ledger.push(
            self.config.authority_account,
            SyncCommand::UpdateReserves {
                market_id,
                reserve_base,
                reserve_asset,
            },
        )?;

        let timestamp = self.current_time;
        if let Some(record) = self.markets.get_mut(&market_id) {
            record.reserve_base = reserve_base;
            record.reserve_asset = reserve_asset;
            record.updated_at = timestamp;
        }
        tracing::info!(%market_id, %reserve_base, %reserve_asset, "reserves adjusted");
        self.log.emit(
            timestamp,
            EventPayload::ReservesAdjusted(ReservesAdjustedEvent {
                market_id,
                operator: caller,
                reserve_base,
                reserve_asset,
            }),
        );
        Ok(())
    }

    fn transition<C: LedgerChannel>(
        &mut self,
        caller: AccountId,
        ledger: &mut C,
        market_id: MarketId,
        allowed_from: &[LifecycleStatus],
        to: LifecycleStatus,
    ) -> Result<(), AuthorityError> {
        self.ensure_operator(caller)?;
        let from = self.status(market_id);
        if !allowed_from.contains(&from) {
            tracing::warn!(%market_id, %from, %to, "illegal lifecycle transition");
            return Err(AuthorityError::InvalidMarketStatus {
                market_id,
                status: from,
                expected: allowed_from.to_vec(),
            });
        }

        let sender = self.config.authority_account;
        if to == LifecycleStatus::Archived && ledger.query_open_positions(sender, market_id)? {
            return Err(AuthorityError::OpenPositionsRemaining(market_id));
        }

        let command = match to {
            LifecycleStatus::Settled => SyncCommand::FreezePrice { market_id },
            status => SyncCommand::UpdateMarketStatus { market_id, status },
        };
        ledger.push(sender, command)?;

        let timestamp = self.current_time;
        if let Some(record) = self.markets.get_mut(&market_id) {
            record.status = to;
            record.updated_at = timestamp;
        }
        self.record_transition(caller, market_id, from, to);
        Ok(())
    }

    fn record_transition(&mut self, operator: AccountId, market_id: MarketId, from: LifecycleStatus, to: LifecycleStatus) {
        tracing::info!(%market_id, %from, %to, "lifecycle transition");
        self.log.emit(
            self.current_time,
            EventPayload::LifecycleTransition(LifecycleTransitionEvent {
                market_id,
                operator,
                from,
                to,
            }),
        );
    }

    fn ensure_operator(&self, caller: AccountId) -> Result<(), AuthorityError> {
        if caller != self.config.operator {
            tracing::warn!(%caller, "rejected non-operator lifecycle call");
            return Err(AuthorityError::Unauthorized(caller));
        }
        Ok(())
    }
}
