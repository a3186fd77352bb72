// 9.1 ledger/core.rs: main ledger struct. holds markets, positions, the two
// collaborators and the event log.

use super::config::LedgerConfig;
use super::results::LedgerError;
use crate::custody::Vault;
use crate::events::{Event, EventLog, EventPayload};
use crate::market::Market;
use crate::ownership::PositionToken;
use crate::position::Position;
use crate::types::{AccountId, MarketId, PositionId, Timestamp};
use std::collections::HashMap;

/** 9.1: all ledger state lives here */
#[derive(Debug)]
pub struct ClearingLedger<V: Vault, T: PositionToken> {
    pub(super) config: LedgerConfig,
    pub(super) markets: HashMap<MarketId, Market>,
    pub(super) positions: HashMap<PositionId, Position>,
    pub(super) vault: V,
    pub(super) token: T,
    pub(super) log: EventLog,
    pub(super) next_position_id: u64,
    pub(super) current_time: Timestamp,
    // set while an open/close is in flight
    pub(super) entered: bool,
}

impl<V: Vault, T: PositionToken> ClearingLedger<V, T> {
    pub fn new(config: LedgerConfig, vault: V, token: T) -> Self {
        let log = EventLog::new(config.max_events);
        Self {
            config,
            markets: HashMap::new(),
            positions: HashMap::new(),
            vault,
            token,
            log,
            next_position_id: 1,
            current_time: Timestamp::from_millis(0),
            entered: false,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
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

    pub fn get_market(&self, market_id: MarketId) -> Option<&Market> {
        self.markets.get(&market_id)
    }

    pub fn markets_iter(&self) -> impl Iterator<Item = (&MarketId, &Market)> {
        self.markets.iter()
    }

    pub fn positions_iter(&self) -> impl Iterator<Item = (&PositionId, &Position)> {
        self.positions.iter()
    }

    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Id the next successful open will receive.
    pub fn next_position_id(&self) -> PositionId {
        PositionId(self.next_position_id)
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Direct access for funding wallets in tests and simulations.
    pub fn vault_mut(&mut self) -> &mut V {
        &mut self.vault
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    /// Holder-side token operations (transfers) go through here.
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn events(&self) -> &[Event] {
        self.log.events()
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        self.log.recent(count)
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        self.log.emit(self.current_time, payload);
    }

    pub(super) fn ensure_authority(&self, sender: AccountId) -> Result<(), LedgerError> {
        if sender != self.config.authority {
            tracing::warn!(%sender, "rejected non-authority sync call");
            return Err(LedgerError::Unauthorized(sender));
        }
        Ok(())
    }

    /// Runs `op` with the re-entrancy flag held. A nested call fails with
    /// `ReentrantCall`; the flag is cleared whether `op` succeeds or not.
    pub(super) fn non_reentrant<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        if self.entered {
            return Err(LedgerError::ReentrantCall);
        }
        self.entered = true;
        let result = op(self);
        self.entered = false;
        result
    }
}
