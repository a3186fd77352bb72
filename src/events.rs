// 14.0 events.rs: every state change produces an event. the ledger's log alone is enough to
// replay reserves and positions; the authority's log replays lifecycle status.
// the EventPayload enum lists all event types.

use crate::lifecycle::LifecycleStatus;
use crate::market::MarketStatus;
use crate::types::{AccountId, MarketId, PositionId, Side, SignedWad, Timestamp, Wad};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    // Ledger market events
    MarketInitialized(MarketInitializedEvent),
    ReservesUpdated(ReservesUpdatedEvent),
    PriceFrozen(PriceFrozenEvent),
    MarketStatusUpdated(MarketStatusUpdatedEvent),

    // Position events
    PositionOpened(PositionOpenedEvent),
    PositionClosed(PositionClosedEvent),

    // Authority events
    LifecycleTransition(LifecycleTransitionEvent),
    ReservesAdjusted(ReservesAdjustedEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInitializedEvent {
    pub market_id: MarketId,
    pub reserve_base: Wad,
    pub reserve_asset: Wad,
    pub status: MarketStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservesUpdatedEvent {
    pub market_id: MarketId,
    pub old_reserve_base: Wad,
    pub old_reserve_asset: Wad,
    pub new_reserve_base: Wad,
    pub new_reserve_asset: Wad,
    /// Positions priced on the old curve when the override landed.
    pub open_positions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFrozenEvent {
    pub market_id: MarketId,
    pub final_price: Wad,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStatusUpdatedEvent {
    pub market_id: MarketId,
    pub old_status: MarketStatus,
    pub new_status: MarketStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub position_id: PositionId,
    pub trader: AccountId,
    pub market_id: MarketId,
    pub side: Side,
    pub collateral: Wad,
    pub size: Wad,
    pub entry_price: Wad,
    pub reserve_base: Wad,
    pub reserve_asset: Wad,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub position_id: PositionId,
    pub trader: AccountId,
    pub market_id: MarketId,
    pub side: Side,
    pub size: Wad,
    pub exit_price: Wad,
    pub realized_pnl: SignedWad,
    pub payout: Wad,
    pub reserve_base: Wad,
    pub reserve_asset: Wad,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleTransitionEvent {
    pub market_id: MarketId,
    pub operator: AccountId,
    pub from: LifecycleStatus,
    pub to: LifecycleStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservesAdjustedEvent {
    pub market_id: MarketId,
    pub operator: AccountId,
    pub reserve_base: Wad,
    pub reserve_asset: Wad,
}

// 14.1: bounded in-memory log shared by the ledger and the authority.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<Event>,
    next_id: u64,
    max_events: usize,
}

impl EventLog {
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
            max_events,
        }
    }

    pub fn emit(&mut self, timestamp: Timestamp, payload: EventPayload) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;

        tracing::debug!(event_id = id.0, ?payload, "event");
        self.events.push(Event::new(id, timestamp, payload));

        if self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(0..drain_count);
        }
        id
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
