// 11.0: every session transition produces an event. used for audit trails and for
// telling the view layer what changed. the EventPayload enum lists all event types.

use crate::bounds::Bounds;
use crate::input::InputField;
use crate::position::PositionInputs;
use crate::provider::AccountChange;
use crate::types::{Address, Price, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Market events
    MarketRefreshed(MarketRefreshedEvent),
    BoundsResolved(BoundsResolvedEvent),
    ProviderFailed(ProviderFailedEvent),
    AccountChangeReceived(AccountChange),

    // Input events
    InputAccepted(InputAcceptedEvent),
    InputRejected(InputRejectedEvent),

    // Submission events
    SubmissionSent(SubmissionSentEvent),
    SubmissionFailed(SubmissionFailedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketRefreshedEvent {
    pub asset_price: Price,
    pub counterparty_liquidity: Decimal,
    pub account: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundsResolvedEvent {
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderFailedEvent {
    pub reason: String,
    // whether a previous snapshot is still in use
    pub kept_stale: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputAcceptedEvent {
    pub field: InputField,
    pub inputs: PositionInputs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputRejectedEvent {
    pub field: InputField,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionSentEvent {
    pub account: Address,
    pub tx_hash: String,
    pub collateral: Decimal,
    pub debt: Decimal,
    pub capital: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionFailedEvent {
    pub reason: String,
}

/// Bounded event log. Oldest events are dropped past `max_events`.
#[derive(Debug)]
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

    pub fn record(&mut self, timestamp: Timestamp, payload: EventPayload) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
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
}
