//! Hierarchical publish/subscribe
//!
//! Events are published at an [`Address`] and delivered to every subscription
//! whose address equals it or, for wildcard subscriptions, matches it.
//! - Handlers run in the order given by a [`SortStrategy`]
//! - A handler returns [`Handling::Resolve`] to stop further delivery
//! - Handlers receive the world mutably and may subscribe, unsubscribe or publish

mod addresses;
mod system;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use addresses::*;
pub use system::{EventFilter, EventSystem, SubscriptionKey, TraceEntry};

use crate::simulant::{Address, Simulant, Value};
use crate::store::StateSnapshot;
use crate::world::World;

/// Whether delivery continues after a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling {
    /// Keep delivering to later subscribers
    Cascade,
    /// Stop delivery for this publish call
    Resolve,
}

/// Order in which subscribers receive an event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortStrategy {
    /// Shallower subscribers first, then subscription order
    #[default]
    ByHierarchy,
    /// Subscription order, exact subscriptions before wildcard ones
    None,
}

/// Payload of a property change event
#[derive(Debug, Clone)]
pub struct ChangeData {
    /// Name of the written property
    pub property_name: String,
    /// The simulant's state before the write
    pub previous: StateSnapshot,
}

/// Event payload
#[derive(Debug, Clone)]
pub enum EventData {
    /// No payload
    Unit,
    /// Property change
    Change(ChangeData),
    /// Arbitrary value
    Value(Value),
    /// A simulant reference
    Simulant(Simulant),
}

impl EventData {
    /// Short name of the payload shape, for tracing
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Unit => "Unit",
            Self::Change(_) => "Change",
            Self::Value(_) => "Value",
            Self::Simulant(_) => "Simulant",
        }
    }
}

/// An event as seen by one handler
#[derive(Debug, Clone)]
pub struct Event {
    /// Payload
    pub data: EventData,
    /// Address the event was published at
    pub address: Address,
    /// Simulant that published the event
    pub publisher: Simulant,
    /// Simulant the receiving subscription belongs to
    pub subscriber: Simulant,
}

/// Subscription callback
pub type EventHandler = Rc<dyn Fn(&Event, &mut World) -> Handling>;
