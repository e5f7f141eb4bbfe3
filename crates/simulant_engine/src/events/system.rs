//! Subscription bookkeeping, filtering and tracing
//!
//! The system only stores subscriptions and answers "who receives this
//! event, in what order". Delivery itself happens in the world, which owns
//! the mutable state the handlers receive.

use std::collections::{HashMap, VecDeque};

use log::trace;
use slotmap::{new_key_type, SlotMap};

use super::{EventData, EventHandler, SortStrategy};
use crate::core::config::EventConfig;
use crate::simulant::{Address, Simulant};

new_key_type! {
    /// Handle returned by subscribe, used to unsubscribe
    pub struct SubscriptionKey;
}

struct Subscription {
    address: Address,
    subscriber: Simulant,
    handler: EventHandler,
    sequence: u64,
}

/// Suppresses publication at matching addresses without touching subscriptions
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    suppressed: Vec<Address>,
}

impl EventFilter {
    /// Filter allowing everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Also suppress events whose address matches `pattern`
    #[must_use]
    pub fn suppress(mut self, pattern: impl Into<Address>) -> Self {
        self.suppressed.push(pattern.into());
        self
    }

    /// Whether an event at `address` may be published
    pub fn allows(&self, address: &Address) -> bool {
        !self.suppressed.iter().any(|pattern| address.matches(pattern))
    }
}

/// One recorded publish call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    /// Event address
    pub address: Address,
    /// Payload shape
    pub shape: &'static str,
    /// Publisher
    pub publisher: Simulant,
}

/// Registry of subscriptions keyed by event address
pub struct EventSystem {
    subscriptions: SlotMap<SubscriptionKey, Subscription>,
    exact: HashMap<Address, Vec<SubscriptionKey>>,
    patterns: Vec<SubscriptionKey>,
    monitors: HashMap<Simulant, Vec<SubscriptionKey>>,
    next_sequence: u64,
    filter: EventFilter,
    tracing: bool,
    trace_capacity: usize,
    trace_log: VecDeque<TraceEntry>,
    default_sort: SortStrategy,
}

impl EventSystem {
    /// Create an empty event system
    pub fn new(config: &EventConfig) -> Self {
        Self {
            subscriptions: SlotMap::with_key(),
            exact: HashMap::new(),
            patterns: Vec::new(),
            monitors: HashMap::new(),
            next_sequence: 0,
            filter: EventFilter::allow_all(),
            tracing: config.tracing,
            trace_capacity: config.trace_capacity,
            trace_log: VecDeque::new(),
            default_sort: config.default_sort,
        }
    }

    /// Register a handler for events at `address`
    pub fn subscribe(&mut self, address: Address, subscriber: Simulant, handler: EventHandler) -> SubscriptionKey {
        let pattern = address.is_pattern();
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let key = self.subscriptions.insert(Subscription {
            address: address.clone(),
            subscriber,
            handler,
            sequence,
        });
        if pattern {
            self.patterns.push(key);
        } else {
            self.exact.entry(address).or_default().push(key);
        }
        key
    }

    /// Remove a subscription; unknown keys are ignored
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        let Some(subscription) = self.subscriptions.remove(key) else {
            return false;
        };
        if subscription.address.is_pattern() {
            self.patterns.retain(|other| *other != key);
        } else if let Some(keys) = self.exact.get_mut(&subscription.address) {
            keys.retain(|other| *other != key);
            if keys.is_empty() {
                self.exact.remove(&subscription.address);
            }
        }
        true
    }

    /// Register a handler that lives only as long as `subscriber`
    ///
    /// The key is remembered against the subscriber and dropped by
    /// [`EventSystem::release_monitors`].
    pub fn monitor(&mut self, address: Address, subscriber: Simulant, handler: EventHandler) -> SubscriptionKey {
        let key = self.subscribe(address, subscriber.clone(), handler);
        self.monitors.entry(subscriber).or_default().push(key);
        key
    }

    /// Remove every monitor held by `subscriber`, returning how many were live
    pub fn release_monitors(&mut self, subscriber: &Simulant) -> usize {
        let Some(keys) = self.monitors.remove(subscriber) else {
            return 0;
        };
        keys.into_iter().filter(|key| self.unsubscribe(*key)).count()
    }

    /// Whether a subscription is still live
    pub fn is_subscribed(&self, key: SubscriptionKey) -> bool {
        self.subscriptions.contains_key(key)
    }

    /// Number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Subscriptions receiving an event at `address`, in delivery order
    pub fn subscriptions_for(
        &self,
        address: &Address,
        sort: SortStrategy,
    ) -> Vec<(SubscriptionKey, Simulant, EventHandler)> {
        let exact = self.exact.get(address).into_iter().flatten();
        let patterns = self
            .patterns
            .iter()
            .filter(|key| {
                self.subscriptions
                    .get(**key)
                    .is_some_and(|subscription| address.matches(&subscription.address))
            });
        let mut matching: Vec<(SubscriptionKey, &Subscription)> = exact
            .chain(patterns)
            .filter_map(|key| self.subscriptions.get(*key).map(|subscription| (*key, subscription)))
            .collect();

        if sort == SortStrategy::ByHierarchy {
            matching.sort_by_key(|(_, subscription)| (subscription.subscriber.depth(), subscription.sequence));
        }

        matching
            .into_iter()
            .map(|(key, subscription)| (key, subscription.subscriber.clone(), subscription.handler.clone()))
            .collect()
    }

    /// Sort strategy used for change and lifecycle events
    pub fn default_sort(&self) -> SortStrategy {
        self.default_sort
    }

    /// Replace the publication filter
    pub fn set_filter(&mut self, filter: EventFilter) {
        self.filter = filter;
    }

    /// Whether the filter lets an event at `address` through
    pub fn allows(&self, address: &Address) -> bool {
        self.filter.allows(address)
    }

    /// Turn publish tracing on or off
    pub fn set_tracing(&mut self, tracing: bool) {
        self.tracing = tracing;
    }

    /// Whether publish tracing is on
    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    /// Record a publish call when tracing is on
    pub fn record(&mut self, address: &Address, data: &EventData, publisher: &Simulant) {
        if !self.tracing {
            return;
        }
        trace!("Publish {} [{}] from {}", address, data.shape(), publisher);
        if self.trace_log.len() == self.trace_capacity {
            self.trace_log.pop_front();
        }
        if self.trace_capacity > 0 {
            self.trace_log.push_back(TraceEntry {
                address: address.clone(),
                shape: data.shape(),
                publisher: publisher.clone(),
            });
        }
    }

    /// Recorded publish calls, oldest first
    pub fn trace_log(&self) -> impl Iterator<Item = &TraceEntry> {
        self.trace_log.iter()
    }

    /// Forget recorded publish calls
    pub fn clear_trace(&mut self) {
        self.trace_log.clear();
    }
}
