//! The world: every simulant state plus the services that act on it
//!
//! A [`World`] owns the state store, the event system, the tasklet queue and
//! shared handles to the capability registry and overlayer. All operations
//! run to completion on one thread; handlers and hooks receive the world
//! mutably and observe every change made before them.
//!
//! ## Organization
//!
//! - **simulants**: creation and destruction of screens, groups and entities
//! - **properties**: reflective property access and change publication
//! - **entities**: facet composition and spatial index maintenance
//! - **screens**: selection, transitions, camera and picking
//! - **overlays**: overlay reassignment and hot reload
//! - **descriptors**: reading and writing descriptors and descriptor files
//! - **clipboard**: copy, cut and paste of entities

mod clipboard;
mod descriptors;
mod entities;
mod error;
mod overlays;
mod properties;
mod screens;
mod simulants;
mod tasklets;

use std::rc::Rc;

use log::{debug, error};

pub use clipboard::Clipboard;
pub use error::WorldError;
pub use tasklets::{Tasklet, TaskletQueue};

use crate::composition::{BaseDispatcher, Registry};
use crate::core::config::WorldConfig;
use crate::events::{self, Event, EventData, EventHandler, EventSystem, Handling, SortStrategy, SubscriptionKey};
use crate::foundation::time::TickTime;
use crate::overlay::{self, Overlayer};
use crate::simulant::{Address, GameState, Simulant, SimulantKind};
use crate::store::StateStore;

/// A captured world revision, used for undo and redo
///
/// Capturing is cheap: states are shared with the live world until either
/// side changes them.
#[derive(Clone)]
pub struct WorldSnapshot {
    store: StateStore,
    tick_time: TickTime,
}

impl WorldSnapshot {
    /// States captured in this snapshot
    pub fn store(&self) -> &StateStore {
        &self.store
    }
}

/// Simulation state and the services acting on it
pub struct World {
    store: StateStore,
    events: EventSystem,
    tasklets: TaskletQueue,
    registry: Rc<Registry>,
    overlayer: Rc<Overlayer>,
    config: WorldConfig,
    tick_time: TickTime,
}

impl World {
    /// World whose game uses the base game dispatcher
    pub fn new(config: WorldConfig, registry: Registry, overlayer: Overlayer) -> Self {
        Self::with_game_dispatcher(config, registry, overlayer, BaseDispatcher::name_for(SimulantKind::Game))
    }

    /// World whose overlays come from the configured overlay file
    ///
    /// A missing or malformed overlay file is logged and replaced by an
    /// empty overlayer.
    pub fn from_config(config: WorldConfig, registry: Registry) -> Self {
        let overlayer = match config.overlay_file.as_deref() {
            Some(path) => Overlayer::load_from_file(path).unwrap_or_else(|error| {
                log::warn!("Could not load overlays from '{}' ({}); continuing without", path, error);
                Overlayer::new()
            }),
            None => Overlayer::new(),
        };
        Self::new(config, registry, overlayer)
    }

    /// World whose game uses the named dispatcher
    pub fn with_game_dispatcher(
        config: WorldConfig,
        registry: Registry,
        overlayer: Overlayer,
        game_dispatcher: &str,
    ) -> Self {
        let dispatcher = registry.resolve_dispatcher(game_dispatcher, SimulantKind::Game);
        let mut game = GameState::new(Rc::clone(&dispatcher));
        let overlay_name = overlayer.find_overlay_name(dispatcher.name());
        overlay::apply_overlay(None, overlayer.resolve(overlay_name.as_deref()), &mut game);
        game.common.overlay_name = overlay_name;

        let mut world = Self {
            store: StateStore::new(game),
            events: EventSystem::new(&config.events),
            tasklets: TaskletQueue::new(),
            registry: Rc::new(registry),
            overlayer: Rc::new(overlayer),
            config,
            tick_time: TickTime::ZERO,
        };
        dispatcher.register(&Simulant::Game, &mut world);
        world
    }

    /// World configuration
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Current tick
    pub fn tick_time(&self) -> TickTime {
        self.tick_time
    }

    /// Capability registry
    pub fn registry(&self) -> &Rc<Registry> {
        &self.registry
    }

    /// Active overlayer
    pub fn overlayer(&self) -> &Rc<Overlayer> {
        &self.overlayer
    }

    /// Every simulant state of the current revision
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Event subscriptions, filter and trace
    pub fn events(&self) -> &EventSystem {
        &self.events
    }

    /// Event subscriptions, filter and trace, mutably
    pub fn events_mut(&mut self) -> &mut EventSystem {
        &mut self.events
    }

    /// Capture the current simulant states
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            store: self.store.clone(),
            tick_time: self.tick_time,
        }
    }

    /// Substitute previously captured simulant states
    ///
    /// Subscriptions and pending tasklets are left as they are; spatial
    /// indexes of the restored screens rebuild lazily on first use.
    pub fn restore(&mut self, snapshot: WorldSnapshot) {
        debug!("Restoring snapshot from tick {}", snapshot.tick_time.0);
        self.store = snapshot.store;
    }

    /// Register a handler for events at `address`
    pub fn subscribe(&mut self, address: Address, subscriber: Simulant, handler: EventHandler) -> SubscriptionKey {
        self.events.subscribe(address, subscriber, handler)
    }

    /// Remove a subscription; unknown keys are ignored
    pub fn unsubscribe(&mut self, key: SubscriptionKey) {
        self.events.unsubscribe(key);
    }

    /// Subscribe for as long as `subscriber` lives
    ///
    /// The subscription is removed when the subscriber is destroyed, after
    /// its own unregistering event has been delivered. Removal does not
    /// depend on that event reaching anyone.
    pub fn monitor(&mut self, address: Address, subscriber: Simulant, handler: EventHandler) -> SubscriptionKey {
        self.events.monitor(address, subscriber, handler)
    }

    /// Deliver an event to every matching subscription
    ///
    /// Returns [`Handling::Resolve`] when a handler stopped delivery.
    /// Subscriptions removed by an earlier handler in the same call are
    /// skipped.
    pub fn publish(&mut self, data: EventData, address: Address, publisher: Simulant, sort: SortStrategy) -> Handling {
        if !self.events.allows(&address) {
            return Handling::Cascade;
        }
        self.events.record(&address, &data, &publisher);
        let subscriptions = self.events.subscriptions_for(&address, sort);
        let mut event = Event {
            data,
            address,
            publisher,
            subscriber: Simulant::Game,
        };
        for (key, subscriber, handler) in subscriptions {
            if !self.events.is_subscribed(key) {
                continue;
            }
            event.subscriber = subscriber;
            if handler(&event, self) == Handling::Resolve {
                return Handling::Resolve;
            }
        }
        Handling::Cascade
    }

    /// Publish with the configured default sort strategy
    pub fn publish_default(&mut self, data: EventData, address: Address, publisher: Simulant) -> Handling {
        let sort = self.events.default_sort();
        self.publish(data, address, publisher, sort)
    }

    /// Schedule a tasklet at `time`
    pub fn schedule(&mut self, time: TickTime, tasklet: Tasklet) {
        self.tasklets.schedule(time, tasklet);
    }

    /// Number of pending tasklets
    pub fn pending_tasklets(&self) -> usize {
        self.tasklets.len()
    }

    /// Advance the simulation by one tick
    ///
    /// Runs update hooks, publishes the update event, advances screen
    /// transitions, drains due tasklets and finally increments the clock.
    pub fn tick(&mut self) {
        self.run_updates();
        self.publish(EventData::Unit, events::update_event(), Simulant::Game, SortStrategy::None);
        if let Err(error) = self.advance_transitions() {
            error!("Screen transition failed: {}", error);
        }
        self.run_tasklets();
        self.tick_time = self.tick_time.next();
    }

    fn run_updates(&mut self) {
        let game = self.store.game();
        game.common.dispatcher.update(&Simulant::Game, self);

        let Some(screen) = self.selected_screen() else {
            return;
        };
        if let Some(state) = self.store.screens().try_get(screen.address()) {
            state.common.dispatcher.update(&Simulant::Screen(screen.clone()), self);
        }
        for group in self.store.directory().groups(&screen) {
            if let Some(state) = self.store.groups().try_get(group.address()) {
                state.common.dispatcher.update(&Simulant::Group(group.clone()), self);
            }
        }
        let entities = match self.entities_to_update(&screen) {
            Ok(entities) => entities,
            Err(error) => {
                error!("Could not collect entities of '{}' for update: {}", screen, error);
                return;
            }
        };
        for entity in entities {
            // an earlier hook may have destroyed it
            let Some(state) = self.store.entities().try_get(entity.address()) else {
                continue;
            };
            state.common.dispatcher.update(&Simulant::Entity(entity.clone()), self);
            for facet in &state.facets {
                facet.update(&entity, self);
            }
        }
    }

    fn run_tasklets(&mut self) {
        for tasklet in self.tasklets.take_due(self.tick_time) {
            if let Err(error) = tasklet(self) {
                error!("Tasklet failed at tick {}: {}", self.tick_time.0, error);
            }
        }
    }
}
