//! Address directory and state store
//!
//! State records are held behind `Rc` in copy-on-write maps, so cloning the
//! whole store (a world snapshot) is cheap and unchanged records stay shared
//! between snapshots.

mod directory;
mod simulant_store;
mod state_store;

use std::rc::Rc;

pub use directory::AddressDirectory;
pub use simulant_store::SimulantStore;
pub use state_store::StateStore;

use crate::simulant::{Address, EntityState, GameState, GroupState, ScreenState, SimulantState};

/// State store failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Nothing is stored at the address
    #[error("No simulant at '{0}'")]
    NotFound(Address),

    /// A simulant already exists and replacement was not permitted
    #[error("Simulant already exists at '{0}'")]
    AlreadyExists(Address),

    /// The parent screen or group does not exist
    #[error("Parent of '{0}' does not exist")]
    MissingParent(Address),
}

/// A shared reference to a previous state of any kind
#[derive(Debug, Clone)]
pub enum StateSnapshot {
    /// Game state
    Game(Rc<GameState>),
    /// Screen state
    Screen(Rc<ScreenState>),
    /// Group state
    Group(Rc<GroupState>),
    /// Entity state
    Entity(Rc<EntityState>),
}

impl StateSnapshot {
    /// Read a property from the captured state
    pub fn get_property(&self, name: &str) -> Option<crate::simulant::Value> {
        match self {
            Self::Game(state) => state.get_property(name).ok(),
            Self::Screen(state) => state.get_property(name).ok(),
            Self::Group(state) => state.get_property(name).ok(),
            Self::Entity(state) => state.get_property(name).ok(),
        }
    }
}

/// A state kind the [`StateStore`] can look up and replace by address
pub trait StoredState: SimulantState {
    /// Fetch the state at `address`
    fn lookup(store: &StateStore, address: &Address) -> Result<Rc<Self>, StoreError>;

    /// Replace the state at an existing `address`
    fn replace(store: &mut StateStore, address: &Address, state: Rc<Self>);

    /// Wrap as a kind-erased snapshot
    fn into_snapshot(state: Rc<Self>) -> StateSnapshot;
}

impl StoredState for GameState {
    fn lookup(store: &StateStore, _address: &Address) -> Result<Rc<Self>, StoreError> {
        Ok(store.game())
    }

    fn replace(store: &mut StateStore, _address: &Address, state: Rc<Self>) {
        store.set_game(state);
    }

    fn into_snapshot(state: Rc<Self>) -> StateSnapshot {
        StateSnapshot::Game(state)
    }
}

impl StoredState for ScreenState {
    fn lookup(store: &StateStore, address: &Address) -> Result<Rc<Self>, StoreError> {
        store.screens().get(address)
    }

    fn replace(store: &mut StateStore, address: &Address, state: Rc<Self>) {
        store.screens_mut().set(address, state);
    }

    fn into_snapshot(state: Rc<Self>) -> StateSnapshot {
        StateSnapshot::Screen(state)
    }
}

impl StoredState for GroupState {
    fn lookup(store: &StateStore, address: &Address) -> Result<Rc<Self>, StoreError> {
        store.groups().get(address)
    }

    fn replace(store: &mut StateStore, address: &Address, state: Rc<Self>) {
        store.groups_mut().set(address, state);
    }

    fn into_snapshot(state: Rc<Self>) -> StateSnapshot {
        StateSnapshot::Group(state)
    }
}

impl StoredState for EntityState {
    fn lookup(store: &StateStore, address: &Address) -> Result<Rc<Self>, StoreError> {
        store.entities().get(address)
    }

    fn replace(store: &mut StateStore, address: &Address, state: Rc<Self>) {
        store.entities_mut().set(address, state);
    }

    fn into_snapshot(state: Rc<Self>) -> StateSnapshot {
        StateSnapshot::Entity(state)
    }
}
