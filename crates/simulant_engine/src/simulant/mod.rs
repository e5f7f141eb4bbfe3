//! Simulants: addresses, handles, property values and state records
//!
//! A simulant is anything addressable in the Game→Screen→Group→Entity
//! hierarchy. Handles are cheap typed wrappers over structural [`Address`]es;
//! the data lives in the state records held by the world's state store.

mod address;
mod handles;
pub mod property;
pub mod state;

pub use address::{Address, WILDCARD, WILDCARD_REST};
pub use handles::{Entity, Group, InvalidAddress, Screen, Simulant, SimulantKind};
pub use property::{PropertyDefinition, PropertyError, Value, ValueType, ViewType, Xtension};
pub use state::{
    EntityFlags, EntityState, GameState, GroupState, ScreenState, SimulantCommon, SimulantState,
    Transition, TransitionState, TransitionType,
};
