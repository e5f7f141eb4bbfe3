//! Capability provider traits

use std::fmt;

use crate::simulant::{Entity, PropertyDefinition, Simulant, SimulantKind};
use crate::world::World;

/// Mandatory, primary capability provider of a simulant
///
/// Hooks receive the world mutably and may read or write any simulant,
/// including the one being registered.
pub trait Dispatcher {
    /// Registry name
    fn name(&self) -> &str;

    /// Kind of simulant this dispatcher serves
    fn kind(&self) -> SimulantKind;

    /// Properties attached to every simulant using this dispatcher
    fn property_definitions(&self) -> Vec<PropertyDefinition> {
        Vec::new()
    }

    /// Whether a facet may be stacked on simulants using this dispatcher
    fn is_facet_compatible(&self, _facet_name: &str) -> bool {
        true
    }

    /// Called after the simulant is added to the world
    fn register(&self, _simulant: &Simulant, _world: &mut World) {}

    /// Called before the simulant is removed from the world
    fn unregister(&self, _simulant: &Simulant, _world: &mut World) {}

    /// Called once per tick while the simulant is active
    fn update(&self, _simulant: &Simulant, _world: &mut World) {}
}

/// Optional, stackable entity capability
pub trait Facet {
    /// Registry name
    fn name(&self) -> &str;

    /// Properties this facet attaches
    fn property_definitions(&self) -> Vec<PropertyDefinition> {
        Vec::new()
    }

    /// Called after the facet is attached to a live entity
    fn register(&self, _entity: &Entity, _world: &mut World) {}

    /// Called before the facet is detached from a live entity
    fn unregister(&self, _entity: &Entity, _world: &mut World) {}

    /// Called once per tick while the entity is active
    fn update(&self, _entity: &Entity, _world: &mut World) {}
}

impl fmt::Debug for dyn Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dispatcher({})", self.name())
    }
}

impl fmt::Debug for dyn Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Facet({})", self.name())
    }
}

/// Behaviourless dispatcher used as the fallback for each kind
#[derive(Debug, Clone, Copy)]
pub struct BaseDispatcher {
    kind: SimulantKind,
}

impl BaseDispatcher {
    /// Base dispatcher for a kind
    pub const fn new(kind: SimulantKind) -> Self {
        Self { kind }
    }

    /// Registry name of the base dispatcher for a kind
    pub const fn name_for(kind: SimulantKind) -> &'static str {
        match kind {
            SimulantKind::Game => "GameDispatcher",
            SimulantKind::Screen => "ScreenDispatcher",
            SimulantKind::Group => "GroupDispatcher",
            SimulantKind::Entity => "EntityDispatcher",
        }
    }
}

impl Dispatcher for BaseDispatcher {
    fn name(&self) -> &str {
        Self::name_for(self.kind)
    }

    fn kind(&self) -> SimulantKind {
        self.kind
    }
}
