//! Cross-module scenarios
//!
//! Each file drives a [`World`] through one area end to end. Shared fixtures
//! live here.

mod composition_scenarios;
mod overlay_scenarios;
mod spatial_scenarios;
mod screen_scenarios;

use std::cell::Cell;
use std::rc::Rc;

use crate::composition::{Dispatcher, Facet, Registry};
use crate::core::config::WorldConfig;
use crate::overlay::Overlayer;
use crate::simulant::{Entity, Group, PropertyDefinition, Screen, SimulantKind};
use crate::world::World;

/// Facet declaring `Speed: Int = 5` and counting its lifecycle hooks
pub(crate) struct Mover {
    pub registers: Rc<Cell<usize>>,
    pub unregisters: Rc<Cell<usize>>,
}

impl Mover {
    pub fn new() -> Self {
        Self {
            registers: Rc::new(Cell::new(0)),
            unregisters: Rc::new(Cell::new(0)),
        }
    }
}

impl Facet for Mover {
    fn name(&self) -> &str {
        "Mover"
    }

    fn property_definitions(&self) -> Vec<PropertyDefinition> {
        vec![PropertyDefinition::new("Speed", 5_i64)]
    }

    fn register(&self, _entity: &Entity, _world: &mut World) {
        self.registers.set(self.registers.get() + 1);
    }

    fn unregister(&self, _entity: &Entity, _world: &mut World) {
        self.unregisters.set(self.unregisters.get() + 1);
    }
}

/// Facet declaring `Brightness: Float = 1.0`
pub(crate) struct Glow;

impl Facet for Glow {
    fn name(&self) -> &str {
        "Glow"
    }

    fn property_definitions(&self) -> Vec<PropertyDefinition> {
        vec![PropertyDefinition::new("Brightness", 1.0_f32)]
    }
}

/// Facet redeclaring the intrinsic `Depth: Float` with its own default
pub(crate) struct Layered;

impl Facet for Layered {
    fn name(&self) -> &str {
        "Layered"
    }

    fn property_definitions(&self) -> Vec<PropertyDefinition> {
        vec![PropertyDefinition::new("Depth", 2.0_f32)]
    }
}

/// Entity dispatcher declaring `Damage: Int = 3` that refuses the glow facet
pub(crate) struct BulletDispatcher;

impl Dispatcher for BulletDispatcher {
    fn name(&self) -> &str {
        "BulletDispatcher"
    }

    fn kind(&self) -> SimulantKind {
        SimulantKind::Entity
    }

    fn property_definitions(&self) -> Vec<PropertyDefinition> {
        vec![PropertyDefinition::new("Damage", 3_i64)]
    }

    fn is_facet_compatible(&self, facet_name: &str) -> bool {
        facet_name != "Glow"
    }
}

pub(crate) fn registry_with(mover: Mover) -> Registry {
    Registry::new().with_facet(mover).with_facet(Glow).with_facet(Layered).with_dispatcher(BulletDispatcher)
}

pub(crate) fn registry() -> Registry {
    registry_with(Mover::new())
}

pub(crate) fn world() -> World {
    World::new(WorldConfig::default(), registry(), Overlayer::new())
}

pub(crate) fn world_with_overlays(overlayer: Overlayer) -> World {
    World::new(WorldConfig::default(), registry(), overlayer)
}

/// A screen named "Level" holding a group named "Actors"
pub(crate) fn populate(world: &mut World) -> (Screen, Group) {
    let screen = world.create_screen("ScreenDispatcher", Some("Level")).unwrap();
    let group = world.create_group("GroupDispatcher", &screen, Some("Actors")).unwrap();
    (screen, group)
}
