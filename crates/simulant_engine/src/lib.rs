//! # Simulant Engine
//!
//! The simulation-state core of a 2D game engine: a hierarchy of addressable
//! simulants whose state lives in cheaply snapshotted stores.
//!
//! ## Features
//!
//! - **Addressable Simulants**: game, screens, groups and entities named by
//!   hierarchical addresses
//! - **Reflective Properties**: typed intrinsic, capability and dynamic
//!   properties behind one get/set surface
//! - **Facet Composition**: entity capabilities attached and detached by name
//! - **Overlays**: named templates that survive hot reloads without clobbering
//!   user edits
//! - **Events**: address-pattern subscriptions with hierarchy-ordered delivery
//! - **Spatial Indexing**: a per-screen quadtree kept consistent across undo
//! - **Descriptors**: persistent simulant trees as RON documents
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use simulant_engine::prelude::*;
//!
//! fn main() -> Result<(), WorldError> {
//!     let mut world = World::new(WorldConfig::default(), Registry::new(), Overlayer::new());
//!     let screen = world.create_screen("ScreenDispatcher", Some("Title"))?;
//!     let group = world.create_group("GroupDispatcher", &screen, Some("Hud"))?;
//!     let entity = world.create_entity("EntityDispatcher", &group, Some("Logo"))?;
//!     world.set_property(&entity.clone().into(), "Position", Vec2::new(10.0, 4.0).into())?;
//!     world.select_screen(&screen)?;
//!     world.tick();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Shared configuration
pub mod core;
pub mod config;

// Building blocks
pub mod foundation;
pub mod simulant;
pub mod spatial;
pub mod composition;
pub mod events;
pub mod store;
pub mod overlay;
pub mod descriptor;

// The world and its services
pub mod world;

#[cfg(test)]
mod tests;

pub use world::{Clipboard, World, WorldError, WorldSnapshot};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        World, WorldError, WorldSnapshot, Clipboard,
        composition::{Dispatcher, Facet, Registry},
        core::config::{WorldConfig, EventConfig, TransitionConfig, Config},
        descriptor::{Descriptor, EntityDescriptor, GroupDescriptor, ScreenDescriptor, GameDescriptor},
        events::{Event, EventData, EventHandler, Handling, SortStrategy},
        foundation::math::{Bounds, Vec2},
        overlay::{Overlay, Overlayer},
        simulant::{Address, Entity, Group, Screen, Simulant, SimulantKind, PropertyDefinition, Value, ValueType},
    };
}
