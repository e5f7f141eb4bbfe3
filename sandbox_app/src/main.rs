//! Sandbox
//!
//! Boots a world from a config file, fills a screen with spinning props,
//! runs it for a while and saves the screen as a descriptor:
//! - `sandbox [config.toml|config.ron] [output.ron]`
//! - missing or unreadable config falls back to defaults

use std::cell::Cell;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::rc::Rc;

use simulant_engine::foundation::logging::{self, info, warn};
use simulant_engine::prelude::*;

const PROP_COUNT: usize = 12;
const TICKS: usize = 90;

/// Turns its entity a little every tick
struct SpinFacet;

impl Facet for SpinFacet {
    fn name(&self) -> &str {
        "Spin"
    }

    fn property_definitions(&self) -> Vec<PropertyDefinition> {
        vec![PropertyDefinition::new("SpinRate", 0.05_f32)]
    }

    fn update(&self, entity: &Entity, world: &mut World) {
        let simulant = Simulant::Entity(entity.clone());
        let rate = world.try_get_property(&simulant, "SpinRate").and_then(|value| value.as_float()).unwrap_or(0.0);
        let rotation = world.try_get_property(&simulant, "Rotation").and_then(|value| value.as_float()).unwrap_or(0.0);
        if let Err(error) = world.set_property(&simulant, "Rotation", Value::Float(rotation + rate)) {
            warn!("Could not spin '{}': {}", entity, error);
        }
    }
}

fn build_arena(world: &mut World) -> Result<Screen, WorldError> {
    let arena = world.create_screen("ScreenDispatcher", Some("Arena"))?;
    let props = world.create_group("GroupDispatcher", &arena, Some("Props"))?;
    let spin: BTreeSet<String> = ["Spin".to_string()].into();

    for index in 0..PROP_COUNT {
        let name = format!("Prop{index}");
        let entity = world.create_entity("EntityDispatcher", &props, Some(name.as_str()))?;
        let simulant = Simulant::Entity(entity.clone());
        let offset = index as f32 * 40.0 - 200.0;
        world.set_property(&simulant, "Position", Vec2::new(offset, offset * 0.5).into())?;
        world.set_property(&simulant, "Size", Vec2::new(16.0, 16.0).into())?;
        world.set_property(&simulant, "Depth", Value::Float(index as f32))?;
        if index % 3 == 0 {
            world.set_entity_facet_names(&entity, spin.clone())?;
        }
    }
    Ok(arena)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "sandbox.toml".to_string());
    let output_path = args
        .next()
        .map_or_else(|| std::env::temp_dir().join("arena.ron"), PathBuf::from);

    let config = WorldConfig::load_or_default(&config_path);
    let registry = Registry::new().with_facet(SpinFacet);
    let mut world = World::from_config(config, registry);

    let registered = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&registered);
    world.subscribe(
        Address::parse("Register/Event/**"),
        Simulant::Game,
        Rc::new(move |_: &Event, _: &mut World| {
            counter.set(counter.get() + 1);
            Handling::Cascade
        }),
    );

    let arena = build_arena(&mut world)?;
    world.transition_screen(&arena)?;
    for _ in 0..TICKS {
        world.tick();
    }

    let in_view = world.get_entities_in_view(&arena)?;
    let picked = world.pick_entities(&arena, Vec2::zeros())?;
    info!(
        "After {} ticks: {} simulants registered, {} in view, {} under the eye",
        world.tick_time().0,
        registered.get(),
        in_view.len(),
        picked.len()
    );

    world.write_screen_to_file(&arena, &output_path)?;
    println!("Saved '{}' to {}", arena, output_path.display());
    Ok(())
}
