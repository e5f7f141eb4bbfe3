//! Facet composition through the world
//!
//! Attaching, detaching and re-composing facets by name, and the property
//! bag entries that follow them.

use std::collections::BTreeSet;

use super::{populate, registry_with, world, Mover};
use crate::composition::CompositionError;
use crate::core::config::WorldConfig;
use crate::overlay::Overlayer;
use crate::simulant::state::FACET_NAMES;
use crate::simulant::{Simulant, Value, ValueType};
use crate::world::{World, WorldError};

fn names(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_property_follows_facet() {
        let mut world = world();
        let (_, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, Some("Ship")).unwrap();
        let simulant = Simulant::Entity(entity.clone());

        world.set_entity_facet_names(&entity, names(&["Mover"])).unwrap();
        let (speed, ty) = world.get_property(&simulant, "Speed").unwrap();
        assert_eq!(speed, Value::Int(5));
        assert_eq!(ty, ValueType::Int);

        world.set_entity_facet_names(&entity, BTreeSet::new()).unwrap();
        let error = world.get_property(&simulant, "Speed").unwrap_err();
        assert!(error.is_not_found());
    }

    #[test]
    fn test_facet_names_reflect_request() {
        let mut world = world();
        let (_, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
        let simulant = Simulant::Entity(entity.clone());

        for request in [names(&["Mover", "Glow"]), names(&["Glow"]), names(&[]), names(&["Mover"])] {
            world.set_entity_facet_names(&entity, request.clone()).unwrap();
            assert_eq!(world.try_get_property(&simulant, FACET_NAMES), Some(Value::Names(request.clone())));
            let attached: BTreeSet<String> =
                world.entity_state(&entity).unwrap().facets.iter().map(|facet| facet.name().to_string()).collect();
            assert_eq!(attached, request);
        }
    }

    #[test]
    fn test_same_names_twice_is_idempotent() {
        let mover = Mover::new();
        let (registers, unregisters) = (mover.registers.clone(), mover.unregisters.clone());
        let mut world = World::new(WorldConfig::default(), registry_with(mover), Overlayer::new());
        let (_, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
        let simulant = Simulant::Entity(entity.clone());

        world.set_entity_facet_names(&entity, names(&["Mover"])).unwrap();
        world.set_property(&simulant, "Speed", Value::Int(9)).unwrap();
        world.set_entity_facet_names(&entity, names(&["Mover"])).unwrap();

        assert_eq!(world.try_get_property(&simulant, "Speed"), Some(Value::Int(9)));
        assert_eq!(registers.get(), 1);
        assert_eq!(unregisters.get(), 0);
    }

    #[test]
    fn test_destroy_runs_facet_unregister() {
        let mover = Mover::new();
        let unregisters = mover.unregisters.clone();
        let mut world = World::new(WorldConfig::default(), registry_with(mover), Overlayer::new());
        let (_, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
        world.set_entity_facet_names(&entity, names(&["Mover"])).unwrap();

        world.destroy_entity_immediate(&entity).unwrap();
        assert_eq!(unregisters.get(), 1);
    }

    #[test]
    fn test_failed_composition_changes_nothing() {
        let mut world = world();
        let (_, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
        world.set_entity_facet_names(&entity, names(&["Mover"])).unwrap();

        let result = world.set_entity_facet_names(&entity, names(&["Glow", "Nonexistent"]));
        assert!(matches!(
            result,
            Err(WorldError::Composition(CompositionError::UnknownFacet(ref name))) if name == "Nonexistent"
        ));
        let state = world.entity_state(&entity).unwrap();
        assert_eq!(state.facet_names, names(&["Mover"]));
        assert!(state.facet("Glow").is_none());
        assert!(state.common.xtension.contains("Speed"));
    }

    #[test]
    fn test_dispatcher_rejects_incompatible_facet() {
        let mut world = world();
        let (_, group) = populate(&mut world);
        let bullet = world.create_entity("BulletDispatcher", &group, None).unwrap();
        let simulant = Simulant::Entity(bullet.clone());
        assert_eq!(world.try_get_property(&simulant, "Damage"), Some(Value::Int(3)));

        let result = world.set_property(&simulant, FACET_NAMES, Value::Names(names(&["Glow"])));
        assert!(matches!(result, Err(WorldError::Composition(CompositionError::IncompatibleFacet { .. }))));
        world.set_property(&simulant, FACET_NAMES, Value::Names(names(&["Mover"]))).unwrap();
        assert_eq!(world.try_get_property(&simulant, "Speed"), Some(Value::Int(5)));
    }

    #[test]
    fn test_invariant_violations_are_classified() {
        let mut world = world();
        let (screen, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, Some("Twin")).unwrap();

        let duplicate = world.create_entity("EntityDispatcher", &group, Some("Twin")).unwrap_err();
        assert!(duplicate.is_invariant_violation());

        let orphan_screen = crate::simulant::Screen::new("Missing");
        let orphan = world.create_group("GroupDispatcher", &orphan_screen, None).unwrap_err();
        assert!(orphan.is_invariant_violation());

        let immutable = world.set_property(&Simulant::Entity(entity.clone()), "Id", Value::Int(1)).unwrap_err();
        assert!(immutable.is_invariant_violation());

        let mismatch = world
            .set_property(&Simulant::Entity(entity), "Position", Value::Int(1))
            .unwrap_err();
        assert!(!mismatch.is_invariant_violation());
        assert!(world.contains(&Simulant::Screen(screen)));
    }

    #[test]
    fn test_detach_property_spares_facet_properties() {
        let mut world = world();
        let (_, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
        let simulant = Simulant::Entity(entity.clone());
        world.set_entity_facet_names(&entity, names(&["Mover"])).unwrap();
        world.attach_property(&simulant, "Score", Value::Int(3)).unwrap();

        world.detach_property(&simulant, "Score").unwrap();
        assert!(world.get_property(&simulant, "Score").unwrap_err().is_not_found());
        assert!(world.detach_property(&simulant, "Score").unwrap_err().is_not_found());

        let error = world.detach_property(&simulant, "Speed").unwrap_err();
        assert!(error.is_invariant_violation());
        assert_eq!(world.try_get_property(&simulant, "Speed"), Some(Value::Int(5)));
    }
}
