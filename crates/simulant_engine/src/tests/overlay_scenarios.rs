//! Overlay routing, reassignment and hot reload

use std::collections::BTreeSet;

use super::{populate, world_with_overlays};
use crate::foundation::math::Vec2;
use crate::overlay::{Overlay, Overlayer};
use crate::simulant::state::{FACET_NAMES, OVERLAY_NAME};
use crate::simulant::{Simulant, Value};

fn bullet_overlay(size: f32, depth: f32) -> Overlay {
    Overlay {
        facet_names: ["Mover".to_string()].into(),
        properties: [
            ("Size".to_string(), Value::Vec2(Vec2::new(size, size))),
            ("Depth".to_string(), Value::Float(depth)),
        ]
        .into(),
    }
}

fn overlayer(size: f32, depth: f32) -> Overlayer {
    Overlayer::new()
        .with_overlay("Bullet", bullet_overlay(size, depth))
        .with_overlay(
            "Lamp",
            Overlay {
                facet_names: ["Glow".to_string()].into(),
                properties: [("Brightness".to_string(), Value::Float(4.0))].into(),
            },
        )
        .with_route("EntityDispatcher", "Bullet")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routed_overlay_seeds_new_entities() {
        let mut world = world_with_overlays(overlayer(2.0, 1.0));
        let (_, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
        let simulant = Simulant::Entity(entity);

        assert_eq!(world.try_get_property(&simulant, OVERLAY_NAME), Some(Value::OptionalName(Some("Bullet".into()))));
        assert_eq!(world.try_get_property(&simulant, "Size"), Some(Value::Vec2(Vec2::new(2.0, 2.0))));
        assert_eq!(world.try_get_property(&simulant, "Speed"), Some(Value::Int(5)));
    }

    #[test]
    fn test_reload_preserves_customisation() {
        let mut world = world_with_overlays(overlayer(2.0, 1.0));
        let (_, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
        let simulant = Simulant::Entity(entity);
        world.set_property(&simulant, "Depth", Value::Float(7.0)).unwrap();

        world.reload_overlays(overlayer(4.0, 2.0)).unwrap();

        assert_eq!(world.try_get_property(&simulant, "Size"), Some(Value::Vec2(Vec2::new(4.0, 4.0))));
        assert_eq!(world.try_get_property(&simulant, "Depth"), Some(Value::Float(7.0)));
    }

    #[test]
    fn test_reload_keeps_user_facets() {
        let mut world = world_with_overlays(overlayer(2.0, 1.0));
        let (_, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
        let user_facets: BTreeSet<String> = ["Mover".to_string(), "Glow".to_string()].into();
        world.set_entity_facet_names(&entity, user_facets.clone()).unwrap();

        let without_mover = Overlayer::new()
            .with_overlay("Bullet", Overlay { facet_names: BTreeSet::new(), ..bullet_overlay(2.0, 1.0) })
            .with_route("EntityDispatcher", "Bullet");
        world.reload_overlays(without_mover).unwrap();

        let expected: BTreeSet<String> = ["Glow".to_string()].into();
        assert_eq!(world.try_get_property(&Simulant::Entity(entity.clone()), FACET_NAMES), Some(Value::Names(expected)));
        assert!(world.entity_state(&entity).unwrap().facet("Mover").is_none());
    }

    #[test]
    fn test_reassigning_overlay_swaps_template() {
        let mut world = world_with_overlays(overlayer(2.0, 1.0));
        let (_, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
        let simulant = Simulant::Entity(entity.clone());

        world.set_overlay_name(&simulant, Some("Lamp".to_string())).unwrap();
        let state = world.entity_state(&entity).unwrap();
        assert!(state.facet("Glow").is_some());
        assert!(state.facet("Mover").is_none());
        assert_eq!(state.size, Vec2::new(1.0, 1.0));
        assert_eq!(world.try_get_property(&simulant, "Brightness"), Some(Value::Float(4.0)));

        world.set_property(&simulant, OVERLAY_NAME, Value::OptionalName(None)).unwrap();
        assert_eq!(world.overlay_name(&simulant).unwrap(), None);
        assert!(world.entity_state(&entity).unwrap().facets.is_empty());
    }
}
