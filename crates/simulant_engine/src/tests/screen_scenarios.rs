//! Screens over time: transitions, deferred destruction, view and picking

use std::cell::RefCell;
use std::rc::Rc;

use super::{populate, registry};
use crate::core::config::{TransitionConfig, WorldConfig};
use crate::events::{self, Event, EventHandler, Handling};
use crate::foundation::math::Vec2;
use crate::overlay::Overlayer;
use crate::simulant::{Address, Entity, Group, Screen, Simulant, TransitionState, Value, ViewType};
use crate::world::World;

fn short_transitions() -> World {
    let config = WorldConfig {
        transition: TransitionConfig { incoming_lifetime: 2, outgoing_lifetime: 2 },
        ..WorldConfig::default()
    };
    World::new(config, registry(), Overlayer::new())
}

fn log_to(log: &Rc<RefCell<Vec<String>>>, label: &str) -> EventHandler {
    let log = Rc::clone(log);
    let label = label.to_string();
    Rc::new(move |_: &Event, _: &mut World| {
        log.borrow_mut().push(label.clone());
        Handling::Cascade
    })
}

fn spawn(world: &mut World, group: &Group, name: &str, position: Vec2, size: Vec2, depth: f32) -> Entity {
    let entity = world.create_entity("EntityDispatcher", group, Some(name)).unwrap();
    let simulant = Simulant::Entity(entity.clone());
    world.set_property(&simulant, "Position", position.into()).unwrap();
    world.set_property(&simulant, "Size", size.into()).unwrap();
    world.set_property(&simulant, "Depth", Value::Float(depth)).unwrap();
    entity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_runs_out_then_in() {
        let mut world = short_transitions();
        let title = world.create_screen("ScreenDispatcher", Some("Title")).unwrap();
        let level = world.create_screen("ScreenDispatcher", Some("Level")).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        world.subscribe(events::outgoing_finish_event(title.address()), Simulant::Game, log_to(&log, "title out"));
        world.subscribe(events::incoming_start_event(level.address()), Simulant::Game, log_to(&log, "level in"));
        world.subscribe(events::deselect_event(title.address()), Simulant::Game, log_to(&log, "title deselected"));

        assert!(world.transition_screen(&title).unwrap());
        assert_eq!(world.screen_state(&title).unwrap().transition_state, TransitionState::Incoming);
        for _ in 0..3 {
            world.tick();
        }
        assert_eq!(world.screen_state(&title).unwrap().transition_state, TransitionState::Idling);

        assert!(world.transition_screen(&level).unwrap());
        assert!(!world.transition_screen(&level).unwrap());
        assert_eq!(world.screen_state(&title).unwrap().transition_state, TransitionState::Outgoing);
        for _ in 0..3 {
            world.tick();
        }
        assert_eq!(world.selected_screen(), Some(level.clone()));
        assert_eq!(world.screen_state(&level).unwrap().transition_state, TransitionState::Incoming);
        assert_eq!(*log.borrow(), ["title out", "title deselected", "level in"]);

        for _ in 0..3 {
            world.tick();
        }
        assert_eq!(world.screen_state(&level).unwrap().transition_state, TransitionState::Idling);
        assert_eq!(world.game_state().screen_transition_destination, None);
    }

    #[test]
    fn test_destroy_waits_for_tick() {
        let mut world = short_transitions();
        let (screen, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();

        world.destroy_entity(&entity);
        assert!(world.contains(&Simulant::Entity(entity.clone())));
        assert_eq!(world.pending_tasklets(), 1);
        world.tick();
        assert!(!world.contains(&Simulant::Entity(entity.clone())));
        assert!(!world.read_spatial(&screen, |tree| tree.contains(&entity)).unwrap());

        // destroying something already gone is harmless
        world.destroy_entity(&entity);
        world.tick();
        assert_eq!(world.pending_tasklets(), 0);
    }

    #[test]
    fn test_destroying_selected_screen_cascades() {
        let mut world = short_transitions();
        let (screen, group) = populate(&mut world);
        let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
        world.select_screen(&screen).unwrap();

        world.destroy_screen(&screen);
        world.tick();

        assert_eq!(world.selected_screen(), None);
        assert!(!world.contains(&Simulant::Group(group)));
        assert!(!world.contains(&Simulant::Entity(entity)));
        assert!(world.screens().is_empty());
        assert!(world.store().is_consistent());
    }

    #[test]
    fn test_view_honours_visibility_and_view_type() {
        let mut world = short_transitions();
        let (screen, group) = populate(&mut world);
        let near = spawn(&mut world, &group, "Near", Vec2::new(10.0, 10.0), Vec2::new(4.0, 4.0), 0.0);
        let far = spawn(&mut world, &group, "Far", Vec2::new(5000.0, 5000.0), Vec2::new(4.0, 4.0), 0.0);
        let beacon = spawn(&mut world, &group, "Beacon", Vec2::new(-5000.0, 0.0), Vec2::new(4.0, 4.0), 0.0);
        world.set_property(&Simulant::Entity(beacon.clone()), "Omnipresent", Value::Bool(true)).unwrap();
        let hidden = spawn(&mut world, &group, "Hidden", Vec2::new(12.0, 12.0), Vec2::new(4.0, 4.0), 0.0);
        world.set_property(&Simulant::Entity(hidden.clone()), "Visible", Value::Bool(false)).unwrap();
        let hud = spawn(&mut world, &group, "Hud", Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0), 0.0);
        world.set_property(&Simulant::Entity(hud.clone()), "ViewType", ViewType::Absolute.into()).unwrap();

        // the eye moves away from the world origin; the hud stays in screen space
        world.set_eye_center(Vec2::new(3000.0, 0.0)).unwrap();
        let mut in_view = world.get_entities_in_view(&screen).unwrap();
        in_view.sort();
        assert_eq!(in_view, [beacon.clone(), hud.clone()]);

        world.set_eye_center(Vec2::zeros()).unwrap();
        let mut in_view = world.get_entities_in_view(&screen).unwrap();
        in_view.sort();
        assert_eq!(in_view, [beacon, hud, near]);
        assert!(!in_view_contains(&world, &screen, &far));
        assert!(!in_view_contains(&world, &screen, &hidden));
    }

    fn in_view_contains(world: &World, screen: &Screen, entity: &Entity) -> bool {
        world.get_entities_in_view(screen).unwrap().contains(entity)
    }

    #[test]
    fn test_pick_orders_by_depth() {
        let mut world = short_transitions();
        let (screen, group) = populate(&mut world);
        world.set_eye_center(Vec2::new(100.0, 100.0)).unwrap();
        let low = spawn(&mut world, &group, "Low", Vec2::new(95.0, 95.0), Vec2::new(10.0, 10.0), 1.0);
        let high = spawn(&mut world, &group, "High", Vec2::new(95.0, 95.0), Vec2::new(10.0, 10.0), 3.0);
        let ghost = spawn(&mut world, &group, "Ghost", Vec2::new(95.0, 95.0), Vec2::new(10.0, 10.0), 9.0);
        world.set_property(&Simulant::Entity(ghost), "Visible", Value::Bool(false)).unwrap();
        let button = spawn(&mut world, &group, "Button", Vec2::new(-1.0, -1.0), Vec2::new(2.0, 2.0), 5.0);
        world.set_property(&Simulant::Entity(button.clone()), "ViewType", ViewType::Absolute.into()).unwrap();
        spawn(&mut world, &group, "Elsewhere", Vec2::new(300.0, 300.0), Vec2::new(10.0, 10.0), 7.0);

        let picked = world.pick_entities(&screen, Vec2::zeros()).unwrap();
        assert_eq!(picked, [button, high, low]);

        let missed = world.pick_entities(&screen, Vec2::new(50.0, 50.0)).unwrap();
        assert!(missed.is_empty());
    }

    #[test]
    fn test_pick_follows_entity_rotation() {
        let mut world = short_transitions();
        let (screen, group) = populate(&mut world);
        let bar = spawn(&mut world, &group, "Bar", Vec2::new(0.0, 0.0), Vec2::new(10.0, 2.0), 1.0);
        world
            .set_property(&Simulant::Entity(bar.clone()), "Rotation", Value::Float(std::f32::consts::FRAC_PI_2))
            .unwrap();

        // turned upright the bar covers x 4..6, y -4..6
        assert_eq!(world.pick_entities(&screen, Vec2::new(5.0, 5.0)).unwrap(), [bar]);
        assert!(world.pick_entities(&screen, Vec2::new(9.0, 1.0)).unwrap().is_empty());
    }

    #[test]
    fn test_update_event_reaches_subscribers_each_tick() {
        let mut world = short_transitions();
        let log = Rc::new(RefCell::new(Vec::new()));
        world.subscribe(events::update_event(), Simulant::Game, log_to(&log, "update"));
        world.subscribe(Address::parse("Update/**"), Simulant::Game, log_to(&log, "pattern"));
        world.tick();
        world.tick();
        assert_eq!(log.borrow().len(), 4);
        assert_eq!(world.tick_time().0, 2);
    }
}
