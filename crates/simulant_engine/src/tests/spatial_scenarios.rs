//! Spatial index consistency through world mutations and undo
//!
//! After any mix of creations, moves, destructions, snapshots and restores,
//! a screen's index must answer exactly as a brute-force scan of the
//! entities the store currently holds.

use std::collections::HashSet;

use super::{populate, world};
use crate::foundation::math::{Bounds, Vec2};
use crate::simulant::{Entity, Group, Screen, Simulant, Value};
use crate::world::World;

/// Deterministic pseudo-random source
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn coordinate(&mut self) -> f32 {
        (self.next() % 2000) as f32 - 1000.0
    }
}

fn brute_force(world: &World, group: &Group, region: &Bounds) -> HashSet<Entity> {
    world
        .entities(group)
        .into_iter()
        .filter(|entity| {
            let state = world.entity_state(entity).unwrap();
            state.is_exempt() || state.bounds_max().intersects(region)
        })
        .collect()
}

fn indexed(world: &World, screen: &Screen, region: &Bounds) -> HashSet<Entity> {
    world.read_spatial(screen, |tree| tree.query_bounds(region)).unwrap().into_iter().collect()
}

fn members(world: &World, screen: &Screen) -> HashSet<Entity> {
    world.read_spatial(screen, |tree| tree.elements().cloned().collect()).unwrap()
}

fn place(world: &mut World, entity: &Entity, position: Vec2) {
    world.set_property(&Simulant::Entity(entity.clone()), "Position", position.into()).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_store_after_random_edits() {
        let mut world = world();
        let (screen, group) = populate(&mut world);
        let mut rng = Lcg(7);
        let mut live: Vec<Entity> = Vec::new();

        for step in 0..300 {
            match rng.next() % 5 {
                0 | 1 => {
                    let entity = world.create_entity("EntityDispatcher", &group, None).unwrap();
                    let position = Vec2::new(rng.coordinate(), rng.coordinate());
                    place(&mut world, &entity, position);
                    live.push(entity);
                }
                2 if !live.is_empty() => {
                    let entity = live[(rng.next() as usize) % live.len()].clone();
                    let position = Vec2::new(rng.coordinate(), rng.coordinate());
                    place(&mut world, &entity, position);
                }
                3 if !live.is_empty() => {
                    let entity = live.swap_remove((rng.next() as usize) % live.len());
                    world.destroy_entity_immediate(&entity).unwrap();
                }
                4 if !live.is_empty() => {
                    let entity = live[(rng.next() as usize) % live.len()].clone();
                    let omnipresent = rng.next() % 2 == 0;
                    world
                        .set_property(&Simulant::Entity(entity), "Omnipresent", Value::Bool(omnipresent))
                        .unwrap();
                }
                _ => {}
            }

            if step % 25 == 0 {
                let min = Vec2::new(rng.coordinate(), rng.coordinate());
                let region = Bounds::new(min, min + Vec2::new(300.0, 300.0));
                assert_eq!(indexed(&world, &screen, &region), brute_force(&world, &group, &region));
            }
        }
        assert_eq!(members(&world, &screen), world.entities(&group).into_iter().collect());
    }

    #[test]
    fn test_restore_then_mutate_matches_rebuild() {
        let mut world = world();
        let (screen, group) = populate(&mut world);
        let a = world.create_entity("EntityDispatcher", &group, Some("A")).unwrap();
        let b = world.create_entity("EntityDispatcher", &group, Some("B")).unwrap();
        place(&mut world, &a, Vec2::new(10.0, 10.0));
        let snapshot = world.snapshot();

        // diverge: the live cell now holds C and lacks B
        let c = world.create_entity("EntityDispatcher", &group, Some("C")).unwrap();
        world.destroy_entity_immediate(&b).unwrap();
        place(&mut world, &c, Vec2::new(50.0, 50.0));

        world.restore(snapshot);
        place(&mut world, &a, Vec2::new(-40.0, -40.0));

        let expected: HashSet<Entity> = [a.clone(), b.clone()].into();
        assert_eq!(members(&world, &screen), expected);
        let at_a = world.read_spatial(&screen, |tree| tree.query_point(Vec2::new(-39.5, -39.5))).unwrap();
        assert_eq!(at_a, vec![a]);
        let at_c = world.read_spatial(&screen, |tree| tree.query_point(Vec2::new(50.5, 50.5))).unwrap();
        assert!(at_c.is_empty());
        assert!(world.store().is_consistent());
    }

    #[test]
    fn test_undo_redo_cycle_keeps_index_exact() {
        let mut world = world();
        let (screen, group) = populate(&mut world);
        let a = world.create_entity("EntityDispatcher", &group, Some("A")).unwrap();
        let before = world.snapshot();
        place(&mut world, &a, Vec2::new(200.0, 200.0));
        let after = world.snapshot();

        world.restore(before);
        let origin = Bounds::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        assert_eq!(indexed(&world, &screen, &origin), brute_force(&world, &group, &origin));

        world.restore(after);
        let moved = Bounds::new(Vec2::new(199.0, 199.0), Vec2::new(201.0, 201.0));
        assert_eq!(indexed(&world, &screen, &moved), [a].into());
        assert!(indexed(&world, &screen, &origin).is_empty());
    }
}
