//! Entity facet composition and spatial index maintenance

use std::collections::BTreeSet;
use std::rc::Rc;

use super::{World, WorldError};
use crate::composition::facets;
use crate::simulant::state::FACET_NAMES;
use crate::simulant::{Entity, EntityState, Screen, Simulant};
use crate::spatial::Quadtree;

impl World {
    /// Build a screen's spatial index from the entities it currently owns
    pub(super) fn build_spatial(&self, screen: &Screen) -> Quadtree<Entity> {
        let mut tree = Quadtree::new(self.config.spatial.clone());
        for entity in self.store.directory().screen_entities(screen) {
            if let Some(state) = self.store.entities().try_get(entity.address()) {
                tree.add_element(state.is_exempt(), state.bounds_max(), entity);
            }
        }
        tree
    }

    /// Apply one mutation to a screen's spatial index
    ///
    /// The cached index is mutated in place when the stored handle is
    /// current; otherwise it is rebuilt from the store first.
    pub(super) fn mutate_spatial(
        &mut self,
        screen: &Screen,
        mutation: impl FnOnce(&mut Quadtree<Entity>),
    ) -> Result<(), WorldError> {
        let screen_state = self.screen_state(screen)?;
        let spatial = screen_state.spatial.mutate(|| self.build_spatial(screen), mutation);
        let mut next = (*screen_state).clone();
        next.spatial = spatial;
        self.store.screens_mut().set(screen.address(), Rc::new(next));
        Ok(())
    }

    /// Query a screen's spatial index, rebuilding it first when stale
    pub fn read_spatial<R>(&self, screen: &Screen, query: impl FnOnce(&Quadtree<Entity>) -> R) -> Result<R, WorldError> {
        let screen_state = self.screen_state(screen)?;
        Ok(screen_state.spatial.read(|| self.build_spatial(screen), query))
    }

    /// Move an entity in its screen's index when its bounds or exemption changed
    pub(super) fn sync_entity_spatial(&mut self, entity: &Entity, old: &EntityState, new: &EntityState) -> Result<(), WorldError> {
        let (old_exempt, old_bounds) = (old.is_exempt(), old.bounds_max());
        let (new_exempt, new_bounds) = (new.is_exempt(), new.bounds_max());
        if old_exempt == new_exempt && old_bounds == new_bounds {
            return Ok(());
        }
        let owner = entity.clone();
        self.mutate_spatial(&entity.screen(), |tree| {
            tree.update_element(old_exempt, old_bounds, new_exempt, new_bounds, owner);
        })
    }

    /// Replace an entity's facets with exactly `names`
    ///
    /// The whole change is validated before anything is touched, so a
    /// failure leaves the entity as it was. Removed facets run their
    /// unregister hooks before detaching; added facets run their register
    /// hooks once attached.
    pub fn set_entity_facet_names(&mut self, entity: &Entity, names: BTreeSet<String>) -> Result<(), WorldError> {
        let current = self.entity_state(entity)?;
        facets::set_facet_names(&self.registry, &names, &current)?;
        let (to_remove, to_add) = facets::diff_facet_names(&current.facet_names, &names);

        for name in &to_remove {
            if let Some(facet) = current.facet(name).cloned() {
                facet.unregister(entity, self);
            }
        }

        let registry = Rc::clone(&self.registry);
        self.update_state::<EntityState>(&Simulant::Entity(entity.clone()), Some(FACET_NAMES), |state| {
            *state = facets::set_facet_names(&registry, &names, state)?;
            Ok(())
        })?;

        let updated = self.entity_state(entity)?;
        for name in &to_add {
            if let Some(facet) = updated.facet(name).cloned() {
                facet.register(entity, self);
            }
        }
        Ok(())
    }

    /// Entities whose update hooks run this tick: visible in the eye or exempt
    pub(super) fn entities_to_update(&self, screen: &Screen) -> Result<Vec<Entity>, WorldError> {
        let game = self.store.game();
        let view = game.view_bounds_relative();
        let candidates = self.read_spatial(screen, |tree| tree.query_bounds(&view))?;
        Ok(candidates
            .into_iter()
            .filter(|entity| {
                self.store
                    .entities()
                    .try_get(entity.address())
                    .is_some_and(|state| state.is_exempt() || state.bounds_max().intersects(&view))
            })
            .collect())
    }
}
