//! Overlay reassignment and hot reload

use std::rc::Rc;

use log::{info, warn};

use super::{World, WorldError};
use crate::overlay::{self, Overlay, Overlayer};
use crate::simulant::state::OVERLAY_NAME;
use crate::simulant::{Entity, EntityState, GameState, GroupState, ScreenState, Simulant, Value};
use crate::store::StoredState;

impl World {
    /// Name of the overlay applied to a simulant
    pub fn overlay_name(&self, simulant: &Simulant) -> Result<Option<String>, WorldError> {
        let (value, _) = self.get_property(simulant, OVERLAY_NAME)?;
        Ok(match value {
            Value::OptionalName(name) => name,
            _ => None,
        })
    }

    /// Reassign a simulant's overlay
    ///
    /// Entities recompose their facets first; properties then move from
    /// the old template to the new one wherever they were not customised.
    pub fn set_overlay_name(&mut self, simulant: &Simulant, overlay_name: Option<String>) -> Result<(), WorldError> {
        let overlayer = Rc::clone(&self.overlayer);
        let old_name = self.overlay_name(simulant)?;
        let old = overlayer.resolve(old_name.as_deref());
        let new = overlayer.resolve(overlay_name.as_deref());
        match simulant {
            Simulant::Game => self.reapply_overlay::<GameState>(simulant, old, new, overlay_name),
            Simulant::Screen(_) => self.reapply_overlay::<ScreenState>(simulant, old, new, overlay_name),
            Simulant::Group(_) => self.reapply_overlay::<GroupState>(simulant, old, new, overlay_name),
            Simulant::Entity(entity) => {
                self.reapply_overlay_facets(entity, old, new)?;
                self.reapply_overlay::<EntityState>(simulant, old, new, overlay_name)
            }
        }
    }

    fn reapply_overlay_facets(&mut self, entity: &Entity, old: Option<&Overlay>, new: Option<&Overlay>) -> Result<(), WorldError> {
        let mut scratch = (*self.entity_state(entity)?).clone();
        overlay::apply_overlay_to_facet_names(old, new, &mut scratch);
        self.set_entity_facet_names(entity, scratch.facet_names)
    }

    fn reapply_overlay<S: StoredState>(
        &mut self,
        simulant: &Simulant,
        old: Option<&Overlay>,
        new: Option<&Overlay>,
        overlay_name: Option<String>,
    ) -> Result<(), WorldError> {
        self.update_state::<S>(simulant, Some(OVERLAY_NAME), |state| {
            overlay::apply_overlay(old, new, state);
            state.common_mut().overlay_name = overlay_name;
            Ok(())
        })
    }

    /// Swap in a new overlayer and re-apply every simulant's overlay
    ///
    /// Each simulant keeps its overlay name; facets and properties move from
    /// the old definition of that overlay to the new one, preserving
    /// customised values. Entities whose new facet set cannot be composed
    /// are logged and left unchanged.
    pub fn reload_overlays(&mut self, overlayer: Overlayer) -> Result<(), WorldError> {
        let old = std::mem::replace(&mut self.overlayer, Rc::new(overlayer));
        let new = Rc::clone(&self.overlayer);

        let mut simulants = vec![Simulant::Game];
        for screen in self.screens() {
            for group in self.groups(&screen) {
                simulants.extend(self.entities(&group).into_iter().map(Simulant::Entity));
                simulants.push(Simulant::Group(group));
            }
            simulants.push(Simulant::Screen(screen));
        }

        let count = simulants.len();
        for simulant in simulants {
            let name = self.overlay_name(&simulant)?;
            let (before, after) = (old.resolve(name.as_deref()), new.resolve(name.as_deref()));
            let result = match &simulant {
                Simulant::Game => self.reapply_overlay::<GameState>(&simulant, before, after, name),
                Simulant::Screen(_) => self.reapply_overlay::<ScreenState>(&simulant, before, after, name),
                Simulant::Group(_) => self.reapply_overlay::<GroupState>(&simulant, before, after, name),
                Simulant::Entity(entity) => self
                    .reapply_overlay_facets(entity, before, after)
                    .and_then(|()| self.reapply_overlay::<EntityState>(&simulant, before, after, name)),
            };
            match result {
                Err(WorldError::Composition(error)) => warn!("Overlay reload skipped '{}': {}", simulant, error),
                other => other?,
            }
        }
        info!("Reloaded overlays for {} simulants", count);
        Ok(())
    }
}
