//! Screen selection, transitions, camera and picking

use std::cmp::Ordering;

use super::{World, WorldError};
use crate::events::{self, EventData};
use crate::foundation::math::Vec2;
use crate::simulant::{
    Address, Entity, EntityFlags, GameState, Screen, ScreenState, Simulant, TransitionState, ViewType,
};

// absolute entities live in screen space, so views and picks query both spaces
fn merge_unique(found: &mut Vec<Entity>, more: Vec<Entity>) {
    for entity in more {
        if !found.contains(&entity) {
            found.push(entity);
        }
    }
}

impl World {
    /// Currently selected screen
    pub fn selected_screen(&self) -> Option<Screen> {
        self.store.game().selected_screen.clone()
    }

    /// Select a screen immediately, without a transition
    pub fn select_screen(&mut self, screen: &Screen) -> Result<(), WorldError> {
        self.screen_state(screen)?;
        let previous = self.selected_screen();
        if previous.as_ref() == Some(screen) {
            return Ok(());
        }
        if previous.is_some() {
            self.deselect_screen()?;
        }
        let selected = screen.clone();
        self.update_state::<GameState>(&Simulant::Game, Some("SelectedScreenOpt"), |game| {
            game.selected_screen = Some(selected);
            Ok(())
        })?;
        let simulant = Simulant::Screen(screen.clone());
        self.publish_default(EventData::Simulant(simulant.clone()), events::select_event(screen.address()), simulant);
        Ok(())
    }

    /// Clear the selected screen
    pub fn deselect_screen(&mut self) -> Result<(), WorldError> {
        let Some(previous) = self.selected_screen() else {
            return Ok(());
        };
        let simulant = Simulant::Screen(previous.clone());
        self.publish_default(EventData::Simulant(simulant.clone()), events::deselect_event(previous.address()), simulant);
        self.update_state::<GameState>(&Simulant::Game, Some("SelectedScreenOpt"), |game| {
            game.selected_screen = None;
            Ok(())
        })
    }

    fn set_transition_state(&mut self, screen: &Screen, transition_state: TransitionState) -> Result<(), WorldError> {
        let now = self.tick_time;
        self.update_state::<ScreenState>(&Simulant::Screen(screen.clone()), None, |state| {
            state.transition_state = transition_state;
            state.transition_ticks = now;
            Ok(())
        })
    }

    fn publish_screen_event(&mut self, screen: &Screen, address: Address) {
        let simulant = Simulant::Screen(screen.clone());
        self.publish_default(EventData::Simulant(simulant.clone()), address, simulant);
    }

    fn begin_incoming(&mut self, screen: &Screen) -> Result<(), WorldError> {
        self.select_screen(screen)?;
        self.set_transition_state(screen, TransitionState::Incoming)?;
        self.publish_screen_event(screen, events::incoming_start_event(screen.address()));
        Ok(())
    }

    /// Transition to another screen
    ///
    /// With no screen selected the destination is selected and transitions
    /// in. Otherwise the selected screen transitions out first. Returns
    /// false when a transition is already under way.
    pub fn transition_screen(&mut self, destination: &Screen) -> Result<bool, WorldError> {
        self.screen_state(destination)?;
        let Some(current) = self.selected_screen() else {
            self.begin_incoming(destination)?;
            return Ok(true);
        };
        let game = self.store.game();
        let current_state = self.screen_state(&current)?;
        if current_state.transition_state != TransitionState::Idling || game.screen_transition_destination.is_some() {
            return Ok(false);
        }
        let pending = destination.clone();
        self.update_state::<GameState>(&Simulant::Game, Some("ScreenTransitionDestinationOpt"), |game| {
            game.screen_transition_destination = Some(pending);
            Ok(())
        })?;
        self.set_transition_state(&current, TransitionState::Outgoing)?;
        self.publish_screen_event(&current, events::outgoing_start_event(current.address()));
        Ok(true)
    }

    /// Advance the selected screen's transition by one tick
    pub(super) fn advance_transitions(&mut self) -> Result<(), WorldError> {
        let Some(screen) = self.selected_screen() else {
            return Ok(());
        };
        let state = self.screen_state(&screen)?;
        let elapsed = self.tick_time.since(state.transition_ticks);
        match state.transition_state {
            TransitionState::Incoming if elapsed >= state.incoming.lifetime => {
                self.set_transition_state(&screen, TransitionState::Idling)?;
                self.publish_screen_event(&screen, events::incoming_finish_event(screen.address()));
            }
            TransitionState::Outgoing if elapsed >= state.outgoing.lifetime => {
                self.set_transition_state(&screen, TransitionState::Idling)?;
                self.publish_screen_event(&screen, events::outgoing_finish_event(screen.address()));
                let destination = self.store.game().screen_transition_destination.clone();
                self.update_state::<GameState>(&Simulant::Game, Some("ScreenTransitionDestinationOpt"), |game| {
                    game.screen_transition_destination = None;
                    Ok(())
                })?;
                match destination {
                    Some(destination) if self.store.contains_screen(&destination) => self.begin_incoming(&destination)?,
                    Some(destination) => log::warn!("Transition destination '{}' no longer exists", destination),
                    None => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Move the eye
    pub fn set_eye_center(&mut self, center: Vec2) -> Result<(), WorldError> {
        self.set_property(&Simulant::Game, "EyeCenter", center.into())
    }

    /// Resize the eye
    pub fn set_eye_size(&mut self, size: Vec2) -> Result<(), WorldError> {
        self.set_property(&Simulant::Game, "EyeSize", size.into())
    }

    /// Visible entities of a screen that intersect the eye's view
    ///
    /// Relative entities are tested against the view in world space,
    /// absolute entities against the view in screen space, and omnipresent
    /// entities are always included.
    pub fn get_entities_in_view(&self, screen: &Screen) -> Result<Vec<Entity>, WorldError> {
        let game = self.store.game();
        let relative = game.view_bounds_relative();
        let absolute = game.view_bounds_absolute();
        let candidates = self.read_spatial(screen, |tree| {
            let mut found = tree.query_bounds(&relative);
            merge_unique(&mut found, tree.query_bounds(&absolute));
            found
        })?;
        Ok(candidates
            .into_iter()
            .filter(|entity| {
                self.store.entities().try_get(entity.address()).is_some_and(|state| {
                    let view = match state.view_type {
                        ViewType::Relative => &relative,
                        ViewType::Absolute => &absolute,
                    };
                    state.visible()
                        && (state.flags.contains(EntityFlags::OMNIPRESENT)
                            || state.bounds_max().intersects(view))
                })
            })
            .collect())
    }

    /// Visible entities under a point, nearest (highest depth) first
    ///
    /// `point` is in screen space, with the origin at the eye center. The
    /// hit test follows the entity's rotation.
    pub fn pick_entities(&self, screen: &Screen, point: Vec2) -> Result<Vec<Entity>, WorldError> {
        let world_point = point + self.store.game().eye_center;
        let candidates = self.read_spatial(screen, |tree| {
            let mut found = tree.query_point(world_point);
            merge_unique(&mut found, tree.query_point(point));
            found
        })?;
        let mut picked: Vec<(Entity, f32)> = candidates
            .into_iter()
            .filter_map(|entity| {
                let state = self.store.entities().try_get(entity.address())?;
                let target = match state.view_type {
                    ViewType::Relative => world_point,
                    ViewType::Absolute => point,
                };
                (state.visible() && state.contains_point(target)).then_some((entity, state.depth))
            })
            .collect();
        picked.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        Ok(picked.into_iter().map(|(entity, _)| entity).collect())
    }
}
