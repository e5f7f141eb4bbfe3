//! Creation and destruction of simulants

use std::collections::BTreeSet;
use std::rc::Rc;

use log::debug;

use super::{World, WorldError};
use crate::composition::facets;
use crate::events::{self, EventData};
use crate::foundation::time;
use crate::overlay;
use crate::simulant::{
    Address, Entity, EntityState, GameState, Group, GroupState, Screen, ScreenState, Simulant, SimulantKind,
    SimulantState,
};
use crate::store::StoreError;

fn generated_name(kind: SimulantKind) -> String {
    format!("{:?}{}", kind, time::make_id())
}

impl World {
    /// Game state
    pub fn game_state(&self) -> Rc<GameState> {
        self.store.game()
    }

    /// Screen state; fails when the screen does not exist
    pub fn screen_state(&self, screen: &Screen) -> Result<Rc<ScreenState>, WorldError> {
        Ok(self.store.screens().get(screen.address())?)
    }

    /// Group state; fails when the group does not exist
    pub fn group_state(&self, group: &Group) -> Result<Rc<GroupState>, WorldError> {
        Ok(self.store.groups().get(group.address())?)
    }

    /// Entity state; fails when the entity does not exist
    pub fn entity_state(&self, entity: &Entity) -> Result<Rc<EntityState>, WorldError> {
        Ok(self.store.entities().get(entity.address())?)
    }

    /// Whether a simulant exists
    pub fn contains(&self, simulant: &Simulant) -> bool {
        match simulant {
            Simulant::Game => true,
            Simulant::Screen(screen) => self.store.contains_screen(screen),
            Simulant::Group(group) => self.store.contains_group(group),
            Simulant::Entity(entity) => self.store.contains_entity(entity),
        }
    }

    /// Every screen, by name
    pub fn screens(&self) -> Vec<Screen> {
        self.store.directory().screens()
    }

    /// Groups of a screen, by name
    pub fn groups(&self, screen: &Screen) -> Vec<Group> {
        self.store.directory().groups(screen)
    }

    /// Entities of a group, by name
    pub fn entities(&self, group: &Group) -> Vec<Entity> {
        self.store.directory().entities(group)
    }

    /// Seed a fresh state with its routed overlay
    fn route_overlay<S: SimulantState>(&self, state: &mut S) {
        let overlay_name = self.overlayer.find_overlay_name(state.common().dispatcher.name());
        overlay::apply_overlay(None, self.overlayer.resolve(overlay_name.as_deref()), state);
        state.common_mut().overlay_name = overlay_name;
    }

    pub(super) fn make_screen_state(&self, dispatcher_name: &str, name: &str) -> ScreenState {
        let dispatcher = self.registry.resolve_dispatcher(dispatcher_name, SimulantKind::Screen);
        let mut state = ScreenState::new(dispatcher, name, &self.config.spatial);
        state.incoming.lifetime = self.config.transition.incoming_lifetime;
        state.outgoing.lifetime = self.config.transition.outgoing_lifetime;
        self.route_overlay(&mut state);
        state
    }

    pub(super) fn make_group_state(&self, dispatcher_name: &str, name: &str) -> GroupState {
        let dispatcher = self.registry.resolve_dispatcher(dispatcher_name, SimulantKind::Group);
        let mut state = GroupState::new(dispatcher, name);
        self.route_overlay(&mut state);
        state
    }

    pub(super) fn make_entity_state(&self, dispatcher_name: &str, name: &str) -> Result<EntityState, WorldError> {
        let dispatcher = self.registry.resolve_dispatcher(dispatcher_name, SimulantKind::Entity);
        let mut state = EntityState::new(dispatcher, name);
        let overlay_name = self.overlayer.find_overlay_name(state.common.dispatcher.name());
        let template = self.overlayer.resolve(overlay_name.as_deref());
        overlay::apply_overlay_to_facet_names(None, template, &mut state);
        let mut state = facets::synchronize_facets_to_names(&self.registry, &BTreeSet::new(), &state)?;
        overlay::apply_overlay(None, template, &mut state);
        state.common.overlay_name = overlay_name;
        Ok(state)
    }

    /// Create a screen; a name is generated when none is given
    pub fn create_screen(&mut self, dispatcher_name: &str, name: Option<&str>) -> Result<Screen, WorldError> {
        let name = name.map_or_else(|| generated_name(SimulantKind::Screen), str::to_string);
        let screen = Screen::try_from_address(Address::new([name]))?;
        let state = self.make_screen_state(dispatcher_name, screen.name());
        self.add_screen_state(&screen, state)?;
        Ok(screen)
    }

    /// Create a group in an existing screen
    pub fn create_group(&mut self, dispatcher_name: &str, screen: &Screen, name: Option<&str>) -> Result<Group, WorldError> {
        let name = name.map_or_else(|| generated_name(SimulantKind::Group), str::to_string);
        let group = Group::try_from_address(screen.address().push(name))?;
        let state = self.make_group_state(dispatcher_name, group.name());
        self.add_group_state(&group, state)?;
        Ok(group)
    }

    /// Create an entity in an existing group
    pub fn create_entity(&mut self, dispatcher_name: &str, group: &Group, name: Option<&str>) -> Result<Entity, WorldError> {
        let name = name.map_or_else(|| generated_name(SimulantKind::Entity), str::to_string);
        let entity = Entity::try_from_address(group.address().push(name))?;
        if self.store.contains_entity(&entity) {
            return Err(StoreError::AlreadyExists(entity.address().clone()).into());
        }
        let state = self.make_entity_state(dispatcher_name, entity.name())?;
        self.add_entity_state(&entity, state)?;
        Ok(entity)
    }

    pub(super) fn add_screen_state(&mut self, screen: &Screen, state: ScreenState) -> Result<(), WorldError> {
        let dispatcher = Rc::clone(&state.common.dispatcher);
        self.store.add_screen(screen, state, false)?;
        debug!("Created screen '{}' ({})", screen, dispatcher.name());
        let simulant = Simulant::Screen(screen.clone());
        dispatcher.register(&simulant, self);
        self.publish_default(EventData::Simulant(simulant.clone()), events::register_event(screen.address()), simulant);
        Ok(())
    }

    pub(super) fn add_group_state(&mut self, group: &Group, state: GroupState) -> Result<(), WorldError> {
        let dispatcher = Rc::clone(&state.common.dispatcher);
        self.store.add_group(group, state, false)?;
        debug!("Created group '{}' ({})", group, dispatcher.name());
        let simulant = Simulant::Group(group.clone());
        dispatcher.register(&simulant, self);
        self.publish_default(EventData::Simulant(simulant.clone()), events::register_event(group.address()), simulant);
        Ok(())
    }

    pub(super) fn add_entity_state(&mut self, entity: &Entity, state: EntityState) -> Result<(), WorldError> {
        let dispatcher = Rc::clone(&state.common.dispatcher);
        let attached = state.facets.clone();
        let (exempt, bounds) = (state.is_exempt(), state.bounds_max());
        self.store.add_entity(entity, state, false)?;
        let owner = entity.clone();
        self.mutate_spatial(&entity.screen(), |tree| tree.add_element(exempt, bounds, owner))?;
        debug!("Created entity '{}' ({})", entity, dispatcher.name());

        let simulant = Simulant::Entity(entity.clone());
        dispatcher.register(&simulant, self);
        for facet in &attached {
            facet.register(entity, self);
        }
        self.publish_default(EventData::Simulant(simulant.clone()), events::register_event(entity.address()), simulant);
        Ok(())
    }

    /// Destroy an entity at the end of the current tick
    pub fn destroy_entity(&mut self, entity: &Entity) {
        let entity = entity.clone();
        self.schedule(self.tick_time, Box::new(move |world: &mut World| world.destroy_entity_immediate(&entity)));
    }

    /// Destroy a group and its entities at the end of the current tick
    pub fn destroy_group(&mut self, group: &Group) {
        let group = group.clone();
        self.schedule(self.tick_time, Box::new(move |world: &mut World| world.destroy_group_immediate(&group)));
    }

    /// Destroy a screen and everything in it at the end of the current tick
    pub fn destroy_screen(&mut self, screen: &Screen) {
        let screen = screen.clone();
        self.schedule(self.tick_time, Box::new(move |world: &mut World| world.destroy_screen_immediate(&screen)));
    }

    /// Destroy an entity now; destroying a missing entity does nothing
    pub fn destroy_entity_immediate(&mut self, entity: &Entity) -> Result<(), WorldError> {
        if !self.store.contains_entity(entity) {
            return Ok(());
        }
        let simulant = Simulant::Entity(entity.clone());
        self.publish_default(
            EventData::Simulant(simulant.clone()),
            events::unregistering_event(entity.address()),
            simulant.clone(),
        );

        // handlers may already have destroyed it
        let Some(state) = self.store.entities().try_get(entity.address()) else {
            return Ok(());
        };
        for facet in state.facets.iter().rev() {
            facet.unregister(entity, self);
        }
        state.common.dispatcher.unregister(&simulant, self);

        let Some(state) = self.store.entities().try_get(entity.address()) else {
            return Ok(());
        };
        let (exempt, bounds) = (state.is_exempt(), state.bounds_max());
        let owner = entity.clone();
        self.mutate_spatial(&entity.screen(), |tree| tree.remove_element(exempt, bounds, &owner))?;
        self.events.release_monitors(&simulant);
        self.store.remove_entity(entity);
        debug!("Destroyed entity '{}'", entity);
        Ok(())
    }

    /// Destroy a group and its entities now
    pub fn destroy_group_immediate(&mut self, group: &Group) -> Result<(), WorldError> {
        if !self.store.contains_group(group) {
            return Ok(());
        }
        let simulant = Simulant::Group(group.clone());
        self.publish_default(
            EventData::Simulant(simulant.clone()),
            events::unregistering_event(group.address()),
            simulant.clone(),
        );
        for entity in self.store.directory().entities(group) {
            self.destroy_entity_immediate(&entity)?;
        }
        if let Some(state) = self.store.groups().try_get(group.address()) {
            state.common.dispatcher.unregister(&simulant, self);
        }
        // an unregister hook may have created new children
        for entity in self.store.directory().entities(group) {
            self.destroy_entity_immediate(&entity)?;
        }
        self.events.release_monitors(&simulant);
        self.store.remove_group(group);
        debug!("Destroyed group '{}'", group);
        Ok(())
    }

    /// Destroy a screen and everything in it now
    ///
    /// Destroying the selected screen deselects it.
    pub fn destroy_screen_immediate(&mut self, screen: &Screen) -> Result<(), WorldError> {
        if !self.store.contains_screen(screen) {
            return Ok(());
        }
        let simulant = Simulant::Screen(screen.clone());
        self.publish_default(
            EventData::Simulant(simulant.clone()),
            events::unregistering_event(screen.address()),
            simulant.clone(),
        );
        for group in self.store.directory().groups(screen) {
            self.destroy_group_immediate(&group)?;
        }
        if let Some(state) = self.store.screens().try_get(screen.address()) {
            state.common.dispatcher.unregister(&simulant, self);
        }
        for group in self.store.directory().groups(screen) {
            self.destroy_group_immediate(&group)?;
        }
        if self.selected_screen().as_ref() == Some(screen) {
            self.deselect_screen()?;
        }
        self.events.release_monitors(&simulant);
        self.store.remove_screen(screen);
        debug!("Destroyed screen '{}'", screen);
        Ok(())
    }
}
