//! Reading and writing descriptors
//!
//! Writing records only what differs from the active overlay (or each
//! property's default), so files stay small and stable across template
//! changes. Reading rebuilds a simulant the same way creation does, then
//! applies the recorded overlay, facets and properties in that order.
//! Malformed values are logged and skipped.

use std::collections::BTreeSet;
use std::path::Path;
use std::rc::Rc;

use log::warn;

use super::{World, WorldError};
use crate::composition::facets;
use crate::descriptor::{
    self, Descriptor, EntityDescriptor, GameDescriptor, GroupDescriptor, PropertyDescriptors, ScreenDescriptor,
};
use crate::foundation::time;
use crate::overlay;
use crate::simulant::state::{self, FACET_NAMES, NAME, OVERLAY_NAME};
use crate::simulant::{
    Address, Entity, EntityState, GameState, Group, PropertyError, Screen, Simulant, SimulantKind, SimulantState,
    Value,
};
use crate::store::StoreError;

impl World {
    fn describe<S: SimulantState>(&self, state: &S) -> PropertyDescriptors {
        let mut properties = PropertyDescriptors::new();
        let common = state.common();
        properties.insert(NAME.to_string(), descriptor::describe_value(&Value::String(common.name.clone())));
        if common.overlay_name != self.overlayer.find_overlay_name(common.dispatcher.name()) {
            let overlay_name = Value::OptionalName(common.overlay_name.clone());
            properties.insert(OVERLAY_NAME.to_string(), descriptor::describe_value(&overlay_name));
        }
        for (name, value) in state.properties() {
            if self.overlayer.template_value(state, &name).as_ref() != Some(&value) {
                properties.insert(name, descriptor::describe_value(&value));
            }
        }
        properties
    }

    /// Describe an entity
    pub fn write_entity(&self, entity: &Entity) -> Result<EntityDescriptor, WorldError> {
        let state = self.entity_state(entity)?;
        let mut properties = self.describe(state.as_ref());
        let template_facets = self.overlayer.facet_names(state.common.overlay_name.as_deref());
        if state.facet_names != template_facets {
            let facet_names = Value::Names(state.facet_names.clone());
            properties.insert(FACET_NAMES.to_string(), descriptor::describe_value(&facet_names));
        }
        Ok(EntityDescriptor {
            dispatcher_name: state.common.dispatcher.name().to_string(),
            properties,
        })
    }

    /// Describe a group and its persistent entities
    pub fn write_group(&self, group: &Group) -> Result<GroupDescriptor, WorldError> {
        let state = self.group_state(group)?;
        let mut entities = Vec::new();
        for entity in self.entities(group) {
            if self.entity_state(&entity)?.persistent() {
                entities.push(self.write_entity(&entity)?);
            }
        }
        Ok(GroupDescriptor {
            dispatcher_name: state.common.dispatcher.name().to_string(),
            properties: self.describe(state.as_ref()),
            entities,
        })
    }

    /// Describe a screen and its persistent groups
    pub fn write_screen(&self, screen: &Screen) -> Result<ScreenDescriptor, WorldError> {
        let state = self.screen_state(screen)?;
        let mut groups = Vec::new();
        for group in self.groups(screen) {
            if self.group_state(&group)?.persistent {
                groups.push(self.write_group(&group)?);
            }
        }
        Ok(ScreenDescriptor {
            dispatcher_name: state.common.dispatcher.name().to_string(),
            properties: self.describe(state.as_ref()),
            groups,
        })
    }

    /// Describe the game and its persistent screens
    pub fn write_game(&self) -> Result<GameDescriptor, WorldError> {
        let state = self.store.game();
        let mut screens = Vec::new();
        for screen in self.screens() {
            if self.screen_state(&screen)?.persistent {
                screens.push(self.write_screen(&screen)?);
            }
        }
        Ok(GameDescriptor {
            dispatcher_name: state.common.dispatcher.name().to_string(),
            properties: self.describe(state.as_ref()),
            screens,
        })
    }

    /// Write an entity descriptor file atomically
    pub fn write_entity_to_file(&self, entity: &Entity, path: impl AsRef<Path>) -> Result<(), WorldError> {
        Ok(descriptor::write_to_file(&self.write_entity(entity)?, path)?)
    }

    /// Write a group descriptor file atomically
    pub fn write_group_to_file(&self, group: &Group, path: impl AsRef<Path>) -> Result<(), WorldError> {
        Ok(descriptor::write_to_file(&self.write_group(group)?, path)?)
    }

    /// Write a screen descriptor file atomically
    pub fn write_screen_to_file(&self, screen: &Screen, path: impl AsRef<Path>) -> Result<(), WorldError> {
        Ok(descriptor::write_to_file(&self.write_screen(screen)?, path)?)
    }

    /// Write the game descriptor file atomically
    pub fn write_game_to_file(&self, path: impl AsRef<Path>) -> Result<(), WorldError> {
        Ok(descriptor::write_to_file(&self.write_game()?, path)?)
    }

    /// Move a freshly routed state's properties to a recorded overlay
    fn migrate_overlay<S: SimulantState>(&self, recorded: Option<String>, state: &mut S) {
        let routed = state.common().overlay_name.clone();
        if recorded == routed {
            return;
        }
        overlay::apply_overlay(
            self.overlayer.resolve(routed.as_deref()),
            self.overlayer.resolve(recorded.as_deref()),
            state,
        );
        state.common_mut().overlay_name = recorded;
    }

    fn read_entity_state(&self, descriptor: &EntityDescriptor, name: &str) -> Result<EntityState, WorldError> {
        let mut state = self.make_entity_state(&descriptor.dispatcher_name, name)?;
        let recorded = recorded_overlay(descriptor);

        let mut target_facets = state.facet_names.clone();
        if let Some(recorded) = recorded.as_ref().filter(|recorded| **recorded != state.common.overlay_name) {
            let mut scratch = state.clone();
            overlay::apply_overlay_to_facet_names(
                self.overlayer.resolve(state.common.overlay_name.as_deref()),
                self.overlayer.resolve(recorded.as_deref()),
                &mut scratch,
            );
            target_facets = scratch.facet_names;
        }
        match descriptor.property(FACET_NAMES) {
            Some(Ok(Value::Names(names))) => target_facets = names,
            Some(Ok(other)) => warn!("Ignoring {} of type {:?}", FACET_NAMES, other.ty()),
            Some(Err(error)) => warn!("Ignoring unreadable {}: {}", FACET_NAMES, error),
            None => {}
        }
        match facets::set_facet_names(&self.registry, &target_facets, &state) {
            Ok(composed) => state = composed,
            Err(error) => warn!("Entity '{}' keeps its template facets: {}", name, error),
        }

        if let Some(recorded) = recorded {
            self.migrate_overlay(recorded, &mut state);
        }
        merge_properties(descriptor.properties(), &mut state);
        Ok(state)
    }

    /// Create an entity from a descriptor
    ///
    /// The name is taken from `name`, else from the descriptor, else generated.
    pub fn read_entity(&mut self, descriptor: &EntityDescriptor, group: &Group, name: Option<&str>) -> Result<Entity, WorldError> {
        let name = choose_name(name, descriptor, SimulantKind::Entity);
        let entity = Entity::try_from_address(group.address().push(name))?;
        if self.store.contains_entity(&entity) {
            return Err(StoreError::AlreadyExists(entity.address().clone()).into());
        }
        let state = self.read_entity_state(descriptor, entity.name())?;
        self.add_entity_state(&entity, state)?;
        Ok(entity)
    }

    /// Create a group and its entities from a descriptor
    pub fn read_group(&mut self, descriptor: &GroupDescriptor, screen: &Screen, name: Option<&str>) -> Result<Group, WorldError> {
        let name = choose_name(name, descriptor, SimulantKind::Group);
        let group = Group::try_from_address(screen.address().push(name))?;
        let mut state = self.make_group_state(&descriptor.dispatcher_name, group.name());
        if let Some(recorded) = recorded_overlay(descriptor) {
            self.migrate_overlay(recorded, &mut state);
        }
        merge_properties(descriptor.properties(), &mut state);
        self.add_group_state(&group, state)?;
        for entity in &descriptor.entities {
            self.read_entity(entity, &group, None)?;
        }
        Ok(group)
    }

    /// Create a screen and everything in it from a descriptor
    pub fn read_screen(&mut self, descriptor: &ScreenDescriptor, name: Option<&str>) -> Result<Screen, WorldError> {
        let name = choose_name(name, descriptor, SimulantKind::Screen);
        let screen = Screen::try_from_address(Address::new([name]))?;
        let mut state = self.make_screen_state(&descriptor.dispatcher_name, screen.name());
        if let Some(recorded) = recorded_overlay(descriptor) {
            self.migrate_overlay(recorded, &mut state);
        }
        merge_properties(descriptor.properties(), &mut state);
        self.add_screen_state(&screen, state)?;
        for group in &descriptor.groups {
            self.read_group(group, &screen, None)?;
        }
        Ok(screen)
    }

    /// Replace the game's dispatcher and properties and add its screens
    ///
    /// Existing screens are kept; screens in the descriptor must not clash
    /// with them.
    pub fn read_game(&mut self, descriptor: &GameDescriptor) -> Result<(), WorldError> {
        let previous = self.store.game();
        let dispatcher = self.registry.resolve_dispatcher(&descriptor.dispatcher_name, SimulantKind::Game);
        let mut state = GameState::new(Rc::clone(&dispatcher));
        let overlay_name = self.overlayer.find_overlay_name(dispatcher.name());
        overlay::apply_overlay(None, self.overlayer.resolve(overlay_name.as_deref()), &mut state);
        state.common.overlay_name = overlay_name;
        if let Some(recorded) = recorded_overlay(descriptor) {
            self.migrate_overlay(recorded, &mut state);
        }
        merge_properties(descriptor.properties(), &mut state);
        state.selected_screen = previous.selected_screen.clone();

        let game = Simulant::Game;
        previous.common.dispatcher.unregister(&game, self);
        self.store.set_game(Rc::new(state));
        dispatcher.register(&game, self);
        for screen in &descriptor.screens {
            self.read_screen(screen, None)?;
        }
        Ok(())
    }

    /// Create an entity from a descriptor file
    pub fn read_entity_from_file(&mut self, path: impl AsRef<Path>, group: &Group, name: Option<&str>) -> Result<Entity, WorldError> {
        let descriptor: EntityDescriptor = descriptor::read_from_file(path)?;
        self.read_entity(&descriptor, group, name)
    }

    /// Create a group from a descriptor file
    pub fn read_group_from_file(&mut self, path: impl AsRef<Path>, screen: &Screen, name: Option<&str>) -> Result<Group, WorldError> {
        let descriptor: GroupDescriptor = descriptor::read_from_file(path)?;
        self.read_group(&descriptor, screen, name)
    }

    /// Create a screen from a descriptor file
    pub fn read_screen_from_file(&mut self, path: impl AsRef<Path>, name: Option<&str>) -> Result<Screen, WorldError> {
        let descriptor: ScreenDescriptor = descriptor::read_from_file(path)?;
        self.read_screen(&descriptor, name)
    }

    /// Load the game from a descriptor file
    pub fn read_game_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), WorldError> {
        let descriptor: GameDescriptor = descriptor::read_from_file(path)?;
        self.read_game(&descriptor)
    }
}

/// Overlay name recorded in a descriptor, if a readable one is present
fn recorded_overlay(descriptor: &impl Descriptor) -> Option<Option<String>> {
    match descriptor.property(OVERLAY_NAME)? {
        Ok(Value::OptionalName(name)) => Some(name),
        Ok(other) => {
            warn!("Ignoring {} of type {:?}", OVERLAY_NAME, other.ty());
            None
        }
        Err(error) => {
            warn!("Ignoring unreadable {}: {}", OVERLAY_NAME, error);
            None
        }
    }
}

fn choose_name(name: Option<&str>, descriptor: &impl Descriptor, kind: SimulantKind) -> String {
    name.map(str::to_string)
        .or_else(|| descriptor.name())
        .unwrap_or_else(|| format!("{:?}{}", kind, time::make_id()))
}

/// Write descriptor properties over a state, attaching unknown names
fn merge_properties<S: SimulantState>(properties: &PropertyDescriptors, state: &mut S) {
    let skipped: BTreeSet<&str> = [NAME, OVERLAY_NAME, FACET_NAMES].into();
    for (name, (ty, text)) in properties {
        if skipped.contains(name.as_str()) || state::is_write_protected(name) {
            continue;
        }
        let value = match Value::from_text(*ty, text) {
            Ok(value) => value,
            Err(error) => {
                warn!("Skipping property '{}' of '{}': {}", name, state.common().name, error);
                continue;
            }
        };
        match state.set_property(name, value.clone()) {
            Ok(()) => {}
            Err(PropertyError::NotFound(_)) => state.common_mut().xtension.attach(name, value),
            Err(error) => warn!("Skipping property '{}' of '{}': {}", name, state.common().name, error),
        }
    }
}
