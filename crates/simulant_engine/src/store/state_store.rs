//! Combined store of every simulant state plus the address directory
//!
//! Adds and removes touch the flat per-kind map and the directory in the
//! same call, so the directory always mirrors the stored key set.

use std::rc::Rc;

use super::{AddressDirectory, SimulantStore, StoreError};
use crate::simulant::{Entity, EntityState, GameState, Group, GroupState, Screen, ScreenState};

/// Every simulant state of one world revision
#[derive(Clone)]
pub struct StateStore {
    game: Rc<GameState>,
    screens: SimulantStore<ScreenState>,
    groups: SimulantStore<GroupState>,
    entities: SimulantStore<EntityState>,
    directory: AddressDirectory,
}

impl StateStore {
    /// Store holding only the game
    pub fn new(game: GameState) -> Self {
        Self {
            game: Rc::new(game),
            screens: SimulantStore::new(),
            groups: SimulantStore::new(),
            entities: SimulantStore::new(),
            directory: AddressDirectory::new(),
        }
    }

    /// The game state
    pub fn game(&self) -> Rc<GameState> {
        Rc::clone(&self.game)
    }

    /// Replace the game state
    pub fn set_game(&mut self, game: Rc<GameState>) {
        self.game = game;
    }

    /// Screen states
    pub fn screens(&self) -> &SimulantStore<ScreenState> {
        &self.screens
    }

    pub(crate) fn screens_mut(&mut self) -> &mut SimulantStore<ScreenState> {
        &mut self.screens
    }

    /// Group states
    pub fn groups(&self) -> &SimulantStore<GroupState> {
        &self.groups
    }

    pub(crate) fn groups_mut(&mut self) -> &mut SimulantStore<GroupState> {
        &mut self.groups
    }

    /// Entity states
    pub fn entities(&self) -> &SimulantStore<EntityState> {
        &self.entities
    }

    pub(crate) fn entities_mut(&mut self) -> &mut SimulantStore<EntityState> {
        &mut self.entities
    }

    /// Hierarchy of live simulants
    pub fn directory(&self) -> &AddressDirectory {
        &self.directory
    }

    /// Add a screen
    pub fn add_screen(&mut self, screen: &Screen, state: ScreenState, may_replace: bool) -> Result<(), StoreError> {
        self.screens.add(screen.address().clone(), Rc::new(state), may_replace)?;
        self.directory.add_screen(screen);
        Ok(())
    }

    /// Add a group; its screen must exist
    pub fn add_group(&mut self, group: &Group, state: GroupState, may_replace: bool) -> Result<(), StoreError> {
        if !self.directory.contains_screen(&group.screen()) {
            return Err(StoreError::MissingParent(group.address().clone()));
        }
        self.groups.add(group.address().clone(), Rc::new(state), may_replace)?;
        self.directory.add_group(group);
        Ok(())
    }

    /// Add an entity; its group must exist
    pub fn add_entity(&mut self, entity: &Entity, state: EntityState, may_replace: bool) -> Result<(), StoreError> {
        if !self.directory.contains_group(&entity.group()) {
            return Err(StoreError::MissingParent(entity.address().clone()));
        }
        self.entities.add(entity.address().clone(), Rc::new(state), may_replace)?;
        self.directory.add_entity(entity);
        Ok(())
    }

    /// Remove a screen; its groups must already be gone
    pub fn remove_screen(&mut self, screen: &Screen) -> Option<Rc<ScreenState>> {
        debug_assert!(self.directory.groups(screen).is_empty(), "screen '{screen}' still has groups");
        self.directory.remove_screen(screen);
        self.screens.remove(screen.address())
    }

    /// Remove a group; its entities must already be gone
    pub fn remove_group(&mut self, group: &Group) -> Option<Rc<GroupState>> {
        debug_assert!(self.directory.entities(group).is_empty(), "group '{group}' still has entities");
        self.directory.remove_group(group);
        self.groups.remove(group.address())
    }

    /// Remove an entity
    pub fn remove_entity(&mut self, entity: &Entity) -> Option<Rc<EntityState>> {
        self.directory.remove_entity(entity);
        self.entities.remove(entity.address())
    }

    /// Whether a screen exists
    pub fn contains_screen(&self, screen: &Screen) -> bool {
        self.screens.contains(screen.address())
    }

    /// Whether a group exists
    pub fn contains_group(&self, group: &Group) -> bool {
        self.groups.contains(group.address())
    }

    /// Whether an entity exists
    pub fn contains_entity(&self, entity: &Entity) -> bool {
        self.entities.contains(entity.address())
    }

    /// Check that the directory mirrors the stored key sets
    pub fn is_consistent(&self) -> bool {
        let screens = self.directory.screens();
        let groups: Vec<Group> = screens.iter().flat_map(|screen| self.directory.groups(screen)).collect();
        let entities: Vec<Entity> = groups.iter().flat_map(|group| self.directory.entities(group)).collect();
        screens.len() == self.screens.len()
            && groups.len() == self.groups.len()
            && entities.len() == self.entities.len()
            && screens.iter().all(|screen| self.contains_screen(screen))
            && groups.iter().all(|group| self.contains_group(group))
            && entities.iter().all(|entity| self.contains_entity(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::BaseDispatcher;
    use crate::simulant::SimulantKind;
    use crate::spatial::QuadtreeConfig;

    fn store() -> StateStore {
        StateStore::new(GameState::new(Rc::new(BaseDispatcher::new(SimulantKind::Game))))
    }

    fn entity_state(name: &str) -> EntityState {
        EntityState::new(Rc::new(BaseDispatcher::new(SimulantKind::Entity)), name)
    }

    #[test]
    fn test_add_and_remove_keep_directory_consistent() {
        let mut store = store();
        let entity = Entity::new("S", "G", "E");
        let screen_state = ScreenState::new(
            Rc::new(BaseDispatcher::new(SimulantKind::Screen)),
            "S",
            &QuadtreeConfig::default(),
        );
        store.add_screen(&entity.screen(), screen_state, false).unwrap();
        store
            .add_group(&entity.group(), GroupState::new(Rc::new(BaseDispatcher::new(SimulantKind::Group)), "G"), false)
            .unwrap();
        store.add_entity(&entity, entity_state("E"), false).unwrap();
        assert!(store.is_consistent());

        assert!(matches!(
            store.add_entity(&entity, entity_state("E"), false),
            Err(StoreError::AlreadyExists(_))
        ));

        store.remove_entity(&entity);
        store.remove_group(&entity.group());
        assert!(store.is_consistent());
        assert!(!store.contains_entity(&entity));
        assert!(store.remove_entity(&entity).is_none());
    }

    #[test]
    fn test_missing_parent() {
        let mut store = store();
        let entity = Entity::new("S", "G", "E");
        assert_eq!(
            store.add_entity(&entity, entity_state("E"), false),
            Err(StoreError::MissingParent(entity.address().clone()))
        );
        assert!(store.is_consistent());
    }
}
