//! Nested Screen→Group→Entity index of live simulants

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::simulant::{Entity, Group, Screen};

#[derive(Debug, Clone)]
struct GroupNode {
    group: Group,
    entities: BTreeMap<String, Entity>,
}

#[derive(Debug, Clone)]
struct ScreenNode {
    screen: Screen,
    groups: BTreeMap<String, GroupNode>,
}

/// Name-ordered hierarchy of every live screen, group and entity
#[derive(Debug, Clone, Default)]
pub struct AddressDirectory {
    screens: Rc<BTreeMap<String, ScreenNode>>,
}

impl AddressDirectory {
    /// Empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a screen; an existing entry keeps its children
    pub fn add_screen(&mut self, screen: &Screen) {
        Rc::make_mut(&mut self.screens)
            .entry(screen.name().to_string())
            .or_insert_with(|| ScreenNode { screen: screen.clone(), groups: BTreeMap::new() });
    }

    /// Record a group; returns false when its screen is absent
    pub fn add_group(&mut self, group: &Group) -> bool {
        let screen_name = group.screen();
        let Some(screen) = Rc::make_mut(&mut self.screens).get_mut(screen_name.name()) else {
            return false;
        };
        screen
            .groups
            .entry(group.name().to_string())
            .or_insert_with(|| GroupNode { group: group.clone(), entities: BTreeMap::new() });
        true
    }

    /// Record an entity; returns false when its group is absent
    pub fn add_entity(&mut self, entity: &Entity) -> bool {
        let group = entity.group();
        let Some(node) = Rc::make_mut(&mut self.screens)
            .get_mut(group.screen().name())
            .and_then(|screen| screen.groups.get_mut(group.name()))
        else {
            return false;
        };
        node.entities.insert(entity.name().to_string(), entity.clone());
        true
    }

    /// Forget a screen and everything below it
    pub fn remove_screen(&mut self, screen: &Screen) {
        if self.screens.contains_key(screen.name()) {
            Rc::make_mut(&mut self.screens).remove(screen.name());
        }
    }

    /// Forget a group and everything below it
    pub fn remove_group(&mut self, group: &Group) {
        if self.contains_group(group) {
            if let Some(screen) = Rc::make_mut(&mut self.screens).get_mut(group.screen().name()) {
                screen.groups.remove(group.name());
            }
        }
    }

    /// Forget an entity
    pub fn remove_entity(&mut self, entity: &Entity) {
        if self.contains_entity(entity) {
            let group = entity.group();
            if let Some(node) = Rc::make_mut(&mut self.screens)
                .get_mut(group.screen().name())
                .and_then(|screen| screen.groups.get_mut(group.name()))
            {
                node.entities.remove(entity.name());
            }
        }
    }

    /// Whether a screen is recorded
    pub fn contains_screen(&self, screen: &Screen) -> bool {
        self.screens.contains_key(screen.name())
    }

    /// Whether a group is recorded
    pub fn contains_group(&self, group: &Group) -> bool {
        self.group_node(group).is_some()
    }

    /// Whether an entity is recorded
    pub fn contains_entity(&self, entity: &Entity) -> bool {
        self.group_node(&entity.group())
            .is_some_and(|node| node.entities.contains_key(entity.name()))
    }

    fn group_node(&self, group: &Group) -> Option<&GroupNode> {
        self.screens
            .get(group.screen().name())
            .and_then(|screen| screen.groups.get(group.name()))
    }

    /// Every screen, by name
    pub fn screens(&self) -> Vec<Screen> {
        self.screens.values().map(|node| node.screen.clone()).collect()
    }

    /// Groups of a screen, by name
    pub fn groups(&self, screen: &Screen) -> Vec<Group> {
        self.screens
            .get(screen.name())
            .map(|node| node.groups.values().map(|group| group.group.clone()).collect())
            .unwrap_or_default()
    }

    /// Entities of a group, by name
    pub fn entities(&self, group: &Group) -> Vec<Entity> {
        self.group_node(group)
            .map(|node| node.entities.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Every entity below a screen, ordered by group then name
    pub fn screen_entities(&self, screen: &Screen) -> Vec<Entity> {
        self.screens
            .get(screen.name())
            .map(|node| {
                node.groups
                    .values()
                    .flat_map(|group| group.entities.values().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}
