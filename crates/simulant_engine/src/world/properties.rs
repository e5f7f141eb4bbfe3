//! Reflective property access and change publication

use std::rc::Rc;

use super::{World, WorldError};
use crate::events::{self, ChangeData, EventData};
use crate::simulant::state::{FACET_NAMES, OVERLAY_NAME};
use crate::simulant::{
    EntityState, GameState, GroupState, PropertyError, ScreenState, Simulant, SimulantState, Value, ValueType,
};
use crate::store::{StateSnapshot, StoredState};

impl World {
    /// Replace a simulant's state with an updated copy
    ///
    /// Entity bound changes are mirrored into the owning screen's spatial
    /// index. When `property_name` is given, its value changed and the state
    /// publishes changes, a change event carrying the previous state is
    /// published.
    pub(super) fn update_state<S: StoredState>(
        &mut self,
        simulant: &Simulant,
        property_name: Option<&str>,
        update: impl FnOnce(&mut S) -> Result<(), WorldError>,
    ) -> Result<(), WorldError> {
        let address = simulant.address();
        let previous = S::lookup(&self.store, &address)?;
        let mut next = (*previous).clone();
        update(&mut next)?;

        let changed = property_name.filter(|name| {
            next.publishes_changes() && previous.get_property(name).ok() != next.get_property(name).ok()
        });
        let next = Rc::new(next);
        S::replace(&mut self.store, &address, Rc::clone(&next));

        let previous = S::into_snapshot(previous);
        if let (Simulant::Entity(entity), StateSnapshot::Entity(old), StateSnapshot::Entity(new)) =
            (simulant, &previous, &S::into_snapshot(next))
        {
            self.sync_entity_spatial(entity, old, new)?;
        }

        if let Some(name) = changed {
            let data = EventData::Change(ChangeData {
                property_name: name.to_string(),
                previous,
            });
            self.publish_default(data, events::change_event(name, &address), simulant.clone());
        }
        Ok(())
    }

    /// Read a property and its type
    pub fn get_property(&self, simulant: &Simulant, name: &str) -> Result<(Value, ValueType), WorldError> {
        let value = match simulant {
            Simulant::Game => self.store.game().get_property(name)?,
            Simulant::Screen(screen) => self.screen_state(screen)?.get_property(name)?,
            Simulant::Group(group) => self.group_state(group)?.get_property(name)?,
            Simulant::Entity(entity) => self.entity_state(entity)?.get_property(name)?,
        };
        let ty = value.ty();
        Ok((value, ty))
    }

    /// Read a property, or `None` when the simulant or property is missing
    pub fn try_get_property(&self, simulant: &Simulant, name: &str) -> Option<Value> {
        self.get_property(simulant, name).ok().map(|(value, _)| value)
    }

    /// Write a property
    ///
    /// Writing `FacetNames` recomposes the entity's facets and writing
    /// `OverlayNameOpt` reassigns the overlay; every other name is a plain
    /// typed write.
    pub fn set_property(&mut self, simulant: &Simulant, name: &str, value: Value) -> Result<(), WorldError> {
        let mismatch = |expected: ValueType, value: &Value| PropertyError::TypeMismatch {
            name: name.to_string(),
            expected,
            actual: value.ty(),
        };
        match (simulant, name) {
            (Simulant::Entity(entity), FACET_NAMES) => {
                let names = value.as_names().ok_or_else(|| mismatch(ValueType::Names, &value))?.clone();
                self.set_entity_facet_names(entity, names)
            }
            (_, OVERLAY_NAME) => {
                let overlay_name = value
                    .as_optional_name()
                    .ok_or_else(|| mismatch(ValueType::OptionalName, &value))?
                    .map(str::to_string);
                self.set_overlay_name(simulant, overlay_name)
            }
            (Simulant::Game, _) => self.write_property::<GameState>(simulant, name, value),
            (Simulant::Screen(_), _) => self.write_property::<ScreenState>(simulant, name, value),
            (Simulant::Group(_), _) => self.write_property::<GroupState>(simulant, name, value),
            (Simulant::Entity(_), _) => self.write_property::<EntityState>(simulant, name, value),
        }
    }

    fn write_property<S: StoredState>(&mut self, simulant: &Simulant, name: &str, value: Value) -> Result<(), WorldError> {
        self.update_state::<S>(simulant, Some(name), |state| Ok(state.set_property(name, value)?))
    }

    /// Attach a dynamic property if the simulant lacks it
    pub fn attach_property(&mut self, simulant: &Simulant, name: &str, value: Value) -> Result<(), WorldError> {
        fn attach<S: StoredState>(world: &mut World, simulant: &Simulant, name: &str, value: Value) -> Result<(), WorldError> {
            world.update_state::<S>(simulant, Some(name), |state| {
                if state.property_type(name).is_none() {
                    state.common_mut().xtension.attach(name, value);
                }
                Ok(())
            })
        }
        match simulant {
            Simulant::Game => attach::<GameState>(self, simulant, name, value),
            Simulant::Screen(_) => attach::<ScreenState>(self, simulant, name, value),
            Simulant::Group(_) => attach::<GroupState>(self, simulant, name, value),
            Simulant::Entity(_) => attach::<EntityState>(self, simulant, name, value),
        }
    }

    /// Detach a dynamic property
    ///
    /// Properties declared by the dispatcher or an attached facet stay put
    /// and report `Immutable`.
    pub fn detach_property(&mut self, simulant: &Simulant, name: &str) -> Result<(), WorldError> {
        fn detach<S: StoredState>(world: &mut World, simulant: &Simulant, name: &str) -> Result<(), WorldError> {
            world.update_state::<S>(simulant, None, |state| {
                if state.capability_definitions().iter().any(|definition| definition.name == name) {
                    return Err(PropertyError::Immutable(name.to_string()).into());
                }
                state
                    .common_mut()
                    .xtension
                    .detach(name)
                    .map(drop)
                    .ok_or_else(|| PropertyError::NotFound(name.to_string()).into())
            })
        }
        match simulant {
            Simulant::Game => detach::<GameState>(self, simulant, name),
            Simulant::Screen(_) => detach::<ScreenState>(self, simulant, name),
            Simulant::Group(_) => detach::<GroupState>(self, simulant, name),
            Simulant::Entity(_) => detach::<EntityState>(self, simulant, name),
        }
    }
}
