//! Entity clipboard
//!
//! The clipboard is an explicit service value rather than process-wide
//! state; whoever owns the editing session owns the clipboard. Copy and cut
//! capture a descriptor; paste is read-only and may be repeated.

use super::{World, WorldError};
use crate::descriptor::{Descriptor, EntityDescriptor};
use crate::foundation::math::Vec2;
use crate::simulant::state::NAME;
use crate::simulant::{Entity, Group, Simulant};

/// Holds at most one copied entity
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: Option<EntityDescriptor>,
}

impl Clipboard {
    /// Empty clipboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing has been copied
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// The copied descriptor
    pub fn content(&self) -> Option<&EntityDescriptor> {
        self.content.as_ref()
    }

    /// Forget the copied entity
    pub fn clear(&mut self) {
        self.content = None;
    }

    /// Copy an entity
    pub fn copy(&mut self, world: &World, entity: &Entity) -> Result<(), WorldError> {
        self.content = Some(world.write_entity(entity)?);
        Ok(())
    }

    /// Copy an entity, then destroy it
    pub fn cut(&mut self, world: &mut World, entity: &Entity) -> Result<(), WorldError> {
        self.copy(world, entity)?;
        world.destroy_entity_immediate(entity)
    }

    /// Create a new entity from the clipboard
    ///
    /// The copy gets `name` or a generated name, never the original's, and
    /// is moved to `position` when one is given. Returns `None` when the
    /// clipboard is empty.
    pub fn paste(
        &self,
        world: &mut World,
        group: &Group,
        name: Option<&str>,
        position: Option<Vec2>,
    ) -> Result<Option<Entity>, WorldError> {
        let Some(content) = self.content.as_ref() else {
            return Ok(None);
        };
        let mut descriptor = content.clone();
        descriptor.properties_mut().remove(NAME);
        let entity = world.read_entity(&descriptor, group, name)?;
        if let Some(position) = position {
            world.set_property(&Simulant::Entity(entity.clone()), "Position", position.into())?;
        }
        Ok(Some(entity))
    }
}
