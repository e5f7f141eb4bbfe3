//! Descriptor shapes exchanged with content files
//!
//! A descriptor records a simulant's dispatcher and the properties that
//! differ from what its overlay would supply. Values are stored as a type tag
//! plus the RON text of the payload.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::simulant::{PropertyError, Value, ValueType};
use crate::simulant::state::NAME;

/// Name-ordered property texts
pub type PropertyDescriptors = BTreeMap<String, (ValueType, String)>;

/// Descriptor file failures
#[derive(thiserror::Error, Debug)]
pub enum DescriptorError {
    /// File system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid descriptor
    #[error("Parse error: {0}")]
    Parse(String),

    /// The descriptor could not be rendered
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Accessors shared by every descriptor kind
pub trait Descriptor {
    /// Dispatcher name
    fn dispatcher_name(&self) -> &str;

    /// Property texts
    fn properties(&self) -> &PropertyDescriptors;

    /// Mutable property texts
    fn properties_mut(&mut self) -> &mut PropertyDescriptors;

    /// Parse one property
    fn property(&self, name: &str) -> Option<Result<Value, PropertyError>> {
        self.properties()
            .get(name)
            .map(|(ty, text)| Value::from_text(*ty, text))
    }

    /// Record one property
    fn set_property(&mut self, name: &str, value: &Value) {
        self.properties_mut().insert(name.to_string(), describe_value(value));
    }

    /// Recorded simulant name, if any
    fn name(&self) -> Option<String> {
        match self.property(NAME) {
            Some(Ok(Value::String(name))) => Some(name),
            _ => None,
        }
    }
}

macro_rules! descriptor {
    ($(#[$meta:meta])* $name:ident $(, $children:ident: $child:ty)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            /// Dispatcher name
            pub dispatcher_name: String,
            /// Properties differing from the overlay
            pub properties: PropertyDescriptors,
            $(
                /// Child descriptors
                pub $children: Vec<$child>,
            )?
        }

        impl Descriptor for $name {
            fn dispatcher_name(&self) -> &str {
                &self.dispatcher_name
            }

            fn properties(&self) -> &PropertyDescriptors {
                &self.properties
            }

            fn properties_mut(&mut self) -> &mut PropertyDescriptors {
                &mut self.properties
            }
        }
    };
}

descriptor!(
    /// Describes one entity
    EntityDescriptor
);
descriptor!(
    /// Describes a group and its entities
    GroupDescriptor, entities: EntityDescriptor
);
descriptor!(
    /// Describes a screen and its groups
    ScreenDescriptor, groups: GroupDescriptor
);
descriptor!(
    /// Describes the game and its screens
    GameDescriptor, screens: ScreenDescriptor
);

/// Type tag and text of a value, as stored in a descriptor
pub fn describe_value(value: &Value) -> (ValueType, String) {
    (value.ty(), value.to_text())
}

/// Write a descriptor as RON, replacing the file atomically
///
/// The text goes to a sibling temporary file which is then renamed over the
/// target, so readers never observe a partial file.
pub fn write_to_file<D: Serialize>(descriptor: &D, path: impl AsRef<Path>) -> Result<(), DescriptorError> {
    let path = path.as_ref();
    let text = ron::ser::to_string_pretty(descriptor, ron::ser::PrettyConfig::default())
        .map_err(|error| DescriptorError::Serialize(error.to_string()))?;
    let mut temp_name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);
    fs::write(&temp_path, text)?;
    fs::rename(&temp_path, path)?;
    info!("Wrote descriptor '{}'", path.display());
    Ok(())
}

/// Read a RON descriptor file
pub fn read_from_file<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, DescriptorError> {
    let text = fs::read_to_string(path)?;
    ron::from_str(&text).map_err(|error| DescriptorError::Parse(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec2;

    #[test]
    fn test_property_text_access() {
        let mut descriptor = EntityDescriptor::default();
        descriptor.set_property("Position", &Value::Vec2(Vec2::new(1.0, 2.0)));
        descriptor.set_property(NAME, &Value::from("Ship"));
        assert_eq!(descriptor.property("Position"), Some(Ok(Value::Vec2(Vec2::new(1.0, 2.0)))));
        assert_eq!(descriptor.name().as_deref(), Some("Ship"));
        assert!(descriptor.property("Missing").is_none());
    }

    #[test]
    fn test_file_round_trip() {
        let mut entity = EntityDescriptor { dispatcher_name: "EntityDispatcher".into(), ..Default::default() };
        entity.set_property("Depth", &Value::Float(2.5));
        let group = GroupDescriptor {
            dispatcher_name: "GroupDispatcher".into(),
            properties: PropertyDescriptors::new(),
            entities: vec![entity],
        };

        let dir = std::env::temp_dir().join(format!("descriptor_test_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("group.ron");
        write_to_file(&group, &path).unwrap();
        let loaded: GroupDescriptor = read_from_file(&path).unwrap();
        assert_eq!(loaded, group);
        assert!(!dir.join("group.ron.tmp").exists());
        fs::remove_dir_all(&dir).ok();
    }
}
