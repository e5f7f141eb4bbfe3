//! Property values, definitions and the dynamic property bag

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec2;

/// Whether an entity is positioned in world space or screen space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewType {
    /// World space, moves with the eye
    #[default]
    Relative,
    /// Screen space, fixed relative to the eye
    Absolute,
}

/// Type tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// `bool`
    Bool,
    /// `i64`
    Int,
    /// `f32`
    Float,
    /// `String`
    String,
    /// 2D vector
    Vec2,
    /// Ordered set of names
    Names,
    /// Optional name
    OptionalName,
    /// [`ViewType`]
    ViewType,
}

/// A dynamically typed property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f32),
    /// Text
    String(String),
    /// 2D vector
    Vec2(Vec2),
    /// Ordered set of names
    Names(BTreeSet<String>),
    /// Optional name
    OptionalName(Option<String>),
    /// View type
    ViewType(ViewType),
}

/// Property access failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// No property of that name exists on the simulant
    #[error("Property '{0}' not found")]
    NotFound(String),

    /// The property cannot be written after creation
    #[error("Property '{0}' is immutable")]
    Immutable(String),

    /// The written value has a different type than the property
    #[error("Property '{name}' expects {expected:?} but was given {actual:?}")]
    TypeMismatch {
        /// Property name
        name: String,
        /// Declared type
        expected: ValueType,
        /// Type of the rejected value
        actual: ValueType,
    },

    /// Text form of a value could not be parsed
    #[error("Could not parse {ty:?} value '{text}': {message}")]
    Parse {
        /// Requested type
        ty: ValueType,
        /// Offending text
        text: String,
        /// Parser message
        message: String,
    },
}

impl Value {
    /// Type tag of this value
    pub fn ty(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::Vec2(_) => ValueType::Vec2,
            Self::Names(_) => ValueType::Names,
            Self::OptionalName(_) => ValueType::OptionalName,
            Self::ViewType(_) => ValueType::ViewType,
        }
    }

    /// Render the payload as RON text (without the type tag)
    pub fn to_text(&self) -> String {
        let rendered = match self {
            Self::Bool(value) => ron::to_string(value),
            Self::Int(value) => ron::to_string(value),
            Self::Float(value) => ron::to_string(value),
            Self::String(value) => ron::to_string(value),
            Self::Vec2(value) => ron::to_string(&(value.x, value.y)),
            Self::Names(value) => ron::to_string(value),
            Self::OptionalName(value) => ron::to_string(value),
            Self::ViewType(value) => ron::to_string(value),
        };
        // every payload here is plain data, so rendering cannot fail
        rendered.unwrap_or_default()
    }

    /// Parse RON text as a value of the given type
    pub fn from_text(ty: ValueType, text: &str) -> Result<Self, PropertyError> {
        fn parse<T: for<'de> Deserialize<'de>>(ty: ValueType, text: &str) -> Result<T, PropertyError> {
            ron::from_str(text).map_err(|error| PropertyError::Parse {
                ty,
                text: text.to_string(),
                message: error.to_string(),
            })
        }
        Ok(match ty {
            ValueType::Bool => Self::Bool(parse(ty, text)?),
            ValueType::Int => Self::Int(parse(ty, text)?),
            ValueType::Float => Self::Float(parse(ty, text)?),
            ValueType::String => Self::String(parse(ty, text)?),
            ValueType::Vec2 => {
                let (x, y): (f32, f32) = parse(ty, text)?;
                Self::Vec2(Vec2::new(x, y))
            }
            ValueType::Names => Self::Names(parse(ty, text)?),
            ValueType::OptionalName => Self::OptionalName(parse(ty, text)?),
            ValueType::ViewType => Self::ViewType(parse(ty, text)?),
        })
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(value) = self { Some(*value) } else { None }
    }

    /// Integer payload
    pub fn as_int(&self) -> Option<i64> {
        if let Self::Int(value) = self { Some(*value) } else { None }
    }

    /// Float payload
    pub fn as_float(&self) -> Option<f32> {
        if let Self::Float(value) = self { Some(*value) } else { None }
    }

    /// Text payload
    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(value) = self { Some(value) } else { None }
    }

    /// Vector payload
    pub fn as_vec2(&self) -> Option<Vec2> {
        if let Self::Vec2(value) = self { Some(*value) } else { None }
    }

    /// Name set payload
    pub fn as_names(&self) -> Option<&BTreeSet<String>> {
        if let Self::Names(value) = self { Some(value) } else { None }
    }

    /// Optional name payload
    pub fn as_optional_name(&self) -> Option<Option<&str>> {
        if let Self::OptionalName(value) = self { Some(value.as_deref()) } else { None }
    }

    /// View type payload
    pub fn as_view_type(&self) -> Option<ViewType> {
        if let Self::ViewType(value) = self { Some(*value) } else { None }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec2> for Value {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

impl From<ViewType> for Value {
    fn from(value: ViewType) -> Self {
        Self::ViewType(value)
    }
}

/// A property declared by a dispatcher or facet, with its default value
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// Property name
    pub name: String,
    /// Default value; its type is the property's type
    pub default: Value,
}

impl PropertyDefinition {
    /// Declare a property
    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
        }
    }

    /// Declared type
    pub fn ty(&self) -> ValueType {
        self.default.ty()
    }
}

/// Open-ended, name-ordered bag of dynamically attached properties
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Xtension {
    properties: BTreeMap<String, Value>,
}

impl Xtension {
    /// Empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a property
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Whether a property is attached
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Attach a property if absent; existing values are kept
    pub fn attach(&mut self, name: &str, value: Value) {
        if !self.properties.contains_key(name) {
            self.properties.insert(name.to_string(), value);
        }
    }

    /// Remove a property, returning its value
    pub fn detach(&mut self, name: &str) -> Option<Value> {
        self.properties.remove(name)
    }

    /// Overwrite an attached property, enforcing its type
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        let current = self
            .properties
            .get_mut(name)
            .ok_or_else(|| PropertyError::NotFound(name.to_string()))?;
        if current.ty() != value.ty() {
            return Err(PropertyError::TypeMismatch {
                name: name.to_string(),
                expected: current.ty(),
                actual: value.ty(),
            });
        }
        *current = value;
        Ok(())
    }

    /// Iterate in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.properties.iter()
    }

    /// Number of attached properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether nothing is attached
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
