//! Simulant state records
//!
//! Every kind of simulant stores a [`SimulantCommon`] block (identity,
//! dispatcher, overlay and the dynamic property bag) plus its kind-specific
//! intrinsic fields. Intrinsics are exposed by name through a static accessor
//! table per kind, so reflective callers never need runtime type inspection.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use super::property::{PropertyDefinition, PropertyError, Value, ValueType, ViewType, Xtension};
use super::{Entity, Screen, SimulantKind};
use crate::composition::{Dispatcher, Facet};
use crate::foundation::math::{Bounds, Vec2};
use crate::foundation::time::{self, TickTime};
use crate::spatial::{MutantCache, Quadtree, QuadtreeConfig};

/// Process-unique id property
pub const ID: &str = "Id";
/// Simulant name property
pub const NAME: &str = "Name";
/// Dispatcher name property
pub const DISPATCHER: &str = "DispatcherNp";
/// Creation time stamp property
pub const CREATION_TIME_STAMP: &str = "CreationTimeStampNp";
/// Active overlay property
pub const OVERLAY_NAME: &str = "OverlayNameOpt";
/// Declared facet names property (entities only)
pub const FACET_NAMES: &str = "FacetNames";

/// Properties that can never be written after creation
pub fn is_write_protected(name: &str) -> bool {
    matches!(name, ID | NAME | DISPATCHER | CREATION_TIME_STAMP)
}

/// Accessor table entry for an intrinsic (fast-path) property
pub struct Intrinsic<S> {
    /// Property name
    pub name: &'static str,
    /// Property type
    pub ty: ValueType,
    /// Value of the property on a freshly created record
    pub default: fn() -> Value,
    /// Read the property
    pub get: fn(&S) -> Value,
    /// Write the property; `None` when the property is read-only here.
    /// Returns `None` when the value has the wrong payload.
    pub set: Option<fn(&mut S, &Value) -> Option<()>>,
}

/// Fields shared by every simulant kind
#[derive(Debug, Clone)]
pub struct SimulantCommon {
    /// Process-unique id
    pub id: u64,
    /// Name (last address segment)
    pub name: String,
    /// Milliseconds since the UNIX epoch at creation
    pub creation_time_stamp: i64,
    /// Primary capability provider, fixed at creation
    pub dispatcher: Rc<dyn Dispatcher>,
    /// Overlay currently applied, if any
    pub overlay_name: Option<String>,
    /// Dynamically attached properties
    pub xtension: Xtension,
}

impl SimulantCommon {
    /// Fresh identity block with the dispatcher's properties attached
    ///
    /// Declared properties that name one of `S`'s fixed fields are served by
    /// that field and get no bag entry.
    pub fn new<S: SimulantState>(dispatcher: Rc<dyn Dispatcher>, name: impl Into<String>) -> Self {
        let mut xtension = Xtension::new();
        for definition in dispatcher.property_definitions() {
            if !S::is_fixed(&definition.name) {
                xtension.attach(&definition.name, definition.default);
            }
        }
        Self {
            id: time::make_id(),
            name: name.into(),
            creation_time_stamp: time::time_stamp(),
            dispatcher,
            overlay_name: None,
            xtension,
        }
    }
}

/// Behaviour shared by the four state records
pub trait SimulantState: Clone + fmt::Debug + 'static {
    /// Kind of simulant this record describes
    const KIND: SimulantKind;

    /// Accessor table of kind-specific intrinsic properties
    fn intrinsics() -> &'static [Intrinsic<Self>];

    /// Shared fields
    fn common(&self) -> &SimulantCommon;

    /// Shared fields, mutably
    fn common_mut(&mut self) -> &mut SimulantCommon;

    /// Whether property writes publish change events
    fn publishes_changes(&self) -> bool {
        true
    }

    /// Property definitions contributed by attached capabilities
    fn capability_definitions(&self) -> Vec<PropertyDefinition> {
        self.common().dispatcher.property_definitions()
    }

    /// Find an intrinsic accessor by name
    fn intrinsic(name: &str) -> Option<&'static Intrinsic<Self>> {
        Self::intrinsics().iter().find(|intrinsic| intrinsic.name == name)
    }

    /// Whether `name` is a well-known or intrinsic field rather than a bag entry
    fn is_fixed(name: &str) -> bool {
        matches!(name, ID | NAME | DISPATCHER | CREATION_TIME_STAMP | OVERLAY_NAME) || Self::intrinsic(name).is_some()
    }

    /// Add a capability-declared property to the bag unless it already exists
    fn attach_declared(&mut self, definition: PropertyDefinition) {
        if !Self::is_fixed(&definition.name) {
            self.common_mut().xtension.attach(&definition.name, definition.default);
        }
    }

    /// Read a property by name
    fn get_property(&self, name: &str) -> Result<Value, PropertyError> {
        let common = self.common();
        match name {
            ID => Ok(Value::Int(i64::try_from(common.id).unwrap_or(i64::MAX))),
            NAME => Ok(Value::String(common.name.clone())),
            DISPATCHER => Ok(Value::String(common.dispatcher.name().to_string())),
            CREATION_TIME_STAMP => Ok(Value::Int(common.creation_time_stamp)),
            OVERLAY_NAME => Ok(Value::OptionalName(common.overlay_name.clone())),
            _ => match Self::intrinsic(name) {
                Some(intrinsic) => Ok((intrinsic.get)(self)),
                None => common
                    .xtension
                    .get(name)
                    .cloned()
                    .ok_or_else(|| PropertyError::NotFound(name.to_string())),
            },
        }
    }

    /// Write a property by name, enforcing write protection and types
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        let mismatch = |expected: ValueType, value: &Value| PropertyError::TypeMismatch {
            name: name.to_string(),
            expected,
            actual: value.ty(),
        };
        match name {
            _ if is_write_protected(name) => Err(PropertyError::Immutable(name.to_string())),
            OVERLAY_NAME => {
                let overlay_name = value
                    .as_optional_name()
                    .ok_or_else(|| mismatch(ValueType::OptionalName, &value))?;
                self.common_mut().overlay_name = overlay_name.map(str::to_string);
                Ok(())
            }
            _ => match Self::intrinsic(name) {
                Some(intrinsic) => {
                    let set = intrinsic.set.ok_or_else(|| PropertyError::Immutable(name.to_string()))?;
                    set(self, &value).ok_or_else(|| mismatch(intrinsic.ty, &value))
                }
                None => self.common_mut().xtension.set(name, value),
            },
        }
    }

    /// Type of a property, if it exists
    fn property_type(&self, name: &str) -> Option<ValueType> {
        match name {
            ID | CREATION_TIME_STAMP => Some(ValueType::Int),
            NAME | DISPATCHER => Some(ValueType::String),
            OVERLAY_NAME => Some(ValueType::OptionalName),
            _ => Self::intrinsic(name)
                .map(|intrinsic| intrinsic.ty)
                .or_else(|| self.common().xtension.get(name).map(Value::ty)),
        }
    }

    /// Value a property takes when nothing customises it
    ///
    /// Intrinsic fields default to their table entry, which wins over any
    /// capability declaring the same name; other capability-declared
    /// properties default to their definition.
    fn default_value(&self, name: &str) -> Option<Value> {
        if let Some(intrinsic) = Self::intrinsic(name) {
            return Some((intrinsic.default)());
        }
        self.capability_definitions()
            .into_iter()
            .find(|definition| definition.name == name)
            .map(|definition| definition.default)
    }

    /// Every writable intrinsic and dynamic property, in a stable order
    fn properties(&self) -> Vec<(String, Value)> {
        let intrinsics = Self::intrinsics()
            .iter()
            .filter(|intrinsic| intrinsic.set.is_some())
            .map(|intrinsic| (intrinsic.name.to_string(), (intrinsic.get)(self)));
        let dynamic = self
            .common()
            .xtension
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()));
        intrinsics.chain(dynamic).collect()
    }
}

bitflags! {
    /// Boolean entity settings packed into one field
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntityFlags: u8 {
        /// Rendered and pickable
        const VISIBLE = 0b0000_0001;
        /// Exempt from visibility culling
        const OMNIPRESENT = 0b0000_0010;
        /// Every property write publishes a change event
        const PUBLISH_CHANGES = 0b0000_0100;
        /// Included when serialized
        const PERSISTENT = 0b0000_1000;
    }
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PERSISTENT
    }
}

fn default_entity_size() -> Vec2 {
    Vec2::new(1.0, 1.0)
}

/// State of an entity
#[derive(Debug, Clone)]
pub struct EntityState {
    /// Shared fields
    pub common: SimulantCommon,
    /// Declared facet names
    pub facet_names: BTreeSet<String>,
    /// Materialised facets, in attach order; mirrors `facet_names`
    pub facets: Vec<Rc<dyn Facet>>,
    /// Bottom-left corner
    pub position: Vec2,
    /// Width and height
    pub size: Vec2,
    /// Rotation in radians
    pub rotation: f32,
    /// Draw and pick order; higher is nearer
    pub depth: f32,
    /// Extra bounds around the entity, as a multiple of its size
    pub overflow: f32,
    /// Coordinate space
    pub view_type: ViewType,
    /// Boolean settings
    pub flags: EntityFlags,
}

impl EntityState {
    /// Default entity with the given dispatcher
    pub fn new(dispatcher: Rc<dyn Dispatcher>, name: impl Into<String>) -> Self {
        Self {
            common: SimulantCommon::new::<Self>(dispatcher, name),
            facet_names: BTreeSet::new(),
            facets: Vec::new(),
            position: Vec2::zeros(),
            size: default_entity_size(),
            rotation: 0.0,
            depth: 0.0,
            overflow: 0.0,
            view_type: ViewType::Relative,
            flags: EntityFlags::default(),
        }
    }

    /// Exact bounds from position and size
    pub fn bounds(&self) -> Bounds {
        Bounds::from_position_size(self.position, self.size)
    }

    /// Bounds grown by the overflow factor
    pub fn bounds_overflow(&self) -> Bounds {
        self.bounds().with_overflow(self.overflow)
    }

    /// Whether a point falls inside the entity's rotated box
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.bounds().contains_point_rotated(point, self.rotation)
    }

    /// Largest bounds the entity can occupy, accounting for rotation
    pub fn bounds_max(&self) -> Bounds {
        let bounds = self.bounds_overflow();
        if self.rotation == 0.0 { bounds } else { bounds.rotated_max() }
    }

    /// Whether the entity bypasses spatial partitioning
    pub fn is_exempt(&self) -> bool {
        self.flags.contains(EntityFlags::OMNIPRESENT) || self.view_type == ViewType::Absolute
    }

    /// Visible flag
    pub fn visible(&self) -> bool {
        self.flags.contains(EntityFlags::VISIBLE)
    }

    /// Persistent flag
    pub fn persistent(&self) -> bool {
        self.flags.contains(EntityFlags::PERSISTENT)
    }

    /// Attached facet by name
    pub fn facet(&self, name: &str) -> Option<&Rc<dyn Facet>> {
        self.facets.iter().find(|facet| facet.name() == name)
    }
}

static ENTITY_INTRINSICS: &[Intrinsic<EntityState>] = &[
    Intrinsic {
        name: FACET_NAMES,
        ty: ValueType::Names,
        default: || Value::Names(BTreeSet::new()),
        get: |s| Value::Names(s.facet_names.clone()),
        set: None,
    },
    Intrinsic {
        name: "Position",
        ty: ValueType::Vec2,
        default: || Value::Vec2(Vec2::zeros()),
        get: |s| Value::Vec2(s.position),
        set: Some(|s, v| { s.position = v.as_vec2()?; Some(()) }),
    },
    Intrinsic {
        name: "Size",
        ty: ValueType::Vec2,
        default: || Value::Vec2(default_entity_size()),
        get: |s| Value::Vec2(s.size),
        set: Some(|s, v| { s.size = v.as_vec2()?; Some(()) }),
    },
    Intrinsic {
        name: "Rotation",
        ty: ValueType::Float,
        default: || Value::Float(0.0),
        get: |s| Value::Float(s.rotation),
        set: Some(|s, v| { s.rotation = v.as_float()?; Some(()) }),
    },
    Intrinsic {
        name: "Depth",
        ty: ValueType::Float,
        default: || Value::Float(0.0),
        get: |s| Value::Float(s.depth),
        set: Some(|s, v| { s.depth = v.as_float()?; Some(()) }),
    },
    Intrinsic {
        name: "Overflow",
        ty: ValueType::Float,
        default: || Value::Float(0.0),
        get: |s| Value::Float(s.overflow),
        set: Some(|s, v| { s.overflow = v.as_float()?; Some(()) }),
    },
    Intrinsic {
        name: "ViewType",
        ty: ValueType::ViewType,
        default: || Value::ViewType(ViewType::Relative),
        get: |s| Value::ViewType(s.view_type),
        set: Some(|s, v| { s.view_type = v.as_view_type()?; Some(()) }),
    },
    Intrinsic {
        name: "Visible",
        ty: ValueType::Bool,
        default: || Value::Bool(EntityFlags::default().contains(EntityFlags::VISIBLE)),
        get: |s| Value::Bool(s.flags.contains(EntityFlags::VISIBLE)),
        set: Some(|s, v| { s.flags.set(EntityFlags::VISIBLE, v.as_bool()?); Some(()) }),
    },
    Intrinsic {
        name: "Omnipresent",
        ty: ValueType::Bool,
        default: || Value::Bool(EntityFlags::default().contains(EntityFlags::OMNIPRESENT)),
        get: |s| Value::Bool(s.flags.contains(EntityFlags::OMNIPRESENT)),
        set: Some(|s, v| { s.flags.set(EntityFlags::OMNIPRESENT, v.as_bool()?); Some(()) }),
    },
    Intrinsic {
        name: "PublishChanges",
        ty: ValueType::Bool,
        default: || Value::Bool(EntityFlags::default().contains(EntityFlags::PUBLISH_CHANGES)),
        get: |s| Value::Bool(s.flags.contains(EntityFlags::PUBLISH_CHANGES)),
        set: Some(|s, v| { s.flags.set(EntityFlags::PUBLISH_CHANGES, v.as_bool()?); Some(()) }),
    },
    Intrinsic {
        name: "Persistent",
        ty: ValueType::Bool,
        default: || Value::Bool(EntityFlags::default().contains(EntityFlags::PERSISTENT)),
        get: |s| Value::Bool(s.flags.contains(EntityFlags::PERSISTENT)),
        set: Some(|s, v| { s.flags.set(EntityFlags::PERSISTENT, v.as_bool()?); Some(()) }),
    },
];

impl SimulantState for EntityState {
    const KIND: SimulantKind = SimulantKind::Entity;

    fn intrinsics() -> &'static [Intrinsic<Self>] {
        ENTITY_INTRINSICS
    }

    fn common(&self) -> &SimulantCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut SimulantCommon {
        &mut self.common
    }

    fn publishes_changes(&self) -> bool {
        self.flags.contains(EntityFlags::PUBLISH_CHANGES)
    }

    fn capability_definitions(&self) -> Vec<PropertyDefinition> {
        let mut definitions = self.common.dispatcher.property_definitions();
        for facet in &self.facets {
            definitions.extend(facet.property_definitions());
        }
        definitions
    }
}

/// Phase of a screen's transition state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TransitionState {
    /// Transitioning in after being selected
    Incoming,
    /// Fully active
    #[default]
    Idling,
    /// Transitioning out before the next screen is selected
    Outgoing,
}

/// Direction of a transition descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionType {
    /// Played while a screen becomes active
    Incoming,
    /// Played while a screen is left
    Outgoing,
}

/// Describes one screen transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    /// Direction
    pub transition_type: TransitionType,
    /// Duration in ticks
    pub lifetime: u64,
}

/// State of a screen
#[derive(Debug, Clone)]
pub struct ScreenState {
    /// Shared fields
    pub common: SimulantCommon,
    /// Spatial index over the screen's entities, behind a mutation cache
    pub spatial: MutantCache<Quadtree<Entity>>,
    /// Current transition phase
    pub transition_state: TransitionState,
    /// Tick at which the current phase began
    pub transition_ticks: TickTime,
    /// Incoming transition descriptor
    pub incoming: Transition,
    /// Outgoing transition descriptor
    pub outgoing: Transition,
    /// Included when serialized
    pub persistent: bool,
}

impl ScreenState {
    /// Default screen with the given dispatcher and spatial parameters
    pub fn new(dispatcher: Rc<dyn Dispatcher>, name: impl Into<String>, spatial: &QuadtreeConfig) -> Self {
        Self {
            common: SimulantCommon::new::<Self>(dispatcher, name),
            spatial: MutantCache::new(Quadtree::new(spatial.clone())),
            transition_state: TransitionState::Idling,
            transition_ticks: TickTime::ZERO,
            incoming: Transition { transition_type: TransitionType::Incoming, lifetime: 0 },
            outgoing: Transition { transition_type: TransitionType::Outgoing, lifetime: 0 },
            persistent: true,
        }
    }
}

fn lifetime_value(lifetime: u64) -> Value {
    Value::Int(i64::try_from(lifetime).unwrap_or(i64::MAX))
}

fn lifetime_from(value: &Value) -> Option<u64> {
    u64::try_from(value.as_int()?).ok()
}

static SCREEN_INTRINSICS: &[Intrinsic<ScreenState>] = &[
    Intrinsic {
        name: "IncomingLifetime",
        ty: ValueType::Int,
        default: || lifetime_value(0),
        get: |s| lifetime_value(s.incoming.lifetime),
        set: Some(|s, v| { s.incoming.lifetime = lifetime_from(v)?; Some(()) }),
    },
    Intrinsic {
        name: "OutgoingLifetime",
        ty: ValueType::Int,
        default: || lifetime_value(0),
        get: |s| lifetime_value(s.outgoing.lifetime),
        set: Some(|s, v| { s.outgoing.lifetime = lifetime_from(v)?; Some(()) }),
    },
    Intrinsic {
        name: "Persistent",
        ty: ValueType::Bool,
        default: || Value::Bool(true),
        get: |s| Value::Bool(s.persistent),
        set: Some(|s, v| { s.persistent = v.as_bool()?; Some(()) }),
    },
];

impl SimulantState for ScreenState {
    const KIND: SimulantKind = SimulantKind::Screen;

    fn intrinsics() -> &'static [Intrinsic<Self>] {
        SCREEN_INTRINSICS
    }

    fn common(&self) -> &SimulantCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut SimulantCommon {
        &mut self.common
    }
}

/// State of a group
#[derive(Debug, Clone)]
pub struct GroupState {
    /// Shared fields
    pub common: SimulantCommon,
    /// Whether the group's entities are shown
    pub visible: bool,
    /// Included when serialized
    pub persistent: bool,
}

impl GroupState {
    /// Default group with the given dispatcher
    pub fn new(dispatcher: Rc<dyn Dispatcher>, name: impl Into<String>) -> Self {
        Self {
            common: SimulantCommon::new::<Self>(dispatcher, name),
            visible: true,
            persistent: true,
        }
    }
}

static GROUP_INTRINSICS: &[Intrinsic<GroupState>] = &[
    Intrinsic {
        name: "Visible",
        ty: ValueType::Bool,
        default: || Value::Bool(true),
        get: |s| Value::Bool(s.visible),
        set: Some(|s, v| { s.visible = v.as_bool()?; Some(()) }),
    },
    Intrinsic {
        name: "Persistent",
        ty: ValueType::Bool,
        default: || Value::Bool(true),
        get: |s| Value::Bool(s.persistent),
        set: Some(|s, v| { s.persistent = v.as_bool()?; Some(()) }),
    },
];

impl SimulantState for GroupState {
    const KIND: SimulantKind = SimulantKind::Group;

    fn intrinsics() -> &'static [Intrinsic<Self>] {
        GROUP_INTRINSICS
    }

    fn common(&self) -> &SimulantCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut SimulantCommon {
        &mut self.common
    }
}

/// State of the game
#[derive(Debug, Clone)]
pub struct GameState {
    /// Shared fields
    pub common: SimulantCommon,
    /// Camera center in world space
    pub eye_center: Vec2,
    /// Camera viewport size
    pub eye_size: Vec2,
    /// Currently selected screen
    pub selected_screen: Option<Screen>,
    /// Screen to select once the outgoing transition finishes
    pub screen_transition_destination: Option<Screen>,
}

fn default_eye_size() -> Vec2 {
    Vec2::new(960.0, 540.0)
}

/// Name of the game simulant
pub const GAME_NAME: &str = "Game";

impl GameState {
    /// Default game with the given dispatcher
    pub fn new(dispatcher: Rc<dyn Dispatcher>) -> Self {
        Self {
            common: SimulantCommon::new::<Self>(dispatcher, GAME_NAME),
            eye_center: Vec2::zeros(),
            eye_size: default_eye_size(),
            selected_screen: None,
            screen_transition_destination: None,
        }
    }

    /// View bounds in world space for relative entities
    pub fn view_bounds_relative(&self) -> Bounds {
        Bounds::from_center_extents(self.eye_center, self.eye_size * 0.5)
    }

    /// View bounds in screen space for absolute entities
    pub fn view_bounds_absolute(&self) -> Bounds {
        Bounds::from_center_extents(Vec2::zeros(), self.eye_size * 0.5)
    }
}

fn screen_name_value(screen: Option<&Screen>) -> Value {
    Value::OptionalName(screen.map(|screen| screen.name().to_string()))
}

static GAME_INTRINSICS: &[Intrinsic<GameState>] = &[
    Intrinsic {
        name: "EyeCenter",
        ty: ValueType::Vec2,
        default: || Value::Vec2(Vec2::zeros()),
        get: |s| Value::Vec2(s.eye_center),
        set: Some(|s, v| { s.eye_center = v.as_vec2()?; Some(()) }),
    },
    Intrinsic {
        name: "EyeSize",
        ty: ValueType::Vec2,
        default: || Value::Vec2(default_eye_size()),
        get: |s| Value::Vec2(s.eye_size),
        set: Some(|s, v| { s.eye_size = v.as_vec2()?; Some(()) }),
    },
    Intrinsic {
        name: "SelectedScreenOpt",
        ty: ValueType::OptionalName,
        default: || Value::OptionalName(None),
        get: |s| screen_name_value(s.selected_screen.as_ref()),
        set: None,
    },
    Intrinsic {
        name: "ScreenTransitionDestinationOpt",
        ty: ValueType::OptionalName,
        default: || Value::OptionalName(None),
        get: |s| screen_name_value(s.screen_transition_destination.as_ref()),
        set: None,
    },
];

impl SimulantState for GameState {
    const KIND: SimulantKind = SimulantKind::Game;

    fn intrinsics() -> &'static [Intrinsic<Self>] {
        GAME_INTRINSICS
    }

    fn common(&self) -> &SimulantCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut SimulantCommon {
        &mut self.common
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::BaseDispatcher;

    fn dispatcher(kind: SimulantKind) -> Rc<dyn Dispatcher> {
        Rc::new(BaseDispatcher::new(kind))
    }

    fn assert_defaults_match<S: SimulantState>(fresh: &S) {
        for intrinsic in S::intrinsics() {
            assert_eq!((intrinsic.default)(), (intrinsic.get)(fresh), "default of {}", intrinsic.name);
            assert_eq!(fresh.default_value(intrinsic.name), Some((intrinsic.default)()));
        }
    }

    #[test]
    fn test_intrinsic_defaults_match_fresh_states() {
        assert_defaults_match(&GameState::new(dispatcher(SimulantKind::Game)));
        assert_defaults_match(&ScreenState::new(
            dispatcher(SimulantKind::Screen),
            "S",
            &QuadtreeConfig::default(),
        ));
        assert_defaults_match(&GroupState::new(dispatcher(SimulantKind::Group), "G"));
        assert_defaults_match(&EntityState::new(dispatcher(SimulantKind::Entity), "E"));
    }

    #[test]
    fn test_fixed_names_stay_out_of_the_bag() {
        let mut state = EntityState::new(dispatcher(SimulantKind::Entity), "E");
        state.attach_declared(PropertyDefinition::new("Depth", Value::Float(2.0)));
        state.attach_declared(PropertyDefinition::new(NAME, Value::String("Other".into())));
        state.attach_declared(PropertyDefinition::new("Speed", Value::Float(3.0)));

        assert!(state.common.xtension.get("Depth").is_none());
        assert!(state.common.xtension.get(NAME).is_none());
        assert_eq!(state.get_property("Speed").unwrap(), Value::Float(3.0));
        assert_eq!(state.get_property(NAME).unwrap(), Value::String("E".into()));
    }
}
