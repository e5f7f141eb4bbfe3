//! Overlays: named templates of facet names and property values
//!
//! An overlay seeds a simulant's facets and properties independently of the
//! dispatcher's own defaults. Routes map a dispatcher name to the overlay
//! applied to simulants created with it. Re-applying a changed overlay only
//! touches properties still holding the previous template's value, so user
//! edits survive hot reloads.
//!
//! Overlay files are RON documents:
//!
//! ```ron
//! (
//!     routes: { "BulletDispatcher": "Bullet" },
//!     overlays: {
//!         "Bullet": (
//!             facet_names: ["Mover"],
//!             properties: { "Speed": Int(12), "Size": Vec2((2.0, 2.0)) },
//!         ),
//!     },
//! )
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::simulant::state::{self, FACET_NAMES, OVERLAY_NAME};
use crate::simulant::{EntityState, SimulantState, Value};

/// A named template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overlay {
    /// Facets the template declares (entities only)
    pub facet_names: BTreeSet<String>,
    /// Property values the template supplies
    pub properties: BTreeMap<String, Value>,
}

/// On-disk form of an overlayer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayFile {
    /// Dispatcher name to default overlay name
    pub routes: BTreeMap<String, String>,
    /// Overlays by name
    pub overlays: BTreeMap<String, Overlay>,
}

impl Config for OverlayFile {}

/// Collection of overlays and dispatcher routes
#[derive(Debug, Clone, Default)]
pub struct Overlayer {
    routes: BTreeMap<String, String>,
    overlays: BTreeMap<String, Overlay>,
}

impl Overlayer {
    /// Overlayer without routes or overlays
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed overlay file
    pub fn from_file(file: OverlayFile) -> Self {
        Self {
            routes: file.routes,
            overlays: file.overlays,
        }
    }

    /// Load an overlay file (`.ron` or `.toml`)
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = OverlayFile::load_from_file(path)?;
        debug!("Loaded {} overlays and {} routes", file.overlays.len(), file.routes.len());
        Ok(Self::from_file(file))
    }

    /// Add or replace an overlay
    #[must_use]
    pub fn with_overlay(mut self, name: impl Into<String>, overlay: Overlay) -> Self {
        self.overlays.insert(name.into(), overlay);
        self
    }

    /// Route a dispatcher to an overlay
    #[must_use]
    pub fn with_route(mut self, dispatcher_name: impl Into<String>, overlay_name: impl Into<String>) -> Self {
        self.routes.insert(dispatcher_name.into(), overlay_name.into());
        self
    }

    /// Overlay routed to a dispatcher, if any
    ///
    /// A route naming a missing overlay is logged and treated as no route.
    pub fn find_overlay_name(&self, dispatcher_name: &str) -> Option<String> {
        let overlay_name = self.routes.get(dispatcher_name)?;
        if self.overlays.contains_key(overlay_name) {
            Some(overlay_name.clone())
        } else {
            warn!("Dispatcher '{}' routes to missing overlay '{}'", dispatcher_name, overlay_name);
            None
        }
    }

    /// Look up an overlay
    pub fn overlay(&self, name: &str) -> Option<&Overlay> {
        self.overlays.get(name)
    }

    /// Look up an optional overlay name, warning when it names nothing
    pub fn resolve(&self, overlay_name: Option<&str>) -> Option<&Overlay> {
        let name = overlay_name?;
        let overlay = self.overlay(name);
        if overlay.is_none() {
            warn!("Unknown overlay '{}'; treating it as empty", name);
        }
        overlay
    }

    /// Facet names declared by an overlay; empty for none or unknown
    pub fn facet_names(&self, overlay_name: Option<&str>) -> BTreeSet<String> {
        overlay_name
            .and_then(|name| self.overlay(name))
            .map(|overlay| overlay.facet_names.clone())
            .unwrap_or_default()
    }

    /// Value an overlay supplies for a property
    pub fn overlay_value(&self, overlay_name: Option<&str>, property_name: &str) -> Option<&Value> {
        overlay_name
            .and_then(|name| self.overlay(name))
            .and_then(|overlay| overlay.properties.get(property_name))
    }

    /// Value a simulant's property takes when nothing customises it
    ///
    /// The active overlay wins over the property's own default.
    pub fn template_value<S: SimulantState>(&self, state: &S, property_name: &str) -> Option<Value> {
        let overlay_name = state.common().overlay_name.as_deref();
        self.overlay_value(overlay_name, property_name)
            .cloned()
            .or_else(|| state.default_value(property_name))
    }
}

/// Rewrite facet names for an overlay change, keeping names the user added
///
/// Names the old overlay declared and the new one does not are removed;
/// names the new overlay adds are inserted. The materialised facets are not
/// touched.
pub fn apply_overlay_to_facet_names(
    old_overlay: Option<&Overlay>,
    new_overlay: Option<&Overlay>,
    state: &mut EntityState,
) {
    let empty = BTreeSet::new();
    let old = old_overlay.map_or(&empty, |overlay| &overlay.facet_names);
    let new = new_overlay.map_or(&empty, |overlay| &overlay.facet_names);
    for removed in old.difference(new) {
        state.facet_names.remove(removed);
    }
    for added in new.difference(old) {
        state.facet_names.insert(added.clone());
    }
}

fn is_overlayable(name: &str) -> bool {
    !state::is_write_protected(name) && name != FACET_NAMES && name != OVERLAY_NAME
}

/// Apply the new overlay's property values, preserving customised values
///
/// A property is rewritten only while it still holds what the old overlay
/// (or, failing that, its own default) supplied. Properties the old overlay
/// supplied and the new one does not revert to their default.
pub fn apply_overlay<S: SimulantState>(
    old_overlay: Option<&Overlay>,
    new_overlay: Option<&Overlay>,
    state: &mut S,
) {
    let old_properties = old_overlay.map(|overlay| &overlay.properties);
    let new_properties = new_overlay.map(|overlay| &overlay.properties);

    let mut names: BTreeSet<&String> = BTreeSet::new();
    names.extend(old_properties.into_iter().flat_map(BTreeMap::keys));
    names.extend(new_properties.into_iter().flat_map(BTreeMap::keys));

    for name in names.into_iter().filter(|name| is_overlayable(name)) {
        let Ok(current) = state.get_property(name) else {
            continue;
        };
        let old_value = old_properties
            .and_then(|properties| properties.get(name))
            .cloned()
            .or_else(|| state.default_value(name));
        if old_value.as_ref() != Some(&current) {
            continue;
        }
        let new_value = new_properties
            .and_then(|properties| properties.get(name))
            .cloned()
            .or_else(|| state.default_value(name));
        if let Some(new_value) = new_value {
            if new_value != current {
                if let Err(error) = state.set_property(name, new_value) {
                    warn!("Overlay could not set '{}' on '{}': {}", name, state.common().name, error);
                }
            }
        }
    }
}
