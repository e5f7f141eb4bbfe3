//! Facet composition algorithms over entity state
//!
//! These functions are pure: they never run lifecycle hooks, so the world can
//! validate a whole change on a scratch copy before committing it. Properties
//! are reference counted by name across the dispatcher and every attached
//! facet; a property is detached only once nothing declares it any more.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use super::{Facet, Registry};
use crate::simulant::{EntityState, SimulantState};

/// Facet composition failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    /// No facet of that name is registered
    #[error("Unknown facet '{0}'")]
    UnknownFacet(String),

    /// The facet collides with an attached property or is refused by the dispatcher
    #[error("Facet '{facet}' is incompatible with entity '{entity}'")]
    IncompatibleFacet {
        /// Facet name
        facet: String,
        /// Entity name
        entity: String,
    },

    /// The facet is not attached
    #[error("Facet '{0}' is not attached")]
    MissingFacet(String),
}

/// How many capabilities declare each property name
pub fn property_counts(state: &EntityState) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for definition in state.capability_definitions() {
        *counts.entry(definition.name).or_insert(0) += 1;
    }
    counts
}

/// Whether a facet may be attached to the entity
///
/// Every declared property must either be absent or already have the same
/// type, and the dispatcher must allow the facet.
pub fn is_facet_compatible(facet: &dyn Facet, state: &EntityState) -> bool {
    let no_collision = facet.property_definitions().iter().all(|definition| {
        state
            .property_type(&definition.name)
            .map_or(true, |existing| existing == definition.ty())
    });
    no_collision && state.common.dispatcher.is_facet_compatible(facet.name())
}

/// Names to remove and names to add to go from `old` to `new`
pub fn diff_facet_names(
    old: &BTreeSet<String>,
    new: &BTreeSet<String>,
) -> (BTreeSet<String>, BTreeSet<String>) {
    let to_remove = old.difference(new).cloned().collect();
    let to_add = new.difference(old).cloned().collect();
    (to_remove, to_add)
}

/// Attach a facet and merge in its properties
pub fn attach_facet(facet: Rc<dyn Facet>, state: &mut EntityState) -> Result<(), CompositionError> {
    if !is_facet_compatible(facet.as_ref(), state) {
        return Err(CompositionError::IncompatibleFacet {
            facet: facet.name().to_string(),
            entity: state.common.name.clone(),
        });
    }
    for definition in facet.property_definitions() {
        state.attach_declared(definition);
    }
    state.facet_names.insert(facet.name().to_string());
    state.facets.push(facet);
    Ok(())
}

/// Detach a facet, removing properties nothing else declares
pub fn detach_facet(name: &str, state: &mut EntityState) -> Result<Rc<dyn Facet>, CompositionError> {
    let index = state
        .facets
        .iter()
        .position(|facet| facet.name() == name)
        .ok_or_else(|| CompositionError::MissingFacet(name.to_string()))?;
    let facet = state.facets.remove(index);
    state.facet_names.remove(name);

    let remaining = property_counts(state);
    for definition in facet.property_definitions() {
        if !remaining.contains_key(&definition.name) && !EntityState::is_fixed(&definition.name) {
            state.common.xtension.detach(&definition.name);
        }
    }
    Ok(facet)
}

fn apply_diff(
    registry: &Registry,
    to_remove: &BTreeSet<String>,
    to_add: &BTreeSet<String>,
    state: &mut EntityState,
) -> Result<(), CompositionError> {
    for name in to_remove {
        detach_facet(name, state)?;
    }
    for name in to_add {
        let facet = registry
            .facet(name)
            .ok_or_else(|| CompositionError::UnknownFacet(name.clone()))?;
        attach_facet(facet, state)?;
    }
    Ok(())
}

/// Replace the entity's facets with exactly `names`
///
/// Removals run before additions. The change is all-or-nothing: on failure
/// the input state is untouched and no partially composed state escapes.
pub fn set_facet_names(
    registry: &Registry,
    names: &BTreeSet<String>,
    state: &EntityState,
) -> Result<EntityState, CompositionError> {
    let (to_remove, to_add) = diff_facet_names(&state.facet_names, names);
    let mut next = state.clone();
    apply_diff(registry, &to_remove, &to_add, &mut next)?;
    Ok(next)
}

/// Bring the materialised facets in line with the declared names
///
/// `old_names` is the set the facet list currently reflects; the state's
/// declared names are the target. Used after an overlay rewrites the names.
pub fn synchronize_facets_to_names(
    registry: &Registry,
    old_names: &BTreeSet<String>,
    state: &EntityState,
) -> Result<EntityState, CompositionError> {
    let (to_remove, to_add) = diff_facet_names(old_names, &state.facet_names);
    let mut next = state.clone();
    next.facet_names = next.facets.iter().map(|facet| facet.name().to_string()).collect();
    apply_diff(registry, &to_remove, &to_add, &mut next)?;
    Ok(next)
}
