//! Capability composition
//!
//! Every simulant has exactly one [`Dispatcher`], fixed at creation. Entities
//! may additionally stack any number of [`Facet`]s. Both are resolved by name
//! through a [`Registry`] and contribute property definitions and lifecycle
//! hooks.

mod dispatcher;
mod registry;
pub mod facets;

pub use dispatcher::{BaseDispatcher, Dispatcher, Facet};
pub use facets::CompositionError;
pub use registry::Registry;
