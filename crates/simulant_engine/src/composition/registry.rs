//! Name-keyed registry of dispatchers and facets

use std::collections::HashMap;
use std::rc::Rc;

use log::warn;

use super::{BaseDispatcher, Dispatcher, Facet};
use crate::simulant::SimulantKind;

/// Closed set of capability providers, resolved by name at composition time
pub struct Registry {
    dispatchers: HashMap<String, Rc<dyn Dispatcher>>,
    facets: HashMap<String, Rc<dyn Facet>>,
    bases: [Rc<dyn Dispatcher>; 4],
}

impl Registry {
    /// Registry holding only the four base dispatchers
    pub fn new() -> Self {
        let bases: [Rc<dyn Dispatcher>; 4] = [
            Rc::new(BaseDispatcher::new(SimulantKind::Game)),
            Rc::new(BaseDispatcher::new(SimulantKind::Screen)),
            Rc::new(BaseDispatcher::new(SimulantKind::Group)),
            Rc::new(BaseDispatcher::new(SimulantKind::Entity)),
        ];
        let dispatchers = bases
            .iter()
            .map(|dispatcher| (dispatcher.name().to_string(), Rc::clone(dispatcher)))
            .collect();
        Self {
            dispatchers,
            facets: HashMap::new(),
            bases,
        }
    }

    /// Add a dispatcher, replacing any of the same name
    pub fn register_dispatcher(&mut self, dispatcher: Rc<dyn Dispatcher>) {
        self.dispatchers.insert(dispatcher.name().to_string(), dispatcher);
    }

    /// Add a facet, replacing any of the same name
    pub fn register_facet(&mut self, facet: Rc<dyn Facet>) {
        self.facets.insert(facet.name().to_string(), facet);
    }

    /// Builder form of [`Registry::register_dispatcher`]
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: impl Dispatcher + 'static) -> Self {
        self.register_dispatcher(Rc::new(dispatcher));
        self
    }

    /// Builder form of [`Registry::register_facet`]
    #[must_use]
    pub fn with_facet(mut self, facet: impl Facet + 'static) -> Self {
        self.register_facet(Rc::new(facet));
        self
    }

    /// Look up a dispatcher by name
    pub fn dispatcher(&self, name: &str) -> Option<Rc<dyn Dispatcher>> {
        self.dispatchers.get(name).cloned()
    }

    /// Look up a facet by name
    pub fn facet(&self, name: &str) -> Option<Rc<dyn Facet>> {
        self.facets.get(name).cloned()
    }

    /// Fallback dispatcher for a kind
    pub fn base_dispatcher(&self, kind: SimulantKind) -> Rc<dyn Dispatcher> {
        let index = match kind {
            SimulantKind::Game => 0,
            SimulantKind::Screen => 1,
            SimulantKind::Group => 2,
            SimulantKind::Entity => 3,
        };
        Rc::clone(&self.bases[index])
    }

    /// Resolve a dispatcher for a kind, falling back to the base dispatcher
    ///
    /// Unknown names and dispatchers of the wrong kind are logged and
    /// replaced so that stale content never prevents loading.
    pub fn resolve_dispatcher(&self, name: &str, kind: SimulantKind) -> Rc<dyn Dispatcher> {
        match self.dispatcher(name) {
            Some(dispatcher) if dispatcher.kind() == kind => dispatcher,
            Some(dispatcher) => {
                warn!(
                    "Dispatcher '{}' serves {:?}, not {:?}; using {}",
                    name,
                    dispatcher.kind(),
                    kind,
                    BaseDispatcher::name_for(kind)
                );
                self.base_dispatcher(kind)
            }
            None => {
                warn!("Unknown dispatcher '{}'; using {}", name, BaseDispatcher::name_for(kind));
                self.base_dispatcher(kind)
            }
        }
    }

    /// Names of every registered facet
    pub fn facet_names(&self) -> impl Iterator<Item = &str> {
        self.facets.keys().map(String::as_str)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
