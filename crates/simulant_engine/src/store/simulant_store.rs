//! Flat address-to-state map for one simulant kind

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::StoreError;
use crate::foundation::time;
use crate::simulant::Address;

/// Copy-on-write map from address to shared state
///
/// Every change stamps a fresh revision. A single-slot cache remembers the
/// last lookup; it hits only when the requested address shares the cached
/// address's allocation and the revision is unchanged, so repeated reads
/// through the same handle within one revision skip hashing.
pub struct SimulantStore<S> {
    states: Rc<HashMap<Address, Rc<S>>>,
    revision: u64,
    last_lookup: RefCell<Option<(Address, u64, Rc<S>)>>,
}

impl<S: Clone> SimulantStore<S> {
    /// Empty store
    pub fn new() -> Self {
        Self {
            states: Rc::new(HashMap::new()),
            revision: time::make_id(),
            last_lookup: RefCell::new(None),
        }
    }

    /// Identity of the current contents
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Fetch the state at `address`
    pub fn get(&self, address: &Address) -> Result<Rc<S>, StoreError> {
        self.try_get(address).ok_or_else(|| StoreError::NotFound(address.clone()))
    }

    /// Fetch the state at `address`, if any
    pub fn try_get(&self, address: &Address) -> Option<Rc<S>> {
        if let Some((cached, revision, state)) = self.last_lookup.borrow().as_ref() {
            if *revision == self.revision && Address::ptr_eq(cached, address) {
                return Some(Rc::clone(state));
            }
        }
        let state = self.states.get(address).cloned()?;
        *self.last_lookup.borrow_mut() = Some((address.clone(), self.revision, Rc::clone(&state)));
        Some(state)
    }

    /// Whether a state exists at `address`
    pub fn contains(&self, address: &Address) -> bool {
        self.states.contains_key(address)
    }

    /// Insert a state; fails when one exists and `may_replace` is false
    pub fn add(&mut self, address: Address, state: Rc<S>, may_replace: bool) -> Result<(), StoreError> {
        if !may_replace && self.states.contains_key(&address) {
            return Err(StoreError::AlreadyExists(address));
        }
        Rc::make_mut(&mut self.states).insert(address, state);
        self.touch();
        Ok(())
    }

    /// Replace the state at an existing address
    pub fn set(&mut self, address: &Address, state: Rc<S>) {
        debug_assert!(self.states.contains_key(address), "set on absent simulant '{address}'");
        Rc::make_mut(&mut self.states).insert(address.clone(), state);
        self.touch();
    }

    /// Remove the state at `address`; absent addresses are ignored
    pub fn remove(&mut self, address: &Address) -> Option<Rc<S>> {
        if !self.states.contains_key(address) {
            return None;
        }
        let removed = Rc::make_mut(&mut self.states).remove(address);
        self.touch();
        removed
    }

    /// Number of stored states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate addresses and states in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Rc<S>)> {
        self.states.iter()
    }

    fn touch(&mut self) {
        self.revision = time::make_id();
        *self.last_lookup.get_mut() = None;
    }
}

impl<S: Clone> Default for SimulantStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for SimulantStore<S> {
    fn clone(&self) -> Self {
        Self {
            states: Rc::clone(&self.states),
            revision: self.revision,
            last_lookup: RefCell::new(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_refuses_duplicates() {
        let mut store = SimulantStore::new();
        let address = Address::parse("A");
        store.add(address.clone(), Rc::new(1_u32), false).unwrap();
        assert_eq!(store.add(address.clone(), Rc::new(2), false), Err(StoreError::AlreadyExists(address.clone())));
        store.add(address.clone(), Rc::new(3), true).unwrap();
        assert_eq!(*store.get(&address).unwrap(), 3);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store: SimulantStore<u32> = SimulantStore::new();
        let revision = store.revision();
        assert!(store.remove(&Address::parse("Nope")).is_none());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_lookup_cache_invalidated_by_change() {
        let mut store = SimulantStore::new();
        let address = Address::parse("A");
        store.add(address.clone(), Rc::new(1_u32), false).unwrap();
        assert_eq!(*store.get(&address).unwrap(), 1);
        // same allocation, same revision: served from the cache
        assert_eq!(*store.get(&address).unwrap(), 1);

        store.set(&address, Rc::new(2));
        assert_eq!(*store.get(&address).unwrap(), 2);
        assert_eq!(store.get(&Address::parse("B")), Err(StoreError::NotFound(Address::parse("B"))));
    }

    #[test]
    fn test_clone_shares_until_written() {
        let mut store = SimulantStore::new();
        store.add(Address::parse("A"), Rc::new(1_u32), false).unwrap();
        let snapshot = store.clone();
        store.add(Address::parse("B"), Rc::new(2), false).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
        assert!(Rc::ptr_eq(&snapshot.get(&Address::parse("A")).unwrap(), &store.get(&Address::parse("A")).unwrap()));
    }
}
