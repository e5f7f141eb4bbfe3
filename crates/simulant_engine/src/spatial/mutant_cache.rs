//! Mutation cache for structurally shared indexes
//!
//! A [`MutantCache`] is a handle onto a shared cell holding one mutable
//! value. Each handle remembers the generation it was produced at; the cell
//! remembers which generation its contents belong to. When they agree the
//! handle may read and mutate the cell in place. When they differ, some other
//! snapshot has mutated the cell since this handle was produced, so the
//! contents are rebuilt from the caller's source of truth before use.
//!
//! Mutation always yields a fresh handle and leaves the old one stale, so a
//! historical snapshot holding the old handle can never observe the new
//! contents. Only sound under single-threaded use.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::foundation::time;

struct CacheCell<T> {
    generation: u64,
    value: T,
    rebuilds: u64,
}

/// Handle onto a shared, generation-stamped value
pub struct MutantCache<T> {
    cell: Rc<RefCell<CacheCell<T>>>,
    generation: u64,
}

impl<T> MutantCache<T> {
    /// Wrap a freshly built value
    pub fn new(value: T) -> Self {
        let generation = time::make_id();
        Self {
            cell: Rc::new(RefCell::new(CacheCell { generation, value, rebuilds: 0 })),
            generation,
        }
    }

    /// Whether the cell currently holds this handle's contents
    pub fn is_current(&self) -> bool {
        self.cell.borrow().generation == self.generation
    }

    /// Number of full rebuilds performed on the shared cell
    pub fn rebuild_count(&self) -> u64 {
        self.cell.borrow().rebuilds
    }

    /// Generation this handle was produced at
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn refresh(&self, rebuild: impl FnOnce() -> T) {
        if self.is_current() {
            return;
        }
        let value = rebuild();
        let mut cell = self.cell.borrow_mut();
        cell.value = value;
        cell.generation = self.generation;
        cell.rebuilds += 1;
        debug!("Mutation cache rebuilt for generation {} ({} rebuilds)", self.generation, cell.rebuilds);
    }

    /// Read the value, rebuilding first when this handle is stale
    pub fn read<R>(&self, rebuild: impl FnOnce() -> T, f: impl FnOnce(&T) -> R) -> R {
        self.refresh(rebuild);
        f(&self.cell.borrow().value)
    }

    /// Apply a mutation and return the handle for the mutated value
    ///
    /// When this handle is current the mutation is applied in place;
    /// otherwise the value is rebuilt first and the mutation applied to
    /// the rebuilt value.
    #[must_use]
    pub fn mutate(&self, rebuild: impl FnOnce() -> T, f: impl FnOnce(&mut T)) -> Self {
        self.refresh(rebuild);
        let generation = time::make_id();
        {
            let mut cell = self.cell.borrow_mut();
            f(&mut cell.value);
            cell.generation = generation;
        }
        Self { cell: Rc::clone(&self.cell), generation }
    }
}

impl<T> Clone for MutantCache<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Rc::clone(&self.cell),
            generation: self.generation,
        }
    }
}

impl<T> fmt::Debug for MutantCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutantCache")
            .field("generation", &self.generation)
            .field("current", &self.is_current())
            .finish()
    }
}
