//! Deferred world actions

use std::collections::BTreeMap;

use super::{World, WorldError};
use crate::foundation::time::TickTime;

/// An action run against the world at a scheduled tick
pub type Tasklet = Box<dyn FnOnce(&mut World) -> Result<(), WorldError>>;

/// Tasklets ordered by scheduled tick, ties broken by insertion order
#[derive(Default)]
pub struct TaskletQueue {
    queue: BTreeMap<(TickTime, u64), Tasklet>,
    next_sequence: u64,
}

impl TaskletQueue {
    /// Empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a tasklet
    pub fn schedule(&mut self, time: TickTime, tasklet: Tasklet) {
        self.queue.insert((time, self.next_sequence), tasklet);
        self.next_sequence += 1;
    }

    /// Remove and return every tasklet due at or before `now`, in order
    pub fn take_due(&mut self, now: TickTime) -> Vec<Tasklet> {
        let later = self.queue.split_off(&(now.next(), 0));
        std::mem::replace(&mut self.queue, later).into_values().collect()
    }

    /// Number of pending tasklets
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::world;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn logging(log: &Rc<RefCell<Vec<&'static str>>>, label: &'static str) -> Tasklet {
        let log = Rc::clone(log);
        Box::new(move |_: &mut World| {
            log.borrow_mut().push(label);
            Ok(())
        })
    }

    #[test]
    fn test_due_tasklets_run_by_tick_then_insertion() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = TaskletQueue::new();
        queue.schedule(TickTime(3), logging(&log, "late"));
        queue.schedule(TickTime(1), logging(&log, "first at 1"));
        queue.schedule(TickTime(2), logging(&log, "at 2"));
        queue.schedule(TickTime(1), logging(&log, "second at 1"));
        queue.schedule(TickTime(0), logging(&log, "overdue"));

        let mut world = world();
        for tasklet in queue.take_due(TickTime(2)) {
            tasklet(&mut world).unwrap();
        }
        assert_eq!(*log.borrow(), ["overdue", "first at 1", "second at 1", "at 2"]);
        assert_eq!(queue.len(), 1);
        assert!(queue.take_due(TickTime(2)).is_empty());
        assert_eq!(queue.take_due(TickTime(3)).len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_tasklet_scheduled_while_draining_waits_a_tick() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = world();
        let inner = Rc::clone(&log);
        world.schedule(
            world.tick_time(),
            Box::new(move |world: &mut World| {
                inner.borrow_mut().push("outer");
                world.schedule(world.tick_time(), logging(&inner, "inner"));
                Ok(())
            }),
        );

        world.tick();
        assert_eq!(*log.borrow(), ["outer"]);
        assert_eq!(world.pending_tasklets(), 1);
        world.tick();
        assert_eq!(*log.borrow(), ["outer", "inner"]);
        assert_eq!(world.pending_tasklets(), 0);
    }
}
