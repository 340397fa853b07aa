#![forbid(unsafe_code)]

//! Listener registries with snapshot-before-notify iteration.
//!
//! [`Listeners<L>`] owns strong `Rc` handles to observers. Notification code
//! takes a [`snapshot`](Listeners::snapshot) first and iterates the copy, so
//! a listener that adds or removes entries (through shared state of its own)
//! never invalidates the iteration in progress.
//!
//! # Invariants
//!
//! 1. [`ListenerId`]s are never reused within one registry.
//! 2. `snapshot()` returns registration order; `snapshot_rev()` the reverse.
//! 3. Registering the same `Rc` twice yields two independent entries.

use std::rc::Rc;

/// Handle returned by [`Listeners::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Ordered registry of shared listeners.
pub struct Listeners<L: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Rc<L>)>,
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> std::fmt::Debug for Listeners<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<L: ?Sized> Listeners<L> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Register a listener.
    pub fn add(&mut self, listener: Rc<L>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Unregister by handle. Returns `true` if it was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        before != self.entries.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copy of the current listeners in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<L>> {
        self.entries.iter().map(|(_, l)| Rc::clone(l)).collect()
    }

    /// Copy of the current listeners, most recently registered first.
    #[must_use]
    pub fn snapshot_rev(&self) -> Vec<Rc<L>> {
        self.entries.iter().rev().map(|(_, l)| Rc::clone(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    trait Sink {
        fn push(&self, v: u32);
    }

    struct Log(RefCell<Vec<u32>>, u32);

    impl Sink for Log {
        fn push(&self, v: u32) {
            self.0.borrow_mut().push(v + self.1);
        }
    }

    #[test]
    fn add_and_remove() {
        let mut reg: Listeners<dyn Sink> = Listeners::new();
        let a = reg.add(Rc::new(Log(RefCell::new(Vec::new()), 0)));
        let b = reg.add(Rc::new(Log(RefCell::new(Vec::new()), 0)));
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
        assert!(reg.remove(a));
        assert!(!reg.remove(a));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn snapshot_survives_registry_mutation() {
        let log = Rc::new(Log(RefCell::new(Vec::new()), 0));
        let mut reg: Listeners<dyn Sink> = Listeners::new();
        let id = reg.add(log.clone());
        let snap = reg.snapshot();
        reg.remove(id);
        for l in &snap {
            l.push(1);
        }
        assert_eq!(*log.0.borrow(), vec![1]);
    }

    #[test]
    fn reverse_snapshot_is_last_registered_first() {
        let shared = Rc::new(RefCell::new(Vec::new()));
        struct Tag(Rc<RefCell<Vec<u32>>>, u32);
        impl Sink for Tag {
            fn push(&self, _: u32) {
                self.0.borrow_mut().push(self.1);
            }
        }
        let mut reg: Listeners<dyn Sink> = Listeners::new();
        reg.add(Rc::new(Tag(shared.clone(), 1)));
        reg.add(Rc::new(Tag(shared.clone(), 2)));
        for l in reg.snapshot_rev() {
            l.push(0);
        }
        assert_eq!(*shared.borrow(), vec![2, 1]);
    }
}
