#![forbid(unsafe_code)]

//! Sparse side table for windows detached from the live stack.
//!
//! Keys are the stack positions windows were detached from. A collision
//! moves upward to the first free key, so concurrently detached windows
//! keep the relative order they had in the stack.
//!
//! # Invariants
//!
//! 1. Each key holds at most one entry.
//! 2. An occupied key is never reused until its entry is taken out.
//! 3. Iteration is in ascending key order.

use std::collections::BTreeMap;

/// Positional side table keyed by original stack index.
#[derive(Debug)]
pub struct ForgottenTable<T> {
    entries: BTreeMap<usize, T>,
}

impl<T> Default for ForgottenTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ForgottenTable<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store `value` at the first free key `>= index`. Returns the key used.
    pub fn insert(&mut self, index: usize, value: T) -> usize {
        let mut key = index;
        while self.entries.contains_key(&key) {
            key += 1;
        }
        self.entries.insert(key, value);
        key
    }

    /// Key of the first entry matching `pred`.
    pub fn key_of(&self, mut pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.entries
            .iter()
            .find(|(_, v)| pred(v))
            .map(|(k, _)| *k)
    }

    pub fn get(&self, key: usize) -> Option<&T> {
        self.entries.get(&key)
    }

    pub fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.entries.get_mut(&key)
    }

    /// Take the entry at `key` out of the table.
    pub fn remove(&mut self, key: usize) -> Option<T> {
        self.entries.remove(&key)
    }

    /// Take the first entry matching `pred`, with its key.
    pub fn take(&mut self, pred: impl FnMut(&T) -> bool) -> Option<(usize, T)> {
        let key = self.key_of(pred)?;
        self.entries.remove(&key).map(|v| (key, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.values_mut()
    }

    /// Remove and return every entry, in key order.
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.entries).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_moves_upward() {
        let mut t = ForgottenTable::new();
        assert_eq!(t.insert(1, 'a'), 1);
        assert_eq!(t.insert(1, 'b'), 2);
        assert_eq!(t.insert(1, 'c'), 3);
        assert_eq!(t.insert(0, 'd'), 0);
        let order: Vec<char> = t.values().copied().collect();
        assert_eq!(order, vec!['d', 'a', 'b', 'c']);
    }

    #[test]
    fn freed_key_is_reused() {
        let mut t = ForgottenTable::new();
        t.insert(2, 'a');
        t.remove(2);
        assert_eq!(t.insert(2, 'b'), 2);
    }

    #[test]
    fn take_returns_key() {
        let mut t = ForgottenTable::new();
        t.insert(4, "pip");
        assert_eq!(t.take(|v| *v == "pip"), Some((4, "pip")));
        assert!(t.is_empty());
        assert!(t.take(|v| *v == "pip").is_none());
    }

    #[test]
    fn drain_is_key_ordered() {
        let mut t = ForgottenTable::new();
        t.insert(5, 5);
        t.insert(0, 0);
        t.insert(3, 3);
        assert_eq!(t.drain(), vec![0, 3, 5]);
        assert!(t.is_empty());
    }
}
