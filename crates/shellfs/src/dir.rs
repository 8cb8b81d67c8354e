use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::node::NodeID;

/// The named children of one directory.
///
/// Names are unique under exact (case-sensitive) comparison. Iteration
/// order is lexicographic ignoring case; a name that ties with existing
/// names is placed before them.
#[derive(Debug, Clone, Default)]
pub struct Entries {
    entries: Vec<(String, NodeID)>,
}

/// Lexicographic comparison ignoring case.
#[must_use]
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

impl Entries {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<NodeID> {
        self.position(name).map(|i| self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn insert(&mut self, name: String, id: NodeID) -> Result<()> {
        if self.contains(&name) {
            return Err(Error::already_exists(name));
        }
        let at = self
            .entries
            .partition_point(|(n, _)| cmp_ignore_case(&name, n) == Ordering::Greater);
        self.entries.insert(at, (name, id));
        Ok(())
    }

    /// Removes and returns the child called `name`; absent names are a no-op.
    pub fn remove(&mut self, name: &str) -> Option<NodeID> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    /// Appends an entry that is known to sort after every existing one.
    /// Used when duplicating a directory whose order is already settled.
    pub(crate) fn push_in_order(&mut self, name: String, id: NodeID) {
        debug_assert!(
            self.entries
                .last()
                .is_none_or(|(last, _)| cmp_ignore_case(last, &name) != Ordering::Greater)
        );
        debug_assert!(!self.contains(&name));
        self.entries.push((name, id));
    }

    /// Children in iteration order. Each call starts a fresh pass.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeID)> + '_ {
        self.entries.iter().map(|(n, id)| (n.as_str(), *id))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Child handles copied out, for walks that mutate the tree.
    #[must_use]
    pub fn ids(&self) -> Vec<NodeID> {
        self.entries.iter().map(|(_, id)| *id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
