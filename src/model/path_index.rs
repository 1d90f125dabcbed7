//! Path index module for hierarchy construction.
//!
//! - `PathKey`: Fully qualified prefix of a row's path (segments joined).
//! - `PathIndex`: Construction-time lookup from prefix to node.

use crate::model::hierarchy::NodeIndex;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

// =#========================================================================#=
// PATH KEY
// =#========================================================================#=
/// Joined sequence of path segments, e.g. `"flare.analytics.cluster"`.
///
/// Keys are immutable once created; lookups work with plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey(Box<str>);

impl PathKey {
    /// Creates a key from an already joined prefix.
    pub fn new(joined: &str) -> Self {
        PathKey(joined.into())
    }

    /// Returns the key as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PathKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =#========================================================================#=
// PATH INDEX
// =#========================================================================#=
/// Maps path prefixes to the node created for them.
///
/// This is an interning structure: two rows sharing a prefix look up the same
/// key and thus reuse the same node instead of creating a duplicate.
/// Entries are first-seen-wins; re-registering an existing key keeps the
/// node registered first.
///
/// # Example
/// ```
/// use rowtree::model::PathIndex;
///
/// let mut index = PathIndex::with_capacity(4);
///
/// let a = index.get_or_insert_with("a", || 1);    // a = 1 (new)
/// let ab = index.get_or_insert_with("a.b", || 2); // ab = 2 (new)
/// let a2 = index.get_or_insert_with("a", || 99);  // a2 = 1 (reused)
///
/// assert_eq!(a, a2);
/// assert_eq!(index.get("a.b"), Some(ab));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    map: HashMap<PathKey, NodeIndex>,
}

impl PathIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index with room for `capacity` prefixes.
    pub fn with_capacity(capacity: usize) -> Self {
        PathIndex {
            map: HashMap::with_capacity(capacity),
        }
    }

    /// Registers `key` for `node` unless the key is already known.
    ///
    /// # Returns
    /// `true` if the key was new
    pub fn insert(&mut self, key: &str, node: NodeIndex) -> bool {
        if self.map.contains_key(key) {
            return false;
        }
        self.map.insert(PathKey::new(key), node);
        true
    }

    /// Returns the node registered for `key`, creating and registering one
    /// with `create` if the key is new.
    pub fn get_or_insert_with(&mut self, key: &str, create: impl FnOnce() -> NodeIndex) -> NodeIndex {
        if let Some(&node) = self.map.get(key) {
            node
        } else {
            let node = create();
            self.map.insert(PathKey::new(key), node);
            node
        }
    }

    /// Retrieves the node registered for `key`.
    pub fn get(&self, key: &str) -> Option<NodeIndex> {
        self.map.get(key).copied()
    }

    /// Checks if `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Unregisters `key`, returning the node it pointed to.
    pub fn remove(&mut self, key: &str) -> Option<NodeIndex> {
        self.map.remove(key)
    }

    /// Returns the number of registered prefixes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no prefix is registered.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Display for PathIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.map.iter().collect();
        entries.sort();
        writeln!(f, "PathIndex ({} prefixes):", entries.len())?;
        for (key, node) in entries {
            writeln!(f, "  {key} -> [{node}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_only_touches_given_key() {
        let mut index = PathIndex::new();
        index.insert("a", 1);
        index.insert("a.b", 2);
        index.insert("ab", 3);

        assert_eq!(index.remove("a.b"), Some(2));
        assert_eq!(index.remove("a.b"), None);
        assert!(index.contains("a"));
        assert!(index.contains("ab"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_insert_is_first_seen_wins() {
        let mut index = PathIndex::new();
        assert!(index.insert("x", 1));
        assert!(!index.insert("x", 2));
        assert_eq!(index.get("x"), Some(1));
    }
}
