//! Auxiliary attribute maps keyed by graph element ids.
//!
//! Algorithms attach data to nodes and edges through [NodeMap] and
//! [EdgeMap] instead of widening the element types themselves, so that
//! algorithm-local and phylogeny-global attributes can coexist on the same
//! graph.

use crate::graph::{EdgeId, NodeId};
use std::collections::HashMap;
use std::hash::Hash;

/// Attribute map over node ids.
pub type NodeMap<V> = ElementMap<NodeId, V>;

/// Attribute map over edge ids.
pub type EdgeMap<V> = ElementMap<EdgeId, V>;

// =#========================================================================#=
// ELEMENT MAP
// =#========================================================================#=
/// A map from graph element ids to attribute values.
///
/// Because ids are never reused, an entry for a deleted element can never
/// alias a later element; it is simply dead weight. Owners that delete
/// elements remove the corresponding entries, and readers that may hold
/// stale ids check liveness against the graph before dereferencing
/// (see [`Graph::contains_node`](crate::graph::Graph::contains_node)).
#[derive(Debug, Clone)]
pub struct ElementMap<K, V> {
    map: HashMap<K, V>,
}

impl<K: Copy + Eq + Hash, V> ElementMap<K, V> {
    /// Creates a new empty map.
    pub fn new() -> Self {
        ElementMap {
            map: HashMap::new(),
        }
    }

    /// Returns a reference to the value for `key`, or `None`.
    pub fn get(&self, key: K) -> Option<&V> {
        self.map.get(&key)
    }

    /// Returns a mutable reference to the value for `key`, or `None`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.map.get_mut(&key)
    }

    /// Inserts a value, returning the previous one if present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.map.insert(key, value)
    }

    /// Removes the value for `key`, returning it if present.
    pub fn remove(&mut self, key: K) -> Option<V> {
        self.map.remove(&key)
    }

    /// Returns whether `key` has a value.
    pub fn contains(&self, key: K) -> bool {
        self.map.contains_key(&key)
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over `(key, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.map.iter().map(|(&k, v)| (k, v))
    }

    /// Iterates over the keys in unspecified order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.map.keys().copied()
    }
}

impl<K: Copy + Eq + Hash, V> Default for ElementMap<K, V> {
    fn default() -> Self {
        ElementMap::new()
    }
}

impl<K: Copy + Eq + Hash, V: Copy> ElementMap<K, V> {
    /// Returns the value for `key`, or `fallback` if absent.
    ///
    /// Attribute maps with a crate-wide default (edge weights, split ids)
    /// go through this accessor.
    pub fn get_or(&self, key: K, fallback: V) -> V {
        self.map.get(&key).copied().unwrap_or(fallback)
    }
}
