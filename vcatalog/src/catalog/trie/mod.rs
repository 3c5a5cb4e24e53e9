// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Versioned trie
//!
//! A trie keyed by sequences of elements where every key slot holds an
//! append-only, reference-counted version history instead of a single value.
//!
//! - `insert` never overwrites: it appends a new version with a fresh id
//! - `erase` pops the most recent version (undo-stack semantics)
//! - handles returned by `find` and iteration pin the version they observed,
//!   so a long-lived reader keeps a consistent value while writers proceed
//!
//! Nodes live in an arena and keep a parent link plus their index within the
//! parent, which makes key reconstruction and pruning walk straight up the
//! tree without searching.

mod iter;
mod node;
mod version;

pub use iter::{Iter, Keys, TrieEntry};
pub use node::NodeId;
pub use version::{VersionId, VersionRef, VersionedEntry, VersionedValue};

use std::cmp::Ordering;

use node::{Node, NodeArena};

/// Comparator for key elements
pub trait ElementOrder<K> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders elements by their `Ord` implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<K: Ord> ElementOrder<K> for NaturalOrder {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Orders elements with a user supplied closure
#[derive(Debug, Clone, Copy)]
pub struct FnOrder<F>(pub F);

impl<K, F> ElementOrder<K> for FnOrder<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

/// Result of a prefix lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    node: NodeId,
    /// Number of key elements leading to the matched node
    pub size: usize,
    /// The matched node holds at least one version
    pub matched: bool,
    /// The matched node has no children
    pub leaf: bool,
}

impl MatchResult {
    pub fn node(&self) -> NodeId {
        self.node
    }
}

/// Multi-version trie over key sequences of `K`
#[derive(Debug)]
pub struct VersionedTrie<K, V, C = NaturalOrder> {
    arena: NodeArena<K, V>,
    root: NodeId,
    /// Number of stored versions across all nodes
    size: usize,
    next_version: VersionId,
    order: C,
}

impl<K: Clone, V: Clone, C: Clone> Clone for VersionedTrie<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            root: self.root,
            size: self.size,
            next_version: self.next_version,
            order: self.order.clone(),
        }
    }
}

impl<K, V, C: Default> Default for VersionedTrie<K, V, C> {
    fn default() -> Self {
        Self::with_order(C::default())
    }
}

impl<K, V> VersionedTrie<K, V, NaturalOrder> {
    pub fn new() -> Self {
        Self::with_order(NaturalOrder)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_order(capacity, NaturalOrder)
    }
}

impl<K, V, C> VersionedTrie<K, V, C> {
    pub fn with_order(order: C) -> Self {
        Self::with_capacity_and_order(0, order)
    }

    pub fn with_capacity_and_order(capacity: usize, order: C) -> Self {
        let mut arena = NodeArena::with_capacity(capacity.max(1));
        let root = arena.alloc(Node::new(None, 0));
        Self {
            arena,
            root,
            size: 0,
            next_version: 1,
            order,
        }
    }

    /// Number of stored versions
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of live nodes, including the root and path-only nodes
    pub fn node_count(&self) -> usize {
        self.arena.live()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.alloc(Node::new(None, 0));
        self.size = 0;
    }

    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter::new(self)
    }

    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys::new(self)
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.arena.get(id)
    }

    /// Explicit cleanup pass: purge every unreferenced, superseded version
    pub fn cleanup(&mut self) -> usize {
        let purged: usize = self
            .arena
            .nodes_mut()
            .map(|node| node.value.purge_unreferenced())
            .sum();
        self.size -= purged;
        purged
    }
}

impl<K: Clone, V, C> VersionedTrie<K, V, C> {
    /// Rebuild the key of a node from parent links and cached child indices
    pub(crate) fn key_of(&self, id: NodeId) -> Vec<K> {
        let mut key = Vec::new();
        let mut current = id;
        while let Some(node) = self.arena.get(current) {
            let Some(parent_id) = node.parent else { break };
            let Some(parent) = self.arena.get(parent_id) else { break };
            key.push(parent.keys[node.index_within_parent].clone());
            current = parent_id;
        }
        key.reverse();
        key
    }

    /// Key elements that extend the matched node by exactly one element
    pub fn copy_next_key_elements(&self, prev: &MatchResult) -> Vec<K> {
        self.arena
            .get(prev.node)
            .map(|node| node.keys.clone())
            .unwrap_or_default()
    }
}

impl<K: Clone, V, C: ElementOrder<K>> VersionedTrie<K, V, C> {
    fn child_position(&self, node: &Node<K, V>, element: &K) -> Result<usize, usize> {
        node.keys
            .binary_search_by(|probe| self.order.compare(probe, element))
    }

    /// Deepest existing node along `key` and the number of elements consumed
    fn descend(&self, key: &[K]) -> (NodeId, usize) {
        let mut current = self.root;
        let mut depth = 0;
        for element in key {
            let Some(node) = self.arena.get(current) else { break };
            match self.child_position(node, element) {
                Ok(pos) => {
                    current = node.children[pos];
                    depth += 1;
                }
                Err(_) => break,
            }
        }
        (current, depth)
    }

    fn exact(&self, key: &[K]) -> Option<(NodeId, &Node<K, V>)> {
        let (id, depth) = self.descend(key);
        if depth != key.len() {
            return None;
        }
        self.arena
            .get(id)
            .filter(|node| node.has_versions())
            .map(|node| (id, node))
    }

    fn create_child(&mut self, parent: NodeId, element: K) -> NodeId {
        let pos = match self.arena.get(parent) {
            Some(node) => match self.child_position(node, &element) {
                Ok(pos) => return node.children[pos],
                Err(pos) => pos,
            },
            None => return parent,
        };

        let child = self.arena.alloc(Node::new(Some(parent), pos));
        let shifted = match self.arena.get_mut(parent) {
            Some(node) => {
                node.keys.insert(pos, element);
                node.children.insert(pos, child);
                node.children[pos + 1..].to_vec()
            }
            None => Vec::new(),
        };
        for sibling in shifted {
            if let Some(node) = self.arena.get_mut(sibling) {
                node.index_within_parent += 1;
            }
        }
        child
    }

    /// Append a new version under `key`, creating missing nodes on the way
    pub fn insert(&mut self, key: &[K], value: V) -> VersionId {
        let (mut current, depth) = self.descend(key);
        for element in &key[depth..] {
            current = self.create_child(current, element.clone());
        }

        let version = self.next_version;
        self.next_version += 1;
        if let Some(node) = self.arena.get_mut(current) {
            node.value.add_version(version, value);
            self.size += 1;
        }
        version
    }

    /// Pin the latest version stored under `key`
    pub fn find(&self, key: &[K]) -> Option<VersionRef<V>> {
        let (_, node) = self.exact(key)?;
        node.value.latest().map(|(version, entry)| entry.pin(version))
    }

    /// Borrow the latest value stored under `key` without pinning it
    pub fn get(&self, key: &[K]) -> Option<&V> {
        let (_, node) = self.exact(key)?;
        node.value.latest().map(|(_, entry)| entry.value())
    }

    pub fn contains(&self, key: &[K]) -> bool {
        self.exact(key).is_some()
    }

    /// Full version history stored under `key`
    pub fn versions(&self, key: &[K]) -> Option<&VersionedValue<V>> {
        self.exact(key).map(|(_, node)| &node.value)
    }

    /// Deepest node reachable by a prefix of `key`, backed up to the nearest
    /// node that holds a version (or the root)
    pub fn longest_match(&self, key: &[K]) -> MatchResult {
        let (mut current, mut size) = self.descend(key);
        while let Some(node) = self.arena.get(current) {
            if node.has_versions() {
                break;
            }
            match node.parent {
                Some(parent) => {
                    current = parent;
                    size -= 1;
                }
                None => break,
            }
        }

        let (matched, leaf) = self
            .arena
            .get(current)
            .map(|node| (node.has_versions(), node.is_leaf()))
            .unwrap_or((false, true));
        MatchResult {
            node: current,
            size,
            matched,
            leaf,
        }
    }

    /// Increment the explicit refcount of one version
    pub fn add_ref(&mut self, key: &[K], version: VersionId) -> bool {
        let Some(id) = self.exact(key).map(|(id, _)| id) else {
            return false;
        };
        match self
            .arena
            .get_mut(id)
            .and_then(|node| node.value.get_mut(version))
        {
            Some(entry) => {
                entry.add_ref();
                true
            }
            None => false,
        }
    }

    /// Decrement the explicit refcount of one version; returns what is left
    pub fn release_ref(&mut self, key: &[K], version: VersionId) -> Option<usize> {
        let id = self.exact(key).map(|(id, _)| id)?;
        self.arena
            .get_mut(id)
            .and_then(|node| node.value.get_mut(version))
            .map(|entry| entry.release_ref())
    }

    /// Remove the most recent version stored under `key`
    pub fn erase(&mut self, key: &[K]) -> bool {
        match self.exact(key) {
            Some((id, _)) => {
                self.erase_latest(id);
                true
            }
            None => false,
        }
    }

    fn erase_latest(&mut self, id: NodeId) {
        let root = self.root;
        let Some(node) = self.arena.get_mut(id) else { return };

        if node.value.remove_latest().is_some() {
            self.size -= 1;
        }

        if !node.is_leaf() {
            // still a path to other keys
            return;
        }

        if node.value.has_alive_versions() {
            self.size -= node.value.cleanup_dead_versions();
            return;
        }

        // unreferenced leftovers go with the node
        self.size -= node.value.len();
        node.value.clear();
        if id == root {
            return;
        }

        let mut current = id;
        while let Some(parent) = self.unlink(current) {
            if parent == root {
                break;
            }
            match self.arena.get(parent) {
                Some(node) if node.is_leaf() && !node.has_versions() => current = parent,
                _ => break,
            }
        }
    }

    /// Detach a childless node from its parent and free it; returns the parent
    fn unlink(&mut self, id: NodeId) -> Option<NodeId> {
        let node = self.arena.free(id)?;
        let parent_id = node.parent?;
        let pos = node.index_within_parent;

        let shifted = match self.arena.get_mut(parent_id) {
            Some(parent) => {
                parent.keys.remove(pos);
                parent.children.remove(pos);
                parent.children[pos..].to_vec()
            }
            None => return None,
        };
        for sibling in shifted {
            if let Some(node) = self.arena.get_mut(sibling) {
                node.index_within_parent -= 1;
            }
        }
        Some(parent_id)
    }
}

impl<K: Clone, V: Clone, C: ElementOrder<K>> VersionedTrie<K, V, C> {
    /// Mutable access to the latest value under `key`.
    ///
    /// Copy-on-write: if the version is pinned, the pinned handles keep the
    /// old value and the trie continues with a private copy.
    pub fn get_mut(&mut self, key: &[K]) -> Option<&mut V> {
        let id = self.exact(key).map(|(id, _)| id)?;
        self.arena
            .get_mut(id)
            .and_then(|node| node.value.latest_mut())
            .map(|entry| entry.value_mut())
    }
}

impl<K, V, C> PartialEq for VersionedTrie<K, V, C>
where
    K: Clone + PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.key == b.key && *a.version == *b.version)
            && self.iter().count() == other.iter().count()
    }
}
