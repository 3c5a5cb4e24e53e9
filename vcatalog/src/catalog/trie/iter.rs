// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Depth-first iteration over a versioned trie

use super::node::NodeId;
use super::version::VersionRef;
use super::VersionedTrie;

/// Key together with a pinned handle on its latest version
#[derive(Debug, Clone)]
pub struct TrieEntry<K, V> {
    pub key: Vec<K>,
    pub version: VersionRef<V>,
}

/// Pre-order walk yielding every node that holds a version.
///
/// Each yielded entry pins the version current at the moment it was produced;
/// dropping the entry releases it.
pub struct Iter<'a, K, V, C> {
    trie: &'a VersionedTrie<K, V, C>,
    stack: Vec<NodeId>,
}

impl<'a, K, V, C> Iter<'a, K, V, C> {
    pub(crate) fn new(trie: &'a VersionedTrie<K, V, C>) -> Self {
        Self {
            trie,
            stack: vec![trie.root()],
        }
    }

    /// Next node holding a version, children scheduled in comparator order
    fn next_node(&mut self) -> Option<NodeId> {
        while let Some(id) = self.stack.pop() {
            let Some(node) = self.trie.node(id) else { continue };
            self.stack.extend(node.children.iter().rev().copied());
            if node.has_versions() {
                return Some(id);
            }
        }
        None
    }
}

impl<'a, K: Clone, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = TrieEntry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let id = self.next_node()?;
            let pinned = self
                .trie
                .node(id)
                .and_then(|node| node.value.latest())
                .map(|(version, entry)| entry.pin(version));
            if let Some(version) = pinned {
                return Some(TrieEntry {
                    key: self.trie.key_of(id),
                    version,
                });
            }
        }
    }
}

/// Pre-order walk over the keys of every node that holds a version
pub struct Keys<'a, K, V, C> {
    inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> Keys<'a, K, V, C> {
    pub(crate) fn new(trie: &'a VersionedTrie<K, V, C>) -> Self {
        Self {
            inner: Iter::new(trie),
        }
    }
}

impl<'a, K: Clone, V, C> Iterator for Keys<'a, K, V, C> {
    type Item = Vec<K>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.inner.next_node()?;
        Some(self.inner.trie.key_of(id))
    }
}
