// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Trie nodes and the arena that owns them
//!
//! Nodes reference each other through generational [`NodeId`]s instead of
//! pointers. Freed slots go to a free list and are reused; the generation
//! counter makes stale ids resolve to `None` instead of a recycled node.

use super::version::VersionedValue;

/// Stable handle to a node inside a [`NodeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    /// Child key elements, sorted by the trie comparator; parallel to `children`
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    /// Position of this node in `parent.children`
    pub(crate) index_within_parent: usize,
    pub(crate) value: VersionedValue<V>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(parent: Option<NodeId>, index_within_parent: usize) -> Self {
        Self {
            keys: Vec::new(),
            children: Vec::new(),
            parent,
            index_within_parent,
            value: VersionedValue::default(),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn has_versions(&self) -> bool {
        self.value.has_versions()
    }
}

impl<K: Clone, V: Clone> Clone for Node<K, V> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            children: self.children.clone(),
            parent: self.parent,
            index_within_parent: self.index_within_parent,
            value: self.value.clone(),
        }
    }
}

#[derive(Debug)]
struct Slot<K, V> {
    generation: u32,
    node: Option<Node<K, V>>,
}

impl<K: Clone, V: Clone> Clone for Slot<K, V> {
    fn clone(&self) -> Self {
        Self {
            generation: self.generation,
            node: self.node.clone(),
        }
    }
}

/// Slab of trie nodes with a free list
#[derive(Debug)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Vec<u32>,
}

impl<K: Clone, V: Clone> Clone for NodeArena<K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free: self.free.clone(),
        }
    }
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    pub(crate) fn free(&mut self, id: NodeId) -> Option<Node<K, V>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(node)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Live nodes in slot order
    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node<K, V>> {
        self.slots.iter_mut().filter_map(|slot| slot.node.as_mut())
    }

    /// Number of live nodes
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freed_slot_is_reused_with_new_generation() {
        let mut arena: NodeArena<char, i32> = NodeArena::with_capacity(4);
        let a = arena.alloc(Node::new(None, 0));
        let b = arena.alloc(Node::new(Some(a), 0));
        assert_eq!(arena.live(), 2);

        assert!(arena.free(b).is_some());
        assert!(arena.get(b).is_none());
        assert!(arena.free(b).is_none());

        let c = arena.alloc(Node::new(Some(a), 0));
        assert_ne!(b, c);
        assert!(arena.get(c).is_some());
        assert!(arena.get(b).is_none());
        assert_eq!(arena.live(), 2);
    }
}
