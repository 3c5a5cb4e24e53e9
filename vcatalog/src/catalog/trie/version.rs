// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Reference-counted version chains
//!
//! Every trie node carries a [`VersionedValue`]: an ordered map from version id
//! to [`VersionedEntry`]. An entry is referenced in two ways:
//! - explicitly, through `add_ref`/`release_ref` (used by computed schemas)
//! - implicitly, by every outstanding [`VersionRef`] handle pinning its value

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

/// Monotonically increasing version identifier, unique per trie
pub type VersionId = u64;

/// One version of a value together with its reference count
#[derive(Debug)]
pub struct VersionedEntry<V> {
    value: Arc<V>,
    refcount: usize,
}

impl<V> VersionedEntry<V> {
    pub(crate) fn new(value: V) -> Self {
        Self {
            value: Arc::new(value),
            refcount: 0,
        }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Explicit references plus outstanding pinned handles
    pub fn ref_count(&self) -> usize {
        self.refcount + self.pins()
    }

    /// References taken through `add_ref` only
    pub fn explicit_ref_count(&self) -> usize {
        self.refcount
    }

    pub fn is_alive(&self) -> bool {
        self.ref_count() > 0
    }

    fn pins(&self) -> usize {
        Arc::strong_count(&self.value) - 1
    }

    pub(crate) fn add_ref(&mut self) {
        self.refcount += 1;
    }

    /// Returns the remaining explicit references
    pub(crate) fn release_ref(&mut self) -> usize {
        self.refcount = self.refcount.saturating_sub(1);
        self.refcount
    }

    pub(crate) fn pin(&self, version: VersionId) -> VersionRef<V> {
        VersionRef {
            version,
            value: Arc::clone(&self.value),
        }
    }
}

impl<V: Clone> VersionedEntry<V> {
    /// Copy-on-write access: pinned readers keep the previous value
    pub(crate) fn value_mut(&mut self) -> &mut V {
        Arc::make_mut(&mut self.value)
    }
}

// Clones never share pins with the source entry.
impl<V: Clone> Clone for VersionedEntry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::new(V::clone(&self.value)),
            refcount: self.refcount,
        }
    }
}

/// Handle pinning one version of a value for as long as it lives
#[derive(Debug)]
pub struct VersionRef<V> {
    version: VersionId,
    value: Arc<V>,
}

impl<V> VersionRef<V> {
    pub fn version(&self) -> VersionId {
        self.version
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

impl<V> Clone for VersionRef<V> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            value: Arc::clone(&self.value),
        }
    }
}

impl<V> Deref for VersionRef<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.value
    }
}

/// Ordered version history of a single trie slot
#[derive(Debug)]
pub struct VersionedValue<V> {
    versions: BTreeMap<VersionId, VersionedEntry<V>>,
}

impl<V> Default for VersionedValue<V> {
    fn default() -> Self {
        Self {
            versions: BTreeMap::new(),
        }
    }
}

impl<V: Clone> Clone for VersionedValue<V> {
    fn clone(&self) -> Self {
        Self {
            versions: self.versions.clone(),
        }
    }
}

impl<V> VersionedValue<V> {
    pub(crate) fn add_version(&mut self, version: VersionId, value: V) {
        self.versions.insert(version, VersionedEntry::new(value));
    }

    pub fn latest(&self) -> Option<(VersionId, &VersionedEntry<V>)> {
        self.versions.iter().next_back().map(|(id, e)| (*id, e))
    }

    pub(crate) fn latest_mut(&mut self) -> Option<&mut VersionedEntry<V>> {
        self.versions.values_mut().next_back()
    }

    pub fn latest_version_id(&self) -> Option<VersionId> {
        self.versions.keys().next_back().copied()
    }

    pub fn get(&self, version: VersionId) -> Option<&VersionedEntry<V>> {
        self.versions.get(&version)
    }

    pub(crate) fn get_mut(&mut self, version: VersionId) -> Option<&mut VersionedEntry<V>> {
        self.versions.get_mut(&version)
    }

    /// Versions in ascending id order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (VersionId, &VersionedEntry<V>)> {
        self.versions.iter().map(|(id, e)| (*id, e))
    }

    /// Undo-stack pop of the most recent version
    pub(crate) fn remove_latest(&mut self) -> Option<VersionedEntry<V>> {
        self.versions.pop_last().map(|(_, e)| e)
    }

    pub fn has_versions(&self) -> bool {
        !self.versions.is_empty()
    }

    pub fn has_alive_versions(&self) -> bool {
        self.versions.values().any(VersionedEntry::is_alive)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.versions.clear();
    }

    /// Drop unreferenced versions older than the oldest referenced one.
    ///
    /// Versions above that floor stay, so erasing the latest version keeps
    /// revealing its predecessor while somebody still pins older history.
    pub(crate) fn cleanup_dead_versions(&mut self) -> usize {
        let Some(floor) = self
            .versions
            .iter()
            .find(|(_, e)| e.is_alive())
            .map(|(id, _)| *id)
        else {
            return 0;
        };

        let before = self.versions.len();
        self.versions.retain(|id, e| *id >= floor || e.is_alive());
        before - self.versions.len()
    }

    /// Drop every unreferenced version except the latest one
    pub(crate) fn purge_unreferenced(&mut self) -> usize {
        let Some(latest) = self.latest_version_id() else {
            return 0;
        };

        let before = self.versions.len();
        self.versions.retain(|id, e| *id == latest || e.is_alive());
        before - self.versions.len()
    }
}
