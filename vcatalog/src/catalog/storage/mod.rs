// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Namespace storage
//!
//! Namespaces form a hierarchy kept in a [`VersionedTrie`] keyed by path
//! segments. Each namespace node carries a [`NamespaceInfo`] holding the
//! tables and computing tables that live directly in it.

use std::collections::BTreeMap;

use super::config::CatalogConfig;
use super::error::{CatalogError, CatalogResult};
use super::table_id::{TableId, TableNamespace};
use super::trie::{VersionRef, VersionedTrie};
use crate::schema::{ComputedSchema, TableMetadata};

/// Tables owned by a single namespace
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamespaceInfo {
    pub tables: BTreeMap<String, TableMetadata>,
    pub computing: BTreeMap<String, ComputedSchema>,
}

impl NamespaceInfo {
    /// No regular and no computing tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.computing.is_empty()
    }
}

pub(crate) fn display_namespace(ns: &[String]) -> String {
    ns.join(".")
}

#[derive(Debug)]
pub struct NamespaceStorage {
    namespaces: VersionedTrie<String, NamespaceInfo>,
    config: CatalogConfig,
}

impl Default for NamespaceStorage {
    fn default() -> Self {
        Self::new(CatalogConfig::default())
    }
}

impl NamespaceStorage {
    pub fn new(config: CatalogConfig) -> Self {
        Self {
            namespaces: VersionedTrie::with_capacity(config.initial_node_capacity),
            config,
        }
    }

    /// Create `ns` and every missing ancestor; existing entries are kept
    pub fn create_namespace(&mut self, ns: &[String]) -> CatalogResult<()> {
        if ns.is_empty() {
            return Err(CatalogError::InvalidNamespace(
                "namespace path is empty".to_string(),
            ));
        }
        if ns.len() > self.config.max_namespace_depth {
            return Err(CatalogError::LimitExceeded(format!(
                "namespace {} is {} levels deep, limit is {}",
                display_namespace(ns),
                ns.len(),
                self.config.max_namespace_depth
            )));
        }

        for depth in 1..=ns.len() {
            let prefix = &ns[..depth];
            if !self.namespaces.contains(prefix) {
                self.namespaces.insert(prefix, NamespaceInfo::default());
                log::debug!("namespace {} created", display_namespace(prefix));
            }
        }
        Ok(())
    }

    /// Remove exactly `ns`; child namespaces must be dropped first
    pub fn drop_namespace(&mut self, ns: &[String]) -> CatalogResult<()> {
        if !self.namespace_exists(ns) {
            return Err(CatalogError::NoSuchNamespace(display_namespace(ns)));
        }
        if self.has_child_namespaces(ns) {
            return Err(CatalogError::NotSupported(format!(
                "namespace {} still has child namespaces",
                display_namespace(ns)
            )));
        }

        self.namespaces.erase(ns);
        log::debug!("namespace {} dropped", display_namespace(ns));
        Ok(())
    }

    pub fn namespace_exists(&self, ns: &[String]) -> bool {
        !ns.is_empty() && self.namespaces.contains(ns)
    }

    /// Top-level namespaces in order
    pub fn list_root_namespaces(&self) -> Vec<TableNamespace> {
        let root = self.namespaces.longest_match(&[]);
        self.namespaces
            .copy_next_key_elements(&root)
            .into_iter()
            .map(|segment| vec![segment])
            .collect()
    }

    /// Direct children of `parent` in order
    pub fn list_child_namespaces(&self, parent: &[String]) -> CatalogResult<Vec<TableNamespace>> {
        let m = self.namespaces.longest_match(parent);
        if parent.is_empty() || !m.matched || m.size != parent.len() {
            return Err(CatalogError::NoSuchNamespace(display_namespace(parent)));
        }

        Ok(self
            .namespaces
            .copy_next_key_elements(&m)
            .into_iter()
            .map(|segment| {
                let mut child = parent.to_vec();
                child.push(segment);
                child
            })
            .collect())
    }

    /// Every namespace, parents before children
    pub fn list_all_namespaces(&self) -> Vec<TableNamespace> {
        self.namespaces.keys().collect()
    }

    pub fn has_child_namespaces(&self, ns: &[String]) -> bool {
        let m = self.namespaces.longest_match(ns);
        m.matched && m.size == ns.len() && !m.leaf
    }

    /// Every strict descendant of `ns`, parents before children
    pub fn get_all_descendants(&self, ns: &[String]) -> CatalogResult<Vec<TableNamespace>> {
        let mut result = Vec::new();
        let mut stack = self.list_child_namespaces(ns)?;
        stack.reverse();

        while let Some(current) = stack.pop() {
            let mut children = self.list_child_namespaces(&current)?;
            children.reverse();
            stack.extend(children);
            result.push(current);
        }
        Ok(result)
    }

    pub fn namespace_info(&self, ns: &[String]) -> CatalogResult<&NamespaceInfo> {
        self.namespaces
            .get(ns)
            .ok_or_else(|| CatalogError::NoSuchNamespace(display_namespace(ns)))
    }

    /// Mutable access; pinned snapshots of this namespace keep their copy
    pub fn namespace_info_mut(&mut self, ns: &[String]) -> CatalogResult<&mut NamespaceInfo> {
        self.namespaces
            .get_mut(ns)
            .ok_or_else(|| CatalogError::NoSuchNamespace(display_namespace(ns)))
    }

    /// Consistent view of a namespace that later writes do not affect
    pub fn snapshot(&self, ns: &[String]) -> CatalogResult<VersionRef<NamespaceInfo>> {
        self.namespaces
            .find(ns)
            .ok_or_else(|| CatalogError::NoSuchNamespace(display_namespace(ns)))
    }

    pub fn parent_namespace<'a>(&self, ns: &'a [String]) -> Option<&'a [String]> {
        match ns.len() {
            0 | 1 => None,
            n => Some(&ns[..n - 1]),
        }
    }

    pub fn table(&self, id: &TableId) -> Option<&TableMetadata> {
        self.namespaces.get(id.namespace())?.tables.get(id.name())
    }

    pub fn table_mut(&mut self, id: &TableId) -> Option<&mut TableMetadata> {
        self.namespaces
            .get_mut(id.namespace())?
            .tables
            .get_mut(id.name())
    }

    pub fn computing_schema(&self, id: &TableId) -> Option<&ComputedSchema> {
        self.namespaces.get(id.namespace())?.computing.get(id.name())
    }

    pub fn computing_schema_mut(&mut self, id: &TableId) -> Option<&mut ComputedSchema> {
        self.namespaces
            .get_mut(id.namespace())?
            .computing
            .get_mut(id.name())
    }

    pub fn clear(&mut self) {
        self.namespaces.clear();
    }

    /// Number of namespaces
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(path: &[&str]) -> TableNamespace {
        path.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_materializes_ancestors() {
        let mut storage = NamespaceStorage::default();
        storage.create_namespace(&ns(&["a", "b", "c"])).unwrap();
        storage.create_namespace(&ns(&["a", "b", "c"])).unwrap();

        assert!(storage.namespace_exists(&ns(&["a"])));
        assert!(storage.namespace_exists(&ns(&["a", "b"])));
        assert_eq!(storage.len(), 3);
        assert_eq!(storage.parent_namespace(&ns(&["a", "b"])), Some(&ns(&["a"])[..]));
    }

    #[test]
    fn test_create_rejects_bad_paths() {
        let mut storage = NamespaceStorage::new(CatalogConfig::with_max_namespace_depth(2));
        assert!(matches!(
            storage.create_namespace(&[]),
            Err(CatalogError::InvalidNamespace(_))
        ));
        assert!(matches!(
            storage.create_namespace(&ns(&["a", "b", "c"])),
            Err(CatalogError::LimitExceeded(_))
        ));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_drop_requires_leaf() {
        let mut storage = NamespaceStorage::default();
        storage.create_namespace(&ns(&["a", "b"])).unwrap();

        assert!(matches!(
            storage.drop_namespace(&ns(&["a"])),
            Err(CatalogError::NotSupported(_))
        ));
        assert!(matches!(
            storage.drop_namespace(&ns(&["x"])),
            Err(CatalogError::NoSuchNamespace(_))
        ));

        storage.drop_namespace(&ns(&["a", "b"])).unwrap();
        assert!(!storage.has_child_namespaces(&ns(&["a"])));
        storage.drop_namespace(&ns(&["a"])).unwrap();
        assert!(storage.list_all_namespaces().is_empty());
    }

    #[test]
    fn test_descendants_in_preorder() {
        let mut storage = NamespaceStorage::default();
        for path in [&["r", "b"][..], &["r", "a", "x"], &["r", "a", "y"]] {
            storage.create_namespace(&ns(path)).unwrap();
        }

        let descendants = storage.get_all_descendants(&ns(&["r"])).unwrap();
        assert_eq!(
            descendants,
            vec![
                ns(&["r", "a"]),
                ns(&["r", "a", "x"]),
                ns(&["r", "a", "y"]),
                ns(&["r", "b"]),
            ]
        );
        assert!(storage.get_all_descendants(&ns(&["nope"])).is_err());
    }

    #[test]
    fn test_snapshot_is_isolated_from_writes() {
        let mut storage = NamespaceStorage::default();
        storage.create_namespace(&ns(&["db"])).unwrap();
        let before = storage.snapshot(&ns(&["db"])).unwrap();

        storage
            .namespace_info_mut(&ns(&["db"]))
            .unwrap()
            .computing
            .insert("docs".to_string(), ComputedSchema::new());

        assert!(before.is_empty());
        assert!(!storage.namespace_info(&ns(&["db"])).unwrap().is_empty());
    }
}
