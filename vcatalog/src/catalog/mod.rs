// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog facade
//!
//! [`Catalog`] owns the namespace hierarchy and the registry of open
//! transactions. Tables live inside their namespace; regular tables carry a
//! declared schema, computing tables an inferred [`ComputedSchema`].
//!
//! Catalog operations report caller-checkable outcomes as [`Mistake`] values
//! and contract violations as [`CatalogError`].

pub mod config;
pub mod error;
pub mod storage;
pub mod table_id;
pub mod trie;

pub use config::CatalogConfig;
pub use error::{
    CatalogError, CatalogMistake, CatalogResult, Mistake, MistakeKind, TransactionMistake,
};
pub use storage::{NamespaceInfo, NamespaceStorage};
pub use table_id::{TableId, TableNamespace};

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::schema::{ComputedSchema, Schema, TableMetadata};
use crate::transaction::{TransactionList, TransactionScope};
use storage::display_namespace;

/// How a table stores its rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// No such table
    Undefined,
    /// Schemaless documents with an inferred schema
    Documents,
    /// Declared columns
    Columns,
}

#[derive(Debug)]
pub struct Catalog {
    config: CatalogConfig,
    namespaces: Arc<RwLock<NamespaceStorage>>,
    /// Only strong reference; scopes hold `Weak`s to it
    transactions: Arc<TransactionList>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    pub fn with_config(config: CatalogConfig) -> Self {
        Self {
            namespaces: Arc::new(RwLock::new(NamespaceStorage::new(config.clone()))),
            transactions: Arc::new(TransactionList::new()),
            config,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // ==================== Namespaces ====================

    pub fn create_namespace(&self, ns: &[String]) -> CatalogResult<()> {
        self.namespaces.write().create_namespace(ns)
    }

    /// Drop `ns` together with all of its descendants.
    ///
    /// Fails with `NotSupported` if any descendant still holds tables; tables
    /// directly inside `ns` are dropped with it.
    pub fn drop_namespace(&self, ns: &[String]) -> CatalogResult<()> {
        let mut namespaces = self.namespaces.write();
        let descendants = namespaces.get_all_descendants(ns)?;

        let busy = descendants.iter().find(|d| {
            namespaces
                .namespace_info(d)
                .map(|info| !info.is_empty())
                .unwrap_or(false)
        });
        if let Some(busy) = busy {
            log::warn!(
                "refusing to drop namespace {}: {} still holds tables",
                display_namespace(ns),
                display_namespace(busy)
            );
            return Err(CatalogError::NotSupported(format!(
                "namespace {} still holds tables",
                display_namespace(busy)
            )));
        }

        // deepest first
        for descendant in descendants.iter().rev() {
            namespaces.drop_namespace(descendant)?;
        }
        namespaces.drop_namespace(ns)
    }

    pub fn namespace_exists(&self, ns: &[String]) -> bool {
        self.namespaces.read().namespace_exists(ns)
    }

    /// Top-level namespaces
    pub fn list_namespaces(&self) -> Vec<TableNamespace> {
        self.namespaces.read().list_root_namespaces()
    }

    pub fn list_child_namespaces(&self, parent: &[String]) -> CatalogResult<Vec<TableNamespace>> {
        self.namespaces.read().list_child_namespaces(parent)
    }

    pub fn list_all_namespaces(&self) -> Vec<TableNamespace> {
        self.namespaces.read().list_all_namespaces()
    }

    // ==================== Tables ====================

    /// Regular tables of `ns`; empty if the namespace does not exist
    pub fn list_tables(&self, ns: &[String]) -> Vec<TableId> {
        self.namespaces
            .read()
            .namespace_info(ns)
            .map(|info| {
                info.tables
                    .keys()
                    .map(|name| TableId::new(ns.iter().cloned(), name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Computing tables of `ns`; empty if the namespace does not exist
    pub fn list_computing_tables(&self, ns: &[String]) -> Vec<TableId> {
        self.namespaces
            .read()
            .namespace_info(ns)
            .map(|info| {
                info.computing
                    .keys()
                    .map(|name| TableId::new(ns.iter().cloned(), name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn table_exists(&self, id: &TableId) -> bool {
        self.namespaces.read().table(id).is_some()
    }

    pub fn table_computes(&self, id: &TableId) -> bool {
        self.namespaces.read().computing_schema(id).is_some()
    }

    pub fn get_table_format(&self, id: &TableId) -> TableFormat {
        let namespaces = self.namespaces.read();
        if namespaces.table(id).is_some() {
            TableFormat::Columns
        } else if namespaces.computing_schema(id).is_some() {
            TableFormat::Documents
        } else {
            TableFormat::Undefined
        }
    }

    /// Current schema of a regular table; callers must know the table exists
    pub fn get_table_schema(&self, id: &TableId) -> CatalogResult<Arc<Schema>> {
        self.namespaces
            .read()
            .table(id)
            .map(|meta| Arc::clone(meta.schema()))
            .ok_or_else(|| CatalogError::NotFound(format!("table {}", id)))
    }

    pub fn get_table_metadata(&self, id: &TableId) -> CatalogResult<TableMetadata> {
        self.namespaces
            .read()
            .table(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("table {}", id)))
    }

    /// Copy of the inferred schema of a computing table.
    ///
    /// No lock is held once this returns.
    pub fn get_computing_table_schema(&self, id: &TableId) -> CatalogResult<ComputedSchema> {
        self.namespaces
            .read()
            .computing_schema(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("computing table {}", id)))
    }

    /// Run `f` with exclusive access to the inferred schema of a computing
    /// table and return its result.
    ///
    /// The catalog is write-locked only while `f` runs; `f` must not call back
    /// into the catalog.
    pub fn with_computing_table_schema<R, F>(&self, id: &TableId, f: F) -> CatalogResult<R>
    where
        F: FnOnce(&mut ComputedSchema) -> R,
    {
        let mut namespaces = self.namespaces.write();
        let schema = namespaces
            .computing_schema_mut(id)
            .ok_or_else(|| CatalogError::NotFound(format!("computing table {}", id)))?;
        Ok(f(schema))
    }

    pub fn create_table(&self, id: &TableId, metadata: TableMetadata) -> Result<(), Mistake> {
        let mut namespaces = self.namespaces.write();
        let info = namespaces
            .namespace_info_mut(id.namespace())
            .map_err(|_| missing_namespace(id))?;
        if info.tables.contains_key(id.name()) {
            return Err(Mistake::new(
                CatalogMistake::AlreadyExists,
                format!("Table already exists: {}", id),
            ));
        }

        info.tables.insert(id.name().to_string(), metadata);
        log::debug!("table {} created", id);
        Ok(())
    }

    pub fn create_computing_table(&self, id: &TableId) -> Result<(), Mistake> {
        let mut namespaces = self.namespaces.write();
        let info = namespaces
            .namespace_info_mut(id.namespace())
            .map_err(|_| missing_namespace(id))?;
        if info.computing.contains_key(id.name()) {
            return Err(Mistake::new(
                CatalogMistake::AlreadyExists,
                format!("Table already being computed: {}", id),
            ));
        }

        info.computing.insert(id.name().to_string(), ComputedSchema::new());
        log::debug!("computing table {} created", id);
        Ok(())
    }

    /// Drop a regular table; missing tables are ignored
    pub fn drop_table(&self, id: &TableId) {
        let mut namespaces = self.namespaces.write();
        let Ok(info) = namespaces.namespace_info_mut(id.namespace()) else {
            return;
        };
        if info.tables.remove(id.name()).is_some() {
            log::debug!("table {} dropped", id);
        }
    }

    /// Drop a computing table; missing tables are ignored
    pub fn drop_computing_table(&self, id: &TableId) {
        let mut namespaces = self.namespaces.write();
        let Ok(info) = namespaces.namespace_info_mut(id.namespace()) else {
            return;
        };
        if info.computing.remove(id.name()).is_some() {
            log::debug!("computing table {} dropped", id);
        }
    }

    /// Rename a regular table within its namespace
    pub fn rename_table(&self, from: &TableId, to: &str) -> Result<(), Mistake> {
        let mut namespaces = self.namespaces.write();
        let info = namespaces
            .namespace_info_mut(from.namespace())
            .map_err(|_| missing_table(from))?;
        rename_in(&mut info.tables, from, to)?;
        log::debug!("table {} renamed to {}", from, to);
        Ok(())
    }

    /// Rename a computing table within its namespace
    pub fn rename_computing_table(&self, from: &TableId, to: &str) -> Result<(), Mistake> {
        let mut namespaces = self.namespaces.write();
        let info = namespaces
            .namespace_info_mut(from.namespace())
            .map_err(|_| missing_table(from))?;
        rename_in(&mut info.computing, from, to)?;
        log::debug!("computing table {} renamed to {}", from, to);
        Ok(())
    }

    // ==================== Transactions ====================

    /// Open a schema transaction on a regular table
    pub fn begin_transaction(&self, id: &TableId) -> Result<TransactionScope, Mistake> {
        if !self.table_exists(id) {
            return Err(missing_table(id));
        }

        log::debug!("transaction on {} started", id);
        Ok(TransactionScope::new(
            id.clone(),
            &self.transactions,
            &self.namespaces,
        ))
    }

    /// Number of open transaction scopes on `id`
    pub fn active_transactions(&self, id: &TableId) -> usize {
        self.transactions.count(id)
    }
}

impl Drop for Catalog {
    fn drop(&mut self) {
        let open = self.transactions.total();
        if open > 0 {
            log::warn!("catalog dropped with {} open transaction(s)", open);
        }
    }
}

fn missing_namespace(id: &TableId) -> Mistake {
    Mistake::new(
        CatalogMistake::MissingNamespace,
        format!("Namespace does not exist for table: {}", id),
    )
}

fn missing_table(id: &TableId) -> Mistake {
    Mistake::new(
        TransactionMistake::MissingTable,
        format!("Table does not exist: {}", id),
    )
}

fn rename_in<T>(tables: &mut BTreeMap<String, T>, from: &TableId, to: &str) -> Result<(), Mistake> {
    if !tables.contains_key(from.name()) {
        return Err(missing_table(from));
    }
    if tables.contains_key(to) {
        return Err(Mistake::new(
            CatalogMistake::AlreadyExists,
            format!("Target table already exists: {}", from.with_name(to)),
        ));
    }
    let table = tables.remove(from.name()).ok_or_else(|| missing_table(from))?;
    tables.insert(to.to_string(), table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ComplexLogicalType, LogicalType};

    fn ns(path: &[&str]) -> TableNamespace {
        path.iter().map(|s| s.to_string()).collect()
    }

    fn single_column(name: &str) -> TableMetadata {
        let schema =
            Schema::from_columns(vec![ComplexLogicalType::named(name, LogicalType::BigInt)]).unwrap();
        TableMetadata::new(schema, "")
    }

    #[test]
    fn test_catalog_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }

    #[test]
    fn test_table_format() {
        let catalog = Catalog::new();
        catalog.create_namespace(&ns(&["db"])).unwrap();
        let regular = TableId::new(["db"], "rows");
        let docs = TableId::new(["db"], "docs");

        catalog.create_table(&regular, single_column("id")).unwrap();
        catalog.create_computing_table(&docs).unwrap();

        assert_eq!(catalog.get_table_format(&regular), TableFormat::Columns);
        assert_eq!(catalog.get_table_format(&docs), TableFormat::Documents);
        assert_eq!(
            catalog.get_table_format(&TableId::new(["db"], "none")),
            TableFormat::Undefined
        );
    }

    #[test]
    fn test_rename_missing_source_and_occupied_target() {
        let catalog = Catalog::new();
        catalog.create_namespace(&ns(&["db"])).unwrap();
        let a = TableId::new(["db"], "a");
        let b = TableId::new(["db"], "b");
        catalog.create_table(&a, single_column("x")).unwrap();
        catalog.create_table(&b, single_column("y")).unwrap();

        let err = catalog.rename_table(&a, "b").unwrap_err();
        assert!(err.is(CatalogMistake::AlreadyExists));
        let err = catalog
            .rename_table(&TableId::new(["db"], "zzz"), "c")
            .unwrap_err();
        assert!(err.is(TransactionMistake::MissingTable));
        let err = catalog
            .rename_table(&TableId::new(["nowhere"], "a"), "c")
            .unwrap_err();
        assert!(err.is(TransactionMistake::MissingTable));

        assert!(catalog.table_exists(&a));
        assert!(catalog.table_exists(&b));
    }

    #[test]
    fn test_schema_lookup_of_unknown_table_is_an_error() {
        let catalog = Catalog::new();
        let id = TableId::new(["db"], "t");
        assert!(matches!(
            catalog.get_table_schema(&id),
            Err(CatalogError::NotFound(_))
        ));
        assert!(catalog.get_computing_table_schema(&id).is_err());
        assert!(catalog.get_table_metadata(&id).is_err());
    }

    #[test]
    fn test_computing_schema_access_does_not_block_catalog() {
        let catalog = Catalog::new();
        catalog.create_namespace(&ns(&["db"])).unwrap();
        let docs = TableId::new(["db"], "docs");
        catalog.create_computing_table(&docs).unwrap();

        let refcount = catalog
            .with_computing_table_schema(&docs, |schema| {
                schema.append("a", LogicalType::Integer);
                schema.field_refcount("a")
            })
            .unwrap();
        assert_eq!(refcount, 1);

        let copy = catalog.get_computing_table_schema(&docs).unwrap();
        assert!(catalog.table_computes(&docs));
        assert_eq!(catalog.get_table_format(&docs), TableFormat::Documents);
        assert!(catalog.begin_transaction(&docs).is_err());
        catalog.drop_computing_table(&docs);
        assert!(copy.has_field("a"));
        assert!(!catalog.table_computes(&docs));

        let missing = catalog.with_computing_table_schema(&docs, |schema| schema.len());
        assert!(matches!(missing, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_drop_table_only_touches_its_kind() {
        let catalog = Catalog::new();
        catalog.create_namespace(&ns(&["db"])).unwrap();
        let id = TableId::new(["db"], "t");
        catalog.create_table(&id, single_column("x")).unwrap();
        catalog.create_computing_table(&id).unwrap();

        catalog.drop_computing_table(&id);
        assert!(catalog.table_exists(&id));
        assert!(!catalog.table_computes(&id));
        catalog.drop_table(&id);
        assert_eq!(catalog.get_table_format(&id), TableFormat::Undefined);
    }
}
