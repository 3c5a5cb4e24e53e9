// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! VCatalog - versioned catalog and schema-transaction core
//!
//! This crate owns the namespace hierarchy, table metadata and column schemas
//! of a document/table database engine, and provides transactional schema
//! evolution with savepoints.
//!
//! # Quick Start
//!
//! ```no_run
//! use vcatalog::{Catalog, ComplexLogicalType, LogicalType, Schema, TableId, TableMetadata};
//!
//! let catalog = Catalog::new();
//! catalog.create_namespace(&["db".to_string()]).unwrap();
//!
//! let id = TableId::new(["db"], "t");
//! let schema = Schema::from_columns(vec![ComplexLogicalType::named("a", LogicalType::Integer)]).unwrap();
//! catalog.create_table(&id, TableMetadata::new(schema, "")).unwrap();
//!
//! let mut scope = catalog.begin_transaction(&id).unwrap();
//! scope.transaction().add_column("b", LogicalType::BigInt, false, "").unwrap();
//! scope.commit().unwrap();
//!
//! assert_eq!(catalog.get_table_schema(&id).unwrap().len(), 2);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Catalog (facade)                       │
//! │  - namespace / table DDL                │
//! │  - begin_transaction                    │
//! └─────────────────────────────────────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌──────────────────┐  ┌──────────────────┐
//! │ NamespaceStorage │  │ TransactionList  │
//! │ (versioned trie) │  │ (weak liveness)  │
//! └──────────────────┘  └──────────────────┘
//!          ▲                      ▲
//!          └──── TransactionScope ┘
//!                (MetadataTransaction, SchemaDiff)
//! ```
//!
//! # Module Organization
//!
//! - [`catalog`] - Catalog facade, namespace storage, versioned trie, errors, config
//! - [`schema`] - Logical types, schemas, table metadata, computed schemas
//! - [`transaction`] - Schema diffs, metadata transactions, transaction scopes

pub mod catalog;
pub mod schema;
pub mod transaction;

pub use catalog::trie::{VersionRef, VersionedTrie};
pub use catalog::{
    Catalog, CatalogConfig, CatalogError, CatalogMistake, CatalogResult, Mistake, MistakeKind,
    NamespaceInfo, NamespaceStorage, TableFormat, TableId, TableNamespace, TransactionMistake,
};
pub use schema::{
    ComplexLogicalType, ComputedSchema, FieldDescription, FieldId, LogicalType, Schema,
    TableMetadata,
};
pub use transaction::{
    MetadataDiff, MetadataTransaction, SchemaDiff, TransactionList, TransactionScope,
    TransactionState,
};
