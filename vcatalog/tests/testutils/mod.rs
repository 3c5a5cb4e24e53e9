// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shared fixtures for catalog integration tests

#![allow(dead_code)]

use vcatalog::{
    Catalog, ComplexLogicalType, FieldDescription, LogicalType, Schema, TableId, TableMetadata,
    TableNamespace,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn ns(path: &[&str]) -> TableNamespace {
    path.iter().map(|s| s.to_string()).collect()
}

/// Catalog with the given namespaces already created
pub fn catalog_with(namespaces: &[&[&str]]) -> Catalog {
    init_logging();
    let catalog = Catalog::new();
    for path in namespaces {
        catalog
            .create_namespace(&ns(path))
            .expect("Failed to create namespace");
    }
    catalog
}

/// Table with one required column carrying field id 1 and doc "test"
pub fn create_single_column_table(catalog: &Catalog, id: &TableId, column: &str, ty: LogicalType) {
    let schema = Schema::new(
        vec![ComplexLogicalType::named(column, ty)],
        vec![FieldDescription::new(1).with_required(true).with_doc("test")],
        vec![1],
    )
    .expect("Failed to build schema");
    catalog
        .create_table(id, TableMetadata::new(schema, ""))
        .expect("Failed to create table");
}
