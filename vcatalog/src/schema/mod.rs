// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Schema model: column types, validated schemas, table metadata and
//! inferred schemas for document tables

pub mod computed;
pub mod metadata;
pub mod table_schema;
pub mod types;

pub use computed::ComputedSchema;
pub use metadata::TableMetadata;
pub use table_schema::Schema;
pub use types::{ComplexLogicalType, FieldDescription, FieldId, LogicalType};
