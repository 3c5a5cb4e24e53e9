// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Schema transactions
//!
//! Provides:
//! - [`SchemaDiff`]: pending column edits applied functionally to a schema
//! - [`MetadataTransaction`]: diff plus description behind a state machine with savepoints
//! - [`TransactionScope`]: RAII handle binding a metadata transaction to one table
//! - [`TransactionList`]: registry scopes use to detect that their catalog is gone

pub mod list;
pub mod metadata_transaction;
pub mod schema_diff;
pub mod scope;

pub use list::TransactionList;
pub use metadata_transaction::{MetadataDiff, MetadataTransaction, TransactionState};
pub use schema_diff::{ColumnUpdate, SchemaDiff};
pub use scope::TransactionScope;
