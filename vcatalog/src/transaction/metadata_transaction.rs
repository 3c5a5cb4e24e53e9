// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Metadata transactions with savepoints

use std::collections::HashMap;

use super::schema_diff::SchemaDiff;
use crate::catalog::error::{Mistake, TransactionMistake};
use crate::schema::{ComplexLogicalType, FieldId, LogicalType, TableMetadata};

/// Pending change to a table's metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataDiff {
    pub schema: SchemaDiff,
    pub description: Option<String>,
}

impl MetadataDiff {
    pub fn has_changes(&self) -> bool {
        self.schema.has_changes() || self.description.is_some()
    }

    /// Build the metadata that replaces `base` on commit
    pub fn apply(&self, base: &TableMetadata) -> Result<TableMetadata, Mistake> {
        let old = base.schema();
        let first_new_id = base.next_column_id().max(old.highest_field_id() + 1);
        let schema = self.schema.apply_from(old, first_new_id)?;
        Ok(base.successor(schema, self.description.as_deref()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    Aborted,
}

/// Accumulates a [`MetadataDiff`] until it is committed or aborted.
///
/// Every mutator fails with `TRANSACTION_INACTIVE` once the transaction left
/// the `Active` state.
#[derive(Debug, Clone)]
pub struct MetadataTransaction {
    diff: MetadataDiff,
    savepoints: HashMap<String, MetadataDiff>,
    state: TransactionState,
}

impl Default for MetadataTransaction {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataTransaction {
    pub fn new() -> Self {
        Self {
            diff: MetadataDiff::default(),
            savepoints: HashMap::new(),
            state: TransactionState::Active,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    pub fn diff(&self) -> &MetadataDiff {
        &self.diff
    }

    fn ensure_active(&self) -> Result<(), Mistake> {
        match self.state {
            TransactionState::Active => Ok(()),
            state => Err(Mistake::new(
                TransactionMistake::TransactionInactive,
                format!("Transaction is {:?}", state),
            )),
        }
    }

    pub fn add_column(
        &mut self,
        name: &str,
        ty: impl Into<ComplexLogicalType>,
        required: bool,
        doc: &str,
    ) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        self.diff.schema.add_column(name, ty, required, doc)?;
        Ok(self)
    }

    pub fn delete_column(&mut self, name: &str) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        self.diff.schema.delete_column(name);
        Ok(self)
    }

    pub fn rename_column(&mut self, name: &str, new_name: &str) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        self.diff.schema.rename_column(name, new_name)?;
        Ok(self)
    }

    pub fn update_column_type(&mut self, name: &str, ty: LogicalType) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        self.diff.schema.update_column_type(name, ty);
        Ok(self)
    }

    pub fn update_column_doc(&mut self, name: &str, doc: &str) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        self.diff.schema.update_column_doc(name, doc);
        Ok(self)
    }

    pub fn make_optional(&mut self, name: &str) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        self.diff.schema.make_optional(name);
        Ok(self)
    }

    pub fn make_required(&mut self, name: &str) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        self.diff.schema.make_required(name);
        Ok(self)
    }

    pub fn update_primary_key(&mut self, primary_key: Vec<FieldId>) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        self.diff.schema.update_primary_key(primary_key);
        Ok(self)
    }

    pub fn update_description(&mut self, description: &str) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        self.diff.description = Some(description.to_string());
        Ok(self)
    }

    /// Remember the current diff under `name`, replacing an older savepoint
    pub fn savepoint(&mut self, name: &str) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        self.savepoints.insert(name.to_string(), self.diff.clone());
        Ok(self)
    }

    /// Restore the diff remembered under `name`; all savepoints stay usable
    pub fn rollback_to_savepoint(&mut self, name: &str) -> Result<&mut Self, Mistake> {
        self.ensure_active()?;
        let saved = self.savepoints.get(name).ok_or_else(|| {
            Mistake::new(
                TransactionMistake::MissingSavepoint,
                format!("No savepoint named {}", name),
            )
        })?;
        self.diff = saved.clone();
        Ok(self)
    }

    /// Hand the diff to `apply`; the transaction is committed only if it succeeds
    pub fn commit<F>(&mut self, apply: F) -> Result<(), Mistake>
    where
        F: FnOnce(&MetadataDiff) -> Result<(), Mistake>,
    {
        self.ensure_active()?;
        apply(&self.diff)?;
        self.state = TransactionState::Committed;
        self.savepoints.clear();
        Ok(())
    }

    pub fn abort(&mut self) -> Result<(), Mistake> {
        self.ensure_active()?;
        self.state = TransactionState::Aborted;
        self.savepoints.clear();
        Ok(())
    }
}
