// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pending column edits
//!
//! A [`SchemaDiff`] records edits against the base column they target and
//! only touches a schema in [`SchemaDiff::apply`], which builds a brand new
//! [`Schema`]. Edits on one column are folded into a single [`ColumnUpdate`]
//! and replayed in a fixed order (type, name, doc, optional), so the order in
//! which a caller issued them does not matter.
//!
//! A name is resolved when the edit is recorded: a pending add with that name
//! wins, then a base column already renamed to it, then the base column of
//! that name. Once a column is renamed onto a name that a base column still
//! carries, edits addressed to that name are ambiguous and `apply` rejects
//! the diff.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::error::{CatalogMistake, Mistake};
use crate::schema::{ComplexLogicalType, FieldDescription, FieldId, LogicalType, Schema};

/// Folded edits for one column; `None` means untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnUpdate {
    pub new_type: Option<LogicalType>,
    pub new_name: Option<String>,
    pub doc: Option<String>,
    pub required: Option<bool>,
}

impl ColumnUpdate {
    fn is_empty(&self) -> bool {
        self == &ColumnUpdate::default()
    }

    fn apply_to(&self, column: &mut ComplexLogicalType, desc: &mut FieldDescription) {
        if let Some(ty) = &self.new_type {
            let alias = column.alias().to_string();
            *column = ComplexLogicalType::named(alias, ty.clone());
        }
        if let Some(name) = &self.new_name {
            column.set_alias(name.clone());
        }
        if let Some(doc) = &self.doc {
            desc.doc = doc.clone();
        }
        if let Some(required) = self.required {
            desc.required = required;
        }
    }
}

/// Column an edit resolved to
enum Target {
    Added(usize),
    Base(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDiff {
    /// Edits keyed by the base column's name
    updates: BTreeMap<String, ColumnUpdate>,
    /// Base columns to drop, by base name
    deleted: BTreeSet<String>,
    /// Names that were resolved through a rename
    shadowed: BTreeSet<String>,
    added: Vec<(ComplexLogicalType, FieldDescription)>,
    primary_key: Option<Vec<FieldId>>,
}

impl SchemaDiff {
    pub fn new() -> Self {
        Self::default()
    }

    fn pending_add(&self, name: &str) -> Option<usize> {
        self.added.iter().position(|(c, _)| c.alias() == name)
    }

    /// Base column currently renamed to `name`
    fn renamed_to(&self, name: &str) -> Option<&str> {
        self.updates
            .iter()
            .find(|(_, update)| update.new_name.as_deref() == Some(name))
            .map(|(source, _)| source.as_str())
    }

    fn resolve(&self, name: &str) -> Target {
        if let Some(index) = self.pending_add(name) {
            return Target::Added(index);
        }
        let source = self.renamed_to(name).unwrap_or(name);
        Target::Base(source.to_string())
    }

    /// Resolve `name` for an edit, remembering names reached through a rename
    fn resolve_for_edit(&mut self, name: &str) -> Target {
        let target = self.resolve(name);
        self.note_shadowed(name, &target);
        target
    }

    fn note_shadowed(&mut self, name: &str, target: &Target) {
        if let Target::Base(source) = target {
            if source != name {
                self.shadowed.insert(name.to_string());
            }
        }
    }

    fn update_for(&mut self, source: String) -> &mut ColumnUpdate {
        self.updates.entry(source).or_default()
    }

    fn duplicate(name: &str) -> Mistake {
        Mistake::new(
            CatalogMistake::DuplicateColumn,
            format!("Column already pending: {}", name),
        )
    }

    /// Append a column; it receives a fresh field id when applied
    pub fn add_column(
        &mut self,
        name: &str,
        ty: impl Into<ComplexLogicalType>,
        required: bool,
        doc: &str,
    ) -> Result<&mut Self, Mistake> {
        if self.pending_add(name).is_some() || self.renamed_to(name).is_some() {
            return Err(Self::duplicate(name));
        }

        let column = ty.into().with_alias(name);
        let desc = FieldDescription::new(0).with_required(required).with_doc(doc);
        self.added.push((column, desc));
        Ok(self)
    }

    /// Delete a column; deleting a pending add just cancels it
    pub fn delete_column(&mut self, name: &str) -> &mut Self {
        match self.resolve_for_edit(name) {
            Target::Added(index) => {
                self.added.remove(index);
            }
            Target::Base(source) => {
                self.updates.remove(&source);
                self.deleted.insert(source);
            }
        }
        self
    }

    pub fn rename_column(&mut self, name: &str, new_name: &str) -> Result<&mut Self, Mistake> {
        let target = self.resolve(name);
        let taken_by = self.renamed_to(new_name).map(str::to_string);
        let clashes = match &target {
            Target::Added(index) => {
                taken_by.is_some()
                    || self.pending_add(new_name).map_or(false, |other| other != *index)
            }
            Target::Base(source) => {
                taken_by.map_or(false, |other| &other != source)
                    || self.pending_add(new_name).is_some()
            }
        };
        if clashes {
            return Err(Self::duplicate(new_name));
        }

        if let Target::Base(source) = &target {
            if self.deleted.contains(source) {
                return Err(Mistake::new(
                    CatalogMistake::FieldMissing,
                    format!("Column is pending deletion: {}", name),
                ));
            }
        }

        self.note_shadowed(name, &target);
        match target {
            Target::Added(index) => self.added[index].0.set_alias(new_name),
            Target::Base(source) => {
                let renamed_back = source == new_name;
                let update = self.update_for(source.clone());
                update.new_name = (!renamed_back).then(|| new_name.to_string());
                if update.is_empty() {
                    self.updates.remove(&source);
                }
            }
        }
        Ok(self)
    }

    pub fn update_column_type(&mut self, name: &str, ty: LogicalType) -> &mut Self {
        match self.resolve_for_edit(name) {
            Target::Added(index) => {
                let column = &mut self.added[index].0;
                *column = ComplexLogicalType::named(column.alias().to_string(), ty);
            }
            Target::Base(source) => self.update_for(source).new_type = Some(ty),
        }
        self
    }

    pub fn update_column_doc(&mut self, name: &str, doc: &str) -> &mut Self {
        match self.resolve_for_edit(name) {
            Target::Added(index) => self.added[index].1.doc = doc.to_string(),
            Target::Base(source) => self.update_for(source).doc = Some(doc.to_string()),
        }
        self
    }

    pub fn make_optional(&mut self, name: &str) -> &mut Self {
        self.set_required(name, false)
    }

    pub fn make_required(&mut self, name: &str) -> &mut Self {
        self.set_required(name, true)
    }

    fn set_required(&mut self, name: &str, required: bool) -> &mut Self {
        match self.resolve_for_edit(name) {
            Target::Added(index) => self.added[index].1.required = required,
            Target::Base(source) => self.update_for(source).required = Some(required),
        }
        self
    }

    pub fn update_primary_key(&mut self, primary_key: Vec<FieldId>) -> &mut Self {
        self.primary_key = Some(primary_key);
        self
    }

    pub fn has_changes(&self) -> bool {
        !self.updates.is_empty()
            || !self.added.is_empty()
            || !self.deleted.is_empty()
            || self.primary_key.is_some()
    }

    /// Apply on top of `base`, numbering added columns after its highest id
    pub fn apply(&self, base: &Schema) -> Result<Schema, Mistake> {
        self.apply_from(base, base.highest_field_id() + 1)
    }

    /// A shadowed name is ambiguous if a base column still carries it
    fn check_shadowed(&self, base: &Schema) -> Result<(), Mistake> {
        for name in &self.shadowed {
            let still_named = base.has_field(name)
                && !self.deleted.contains(name)
                && self
                    .updates
                    .get(name)
                    .map_or(true, |update| update.new_name.is_none());
            if still_named {
                return Err(Mistake::new(
                    CatalogMistake::DuplicateColumn,
                    format!("Ambiguous column name: {}", name),
                ));
            }
        }
        Ok(())
    }

    /// Apply on top of `base`; added columns get ids from `first_new_id` on
    pub fn apply_from(&self, base: &Schema, first_new_id: FieldId) -> Result<Schema, Mistake> {
        self.check_shadowed(base)?;

        let capacity = base.len() + self.added.len();
        let mut columns = Vec::with_capacity(capacity);
        let mut descriptions = Vec::with_capacity(capacity);

        for (column, desc) in base.iter() {
            if self.deleted.contains(column.alias()) {
                continue;
            }

            let mut column = column.clone();
            let mut desc = desc.clone();
            if let Some(update) = self.updates.get(column.alias()) {
                update.apply_to(&mut column, &mut desc);
            }
            columns.push(column);
            descriptions.push(desc);
        }

        for (offset, (column, desc)) in self.added.iter().enumerate() {
            let mut desc = desc.clone();
            desc.field_id = first_new_id + offset as FieldId;
            columns.push(column.clone());
            descriptions.push(desc);
        }

        let primary_key = self
            .primary_key
            .clone()
            .unwrap_or_else(|| base.primary_key().to_vec());
        Schema::new(columns, descriptions, primary_key)
    }
}
#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Schema {
        Schema::new(
            vec![
                ComplexLogicalType::named("id", LogicalType::BigInt),
                ComplexLogicalType::named("col", LogicalType::BigInt),
            ],
            vec![
                FieldDescription::new(1).with_required(true),
                FieldDescription::new(2).with_required(true).with_doc("test"),
            ],
            vec![1],
        )
        .unwrap()
    }

    #[test]
    fn test_edits_after_rename_follow_new_name() {
        let mut diff = SchemaDiff::new();
        diff.add_column("new_col", LogicalType::StringLiteral, false, "test1")
            .unwrap()
            .rename_column("col", "new_old_col")
            .unwrap()
            .make_optional("new_old_col")
            .update_column_type("new_old_col", LogicalType::HugeInt);

        let schema = diff.apply(&base()).unwrap();
        assert_eq!(schema.len(), 3);
        assert!(!schema.has_field("col"));
        assert_eq!(
            schema.find_field("new_old_col").unwrap().logical_type(),
            &LogicalType::HugeInt
        );
        let desc = schema.field_description("new_old_col").unwrap();
        assert_eq!(desc.field_id, 2);
        assert_eq!(desc.doc, "test");
        assert!(!desc.required);
        assert_eq!(schema.field_description("new_col").unwrap().field_id, 3);
        assert_eq!(schema.primary_key(), &[1]);
    }

    #[test]
    fn test_edit_order_does_not_matter() {
        let mut a = SchemaDiff::new();
        a.update_column_type("col", LogicalType::Double)
            .rename_column("col", "c")
            .unwrap()
            .update_column_doc("col", "d");

        let mut b = SchemaDiff::new();
        b.update_column_doc("col", "d")
            .rename_column("col", "c")
            .unwrap()
            .update_column_type("col", LogicalType::Double);

        assert_eq!(a.apply(&base()).unwrap(), b.apply(&base()).unwrap());
        let schema = a.apply(&base()).unwrap();
        assert_eq!(schema.find_field("c").unwrap().logical_type(), &LogicalType::Double);
        assert_eq!(schema.field_description("c").unwrap().doc, "d");
    }

    #[test]
    fn test_collisions() {
        let mut diff = SchemaDiff::new();
        diff.add_column("x", LogicalType::Integer, false, "").unwrap();
        let err = diff.add_column("x", LogicalType::Integer, false, "").unwrap_err();
        assert!(err.is(CatalogMistake::DuplicateColumn));
        assert!(diff.rename_column("col", "x").is_err());

        diff.rename_column("col", "y").unwrap();
        assert!(diff.rename_column("id", "y").is_err());
        assert!(diff.add_column("y", LogicalType::Integer, false, "").is_err());

        // clashes with existing columns surface when the diff is applied
        let mut diff = SchemaDiff::new();
        diff.rename_column("col", "id").unwrap();
        let err = diff.apply(&base()).unwrap_err();
        assert!(err.is(CatalogMistake::DuplicateColumn));
    }

    #[test]
    fn test_delete_and_primary_key() {
        let mut diff = SchemaDiff::new();
        assert!(!diff.has_changes());
        diff.add_column("tmp", LogicalType::Boolean, false, "")
            .unwrap()
            .delete_column("tmp");
        assert!(!diff.has_changes());

        diff.delete_column("id").update_primary_key(vec![]);
        let schema = diff.apply_from(&base(), 10).unwrap();
        assert_eq!(schema.len(), 1);
        assert!(schema.primary_key().is_empty());

        // dropping a primary key column without replacing the key is invalid
        let mut diff = SchemaDiff::new();
        diff.delete_column("id");
        let err = diff.apply(&base()).unwrap_err();
        assert!(err.is(CatalogMistake::MissingPrimaryKeyId));
    }

    #[test]
    fn test_delete_by_rename_target() {
        let mut diff = SchemaDiff::new();
        diff.rename_column("col", "renamed").unwrap().delete_column("renamed");
        let schema = diff.apply(&base()).unwrap();
        assert_eq!(schema.len(), 1);
        assert!(schema.has_field("id"));
    }

    #[test]
    fn test_pending_add_edits_in_place() {
        let mut diff = SchemaDiff::new();
        diff.add_column("n", LogicalType::Integer, false, "")
            .unwrap()
            .rename_column("n", "m")
            .unwrap()
            .update_column_type("m", LogicalType::UBigInt)
            .make_required("m")
            .update_column_doc("m", "counter");

        let schema = diff.apply_from(&base(), 5).unwrap();
        let desc = schema.field_description("m").unwrap();
        assert_eq!(desc.field_id, 5);
        assert!(desc.required);
        assert_eq!(desc.doc, "counter");
        assert_eq!(schema.find_field("m").unwrap().logical_type(), &LogicalType::UBigInt);
    }

    fn pair() -> Schema {
        Schema::new(
            vec![
                ComplexLogicalType::named("a", LogicalType::Integer),
                ComplexLogicalType::named("b", LogicalType::Double),
            ],
            vec![FieldDescription::new(1), FieldDescription::new(2)],
            vec![],
        )
        .unwrap()
    }

    fn names_and_ids(schema: &Schema) -> Vec<(String, FieldId)> {
        schema
            .iter()
            .map(|(c, d)| (c.alias().to_string(), d.field_id))
            .collect()
    }

    #[test]
    fn test_chained_rename_onto_vacated_name() {
        let mut diff = SchemaDiff::new();
        diff.rename_column("b", "c")
            .unwrap()
            .rename_column("a", "b")
            .unwrap()
            .make_required("b");

        let schema = diff.apply(&pair()).unwrap();
        assert_eq!(
            names_and_ids(&schema),
            vec![("b".to_string(), 1), ("c".to_string(), 2)]
        );
        assert!(schema.field_description("b").unwrap().required);
        assert!(!schema.field_description("c").unwrap().required);
    }

    #[test]
    fn test_swap_through_temporary_name() {
        let mut diff = SchemaDiff::new();
        diff.rename_column("a", "tmp")
            .unwrap()
            .rename_column("b", "a")
            .unwrap()
            .rename_column("tmp", "b")
            .unwrap();

        let schema = diff.apply(&pair()).unwrap();
        assert_eq!(
            names_and_ids(&schema),
            vec![("b".to_string(), 1), ("a".to_string(), 2)]
        );
        assert_eq!(schema.find_field("b").unwrap().logical_type(), &LogicalType::Integer);
    }

    #[test]
    fn test_direct_swap_is_ambiguous() {
        // after a -> b two columns answer to "b"
        let mut diff = SchemaDiff::new();
        diff.rename_column("a", "b").unwrap().rename_column("b", "a").unwrap();
        let err = diff.apply(&pair()).unwrap_err();
        assert!(err.is(CatalogMistake::DuplicateColumn));

        let mut diff = SchemaDiff::new();
        diff.rename_column("a", "b").unwrap().rename_column("b", "c").unwrap();
        let err = diff.apply(&pair()).unwrap_err();
        assert!(err.is(CatalogMistake::DuplicateColumn));
    }

    #[test]
    fn test_rename_onto_deleted_column() {
        let mut diff = SchemaDiff::new();
        diff.delete_column("b")
            .rename_column("a", "b")
            .unwrap()
            .update_column_doc("b", "moved");

        let schema = diff.apply(&pair()).unwrap();
        assert_eq!(names_and_ids(&schema), vec![("b".to_string(), 1)]);
        assert_eq!(schema.field_description("b").unwrap().doc, "moved");

        let mut diff = SchemaDiff::new();
        diff.delete_column("a");
        let err = diff.rename_column("a", "z").unwrap_err();
        assert!(err.is(CatalogMistake::FieldMissing));
    }

    #[test]
    fn test_deleting_rename_target_frees_name() {
        let mut diff = SchemaDiff::new();
        diff.rename_column("col", "y").unwrap().delete_column("y");
        diff.add_column("y", LogicalType::Boolean, false, "").unwrap();

        let schema = diff.apply(&base()).unwrap();
        assert!(!schema.has_field("col"));
        assert_eq!(schema.field_description("y").unwrap().field_id, 3);
        assert_eq!(schema.find_field("y").unwrap().logical_type(), &LogicalType::Boolean);
    }

    #[test]
    fn test_rename_back_clears_rename() {
        let mut diff = SchemaDiff::new();
        diff.rename_column("col", "x").unwrap().rename_column("x", "col").unwrap();
        assert!(!diff.has_changes());
        assert_eq!(diff.apply(&base()).unwrap(), base());

        // a rejected rename leaves the diff untouched
        let mut diff = SchemaDiff::new();
        diff.add_column("n", LogicalType::Integer, false, "").unwrap();
        let before = diff.clone();
        assert!(diff.rename_column("col", "n").is_err());
        assert_eq!(diff, before);
    }
}
