// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Inferred schema of a schemaless (document) table
//!
//! Every stored document contributes a reference to each `(field, type)` it
//! carries. A field may be observed with several types; each distinct type is
//! one version of the field in the underlying trie, and a field disappears
//! once the last document referencing it is gone.

use std::collections::HashMap;

use super::types::{ComplexLogicalType, LogicalType};
use crate::catalog::trie::{VersionId, VersionedTrie, VersionedValue};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedSchema {
    fields: VersionedTrie<char, LogicalType>,
    /// Total references per field across all of its types
    refcounts: HashMap<String, usize>,
}

fn field_key(name: &str) -> Vec<char> {
    name.chars().collect()
}

impl ComputedSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more occurrence of `name` with type `ty`
    pub fn append(&mut self, name: &str, ty: LogicalType) {
        let key = field_key(name);
        let version = match self.version_of(&key, &ty) {
            Some(version) => version,
            None => self.fields.insert(&key, ty),
        };
        self.fields.add_ref(&key, version);
        *self.refcounts.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Forget one occurrence of `name` with type `ty`
    pub fn drop(&mut self, name: &str, ty: &LogicalType) {
        self.drop_n(name, ty, 1);
    }

    /// Forget `n` occurrences of `name` with type `ty`.
    ///
    /// At most the references the type still holds are released. Once no
    /// occurrence of the field is left, every version of it is erased.
    pub fn drop_n(&mut self, name: &str, ty: &LogicalType, n: usize) {
        let key = field_key(name);
        let Some(version) = self.version_of(&key, ty) else {
            return;
        };
        let held = self
            .fields
            .versions(&key)
            .and_then(|versions| versions.get(version))
            .map_or(0, |entry| entry.explicit_ref_count());
        let to_release = n.min(held);
        if to_release == 0 {
            return;
        }

        for _ in 0..to_release {
            self.fields.release_ref(&key, version);
        }

        let remaining = match self.refcounts.get_mut(name) {
            Some(total) => {
                *total = total.saturating_sub(to_release);
                *total
            }
            None => 0,
        };
        if remaining == 0 {
            self.refcounts.remove(name);
            while self.fields.erase(&key) {}
            log::debug!("computed field '{}' dropped", name);
        }
    }

    fn version_of(&self, key: &[char], ty: &LogicalType) -> Option<VersionId> {
        self.fields
            .versions(key)?
            .iter()
            .rev()
            .find(|(_, entry)| entry.value() == ty)
            .map(|(version, _)| version)
    }

    /// Struct of every field's most recent live type, ordered by field name
    pub fn latest_types_struct(&self) -> ComplexLogicalType {
        let children = self
            .fields
            .keys()
            .filter_map(|key| {
                let (_, entry) = self
                    .fields
                    .versions(&key)?
                    .iter()
                    .rev()
                    .find(|(_, entry)| entry.is_alive())?;
                let name: String = key.into_iter().collect();
                Some(ComplexLogicalType::named(name, entry.value().clone()))
            })
            .collect();
        ComplexLogicalType::create_struct(children)
    }

    /// Every observed type of a field, oldest first
    pub fn find_field_versions(&self, name: &str) -> Option<&VersionedValue<LogicalType>> {
        self.fields.versions(&field_key(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.refcounts.contains_key(name)
    }

    /// Total references to a field across all of its types
    pub fn field_refcount(&self, name: &str) -> usize {
        self.refcounts.get(name).copied().unwrap_or(0)
    }

    /// Number of distinct fields
    pub fn len(&self) -> usize {
        self.refcounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refcounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_shares_matching_type() {
        let mut schema = ComputedSchema::new();
        schema.append("age", LogicalType::Integer);
        schema.append("age", LogicalType::Integer);
        schema.append("age", LogicalType::StringLiteral);

        let versions = schema.find_field_versions("age").unwrap();
        assert_eq!(versions.len(), 2);
        let counts: Vec<usize> = versions.iter().map(|(_, e)| e.ref_count()).collect();
        assert_eq!(counts, vec![2, 1]);
        assert_eq!(schema.field_refcount("age"), 3);
    }

    #[test]
    fn test_latest_live_type_wins() {
        let mut schema = ComputedSchema::new();
        schema.append("b", LogicalType::Integer);
        schema.append("b", LogicalType::Double);
        schema.append("a", LogicalType::Boolean);

        let ty = schema.latest_types_struct();
        let fields: Vec<(&str, &LogicalType)> = ty
            .child_types()
            .iter()
            .map(|c| (c.alias(), c.logical_type()))
            .collect();
        assert_eq!(
            fields,
            vec![("a", &LogicalType::Boolean), ("b", &LogicalType::Double)]
        );

        // the double is no longer referenced; integer becomes visible again
        schema.drop("b", &LogicalType::Double);
        let ty = schema.latest_types_struct();
        assert_eq!(ty.child_types()[1].logical_type(), &LogicalType::Integer);
    }

    #[test]
    fn test_drop_n_removes_field() {
        let mut schema = ComputedSchema::new();
        for _ in 0..3 {
            schema.append("x", LogicalType::BigInt);
        }
        schema.append("xy", LogicalType::BigInt);

        schema.drop_n("x", &LogicalType::BigInt, 2);
        assert!(schema.has_field("x"));
        schema.drop_n("x", &LogicalType::BigInt, 5);
        assert!(!schema.has_field("x"));
        assert!(schema.find_field_versions("x").is_none());
        assert!(schema.has_field("xy"));
        assert_eq!(schema.len(), 1);

        // unknown fields and types are ignored
        schema.drop("nope", &LogicalType::BigInt);
        schema.drop("xy", &LogicalType::Boolean);
        assert_eq!(schema.field_refcount("xy"), 1);
    }

    #[test]
    fn test_dropping_dead_type_keeps_field() {
        let mut schema = ComputedSchema::new();
        schema.append("b", LogicalType::Integer);
        schema.append("b", LogicalType::Double);

        schema.drop("b", &LogicalType::Double);
        schema.drop("b", &LogicalType::Double);
        schema.drop_n("b", &LogicalType::Double, 3);

        assert!(schema.has_field("b"));
        assert_eq!(schema.field_refcount("b"), 1);
        let ty = schema.latest_types_struct();
        assert_eq!(ty.child_types()[0].logical_type(), &LogicalType::Integer);

        schema.drop_n("b", &LogicalType::Integer, 4);
        assert!(!schema.has_field("b"));
        assert!(schema.is_empty());
    }
}
