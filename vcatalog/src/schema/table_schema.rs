// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Validated table schema

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::types::{ComplexLogicalType, FieldDescription, FieldId};
use crate::catalog::error::{CatalogMistake, Mistake};

/// Ordered, typed and described column list plus a primary key.
///
/// A schema is immutable once built; every constructor validates that
/// aliases and field ids are unique, that each column has exactly one
/// description and that all primary key ids resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaRepr", into = "SchemaRepr")]
pub struct Schema {
    columns: Vec<ComplexLogicalType>,
    descriptions: Vec<FieldDescription>,
    primary_key: Vec<FieldId>,
    id_to_index: HashMap<FieldId, usize>,
    highest_field_id: FieldId,
}

impl Schema {
    pub fn new(
        columns: Vec<ComplexLogicalType>,
        descriptions: Vec<FieldDescription>,
        primary_key: Vec<FieldId>,
    ) -> Result<Self, Mistake> {
        if columns.len() != descriptions.len() {
            return Err(Mistake::new(
                CatalogMistake::FieldMissing,
                format!(
                    "{} columns but {} field descriptions",
                    columns.len(),
                    descriptions.len()
                ),
            ));
        }

        let mut aliases = HashSet::with_capacity(columns.len());
        let mut id_to_index = HashMap::with_capacity(columns.len());
        let mut highest_field_id = 0;
        for (index, (column, desc)) in columns.iter().zip(&descriptions).enumerate() {
            if !aliases.insert(column.alias()) {
                return Err(Mistake::new(
                    CatalogMistake::DuplicateColumn,
                    format!("Duplicate column name: {}", column.alias()),
                ));
            }
            if id_to_index.insert(desc.field_id, index).is_some() {
                return Err(Mistake::new(
                    CatalogMistake::DuplicateColumn,
                    format!("Duplicate field id: {}", desc.field_id),
                ));
            }
            highest_field_id = highest_field_id.max(desc.field_id);
        }

        if let Some(id) = primary_key.iter().find(|id| !id_to_index.contains_key(id)) {
            return Err(Mistake::new(
                CatalogMistake::MissingPrimaryKeyId,
                format!("Primary key references unknown field id: {}", id),
            ));
        }

        Ok(Self {
            columns,
            descriptions,
            primary_key,
            id_to_index,
            highest_field_id,
        })
    }

    /// Schema with ids `1..=n` in column order, all optional, no primary key
    pub fn from_columns(columns: Vec<ComplexLogicalType>) -> Result<Self, Mistake> {
        let descriptions = (1..=columns.len() as FieldId)
            .map(FieldDescription::new)
            .collect();
        Self::new(columns, descriptions, Vec::new())
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            descriptions: Vec::new(),
            primary_key: Vec::new(),
            id_to_index: HashMap::new(),
            highest_field_id: 0,
        }
    }

    pub fn columns(&self) -> &[ComplexLogicalType] {
        &self.columns
    }

    pub fn descriptions(&self) -> &[FieldDescription] {
        &self.descriptions
    }

    pub fn primary_key(&self) -> &[FieldId] {
        &self.primary_key
    }

    /// Largest field id present, 0 for an empty schema
    pub fn highest_field_id(&self) -> FieldId {
        self.highest_field_id
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns paired with their descriptions, in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&ComplexLogicalType, &FieldDescription)> {
        self.columns.iter().zip(self.descriptions.iter())
    }

    fn index_of(&self, name: &str) -> Result<usize, Mistake> {
        self.columns
            .iter()
            .position(|c| c.alias() == name)
            .ok_or_else(|| field_missing(name))
    }

    fn index_of_id(&self, id: FieldId) -> Result<usize, Mistake> {
        self.id_to_index
            .get(&id)
            .copied()
            .ok_or_else(|| field_missing(&format!("#{}", id)))
    }

    pub fn find_field(&self, name: &str) -> Result<&ComplexLogicalType, Mistake> {
        self.index_of(name).map(|i| &self.columns[i])
    }

    pub fn find_field_by_id(&self, id: FieldId) -> Result<&ComplexLogicalType, Mistake> {
        self.index_of_id(id).map(|i| &self.columns[i])
    }

    pub fn field_description(&self, name: &str) -> Result<&FieldDescription, Mistake> {
        self.index_of(name).map(|i| &self.descriptions[i])
    }

    pub fn field_description_by_id(&self, id: FieldId) -> Result<&FieldDescription, Mistake> {
        self.index_of_id(id).map(|i| &self.descriptions[i])
    }

    pub fn field_id(&self, name: &str) -> Result<FieldId, Mistake> {
        self.field_description(name).map(|d| d.field_id)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.index_of(name).is_ok()
    }

    /// The whole schema as one struct type
    pub fn as_struct(&self) -> ComplexLogicalType {
        ComplexLogicalType::create_struct(self.columns.clone())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::empty()
    }
}

fn field_missing(name: &str) -> Mistake {
    Mistake::new(CatalogMistake::FieldMissing, format!("No such field: {}", name))
}

#[derive(Serialize, Deserialize)]
struct SchemaRepr {
    columns: Vec<ComplexLogicalType>,
    descriptions: Vec<FieldDescription>,
    #[serde(default)]
    primary_key: Vec<FieldId>,
}

impl TryFrom<SchemaRepr> for Schema {
    type Error = Mistake;

    fn try_from(repr: SchemaRepr) -> Result<Self, Self::Error> {
        Schema::new(repr.columns, repr.descriptions, repr.primary_key)
    }
}

impl From<Schema> for SchemaRepr {
    fn from(schema: Schema) -> Self {
        Self {
            columns: schema.columns,
            descriptions: schema.descriptions,
            primary_key: schema.primary_key,
        }
    }
}
