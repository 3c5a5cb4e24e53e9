// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Table metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::table_schema::Schema;
use super::types::FieldId;

/// Everything the catalog knows about a regular table.
///
/// The schema is shared: readers holding the `Arc` keep seeing it after a
/// commit replaces the metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    schema: Arc<Schema>,
    description: String,
    last_updated: DateTime<Utc>,
    next_column_id: FieldId,
}

impl TableMetadata {
    pub fn new(schema: Schema, description: impl Into<String>) -> Self {
        let next_column_id = schema.highest_field_id() + 1;
        Self {
            schema: Arc::new(schema),
            description: description.into(),
            last_updated: Utc::now(),
            next_column_id,
        }
    }

    /// Successor metadata produced by a commit
    pub(crate) fn successor(
        &self,
        schema: Schema,
        description: Option<&str>,
    ) -> Self {
        let next_column_id = self.next_column_id.max(schema.highest_field_id() + 1);
        Self {
            schema: Arc::new(schema),
            description: description
                .map(str::to_string)
                .unwrap_or_else(|| self.description.clone()),
            last_updated: Utc::now(),
            next_column_id,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// First id not yet handed out to a column of this table
    pub fn next_column_id(&self) -> FieldId {
        self.next_column_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{ComplexLogicalType, LogicalType};

    #[test]
    fn test_successor_never_reuses_column_ids() {
        let schema = Schema::from_columns(vec![
            ComplexLogicalType::named("a", LogicalType::Integer),
            ComplexLogicalType::named("b", LogicalType::Integer),
        ])
        .unwrap();
        let meta = TableMetadata::new(schema, "t");
        assert_eq!(meta.next_column_id(), 3);

        // dropping the highest column must not hand its id out again
        let shrunk = Schema::from_columns(vec![ComplexLogicalType::named("a", LogicalType::Integer)])
            .unwrap();
        let next = meta.successor(shrunk, None);
        assert_eq!(next.next_column_id(), 3);
        assert_eq!(next.description(), "t");
        assert!(next.last_updated() >= meta.last_updated());
    }
}
