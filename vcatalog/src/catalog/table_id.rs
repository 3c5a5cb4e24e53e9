// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Table identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{CatalogError, CatalogResult};

/// Hierarchical namespace path, outermost segment first
pub type TableNamespace = Vec<String>;

/// Namespace path plus table name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableId {
    namespace: TableNamespace,
    name: String,
}

impl TableId {
    pub fn new<I, S>(namespace: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace: namespace.into_iter().map(Into::into).collect(),
            name: name.into(),
        }
    }

    /// Split a full path whose last segment is the table name
    pub fn from_full_path<S: AsRef<str>>(path: &[S]) -> CatalogResult<Self> {
        match path.split_last() {
            Some((name, namespace)) => Ok(Self::new(
                namespace.iter().map(|s| s.as_ref().to_string()),
                name.as_ref(),
            )),
            None => Err(CatalogError::InvalidNamespace(
                "empty table path".to_string(),
            )),
        }
    }

    pub fn namespace(&self) -> &[String] {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same namespace, different table name
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.namespace {
            write!(f, "{}.", segment)?;
        }
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_path_and_display() {
        let id = TableId::from_full_path(&["db", "sales", "orders"]).unwrap();
        assert_eq!(id.namespace(), ["db", "sales"]);
        assert_eq!(id.name(), "orders");
        assert_eq!(id.to_string(), "db.sales.orders");
        assert_eq!(id.with_name("refunds").to_string(), "db.sales.refunds");

        let empty: [&str; 0] = [];
        assert!(TableId::from_full_path(&empty).is_err());
    }
}
