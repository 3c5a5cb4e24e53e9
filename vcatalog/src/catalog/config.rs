// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog configuration
//!
//! Provides:
//! - Namespace depth limits
//! - Node arena pre-sizing for the namespace trie

use serde::{Deserialize, Serialize};

use super::error::CatalogResult;

/// Configuration for a catalog instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Maximum number of segments in a namespace path
    pub max_namespace_depth: usize,
    /// Number of trie nodes reserved up front in the namespace arena
    pub initial_node_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_namespace_depth: 32,    // Deep enough for db.schema.sub... layouts
            initial_node_capacity: 64,  // Small catalogs never reallocate
        }
    }
}

impl CatalogConfig {
    /// Create with a custom namespace depth limit
    pub fn with_max_namespace_depth(depth: usize) -> Self {
        Self {
            max_namespace_depth: depth,
            ..Default::default()
        }
    }

    /// Create permissive limits (for testing and bulk imports)
    pub fn permissive() -> Self {
        Self {
            max_namespace_depth: usize::MAX,
            initial_node_capacity: 1024,
        }
    }

    /// Parse a configuration from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CatalogConfig::from_json(r#"{"max_namespace_depth": 4}"#).unwrap();
        assert_eq!(config.max_namespace_depth, 4);
        assert_eq!(
            config.initial_node_capacity,
            CatalogConfig::default().initial_node_capacity
        );
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let result = CatalogConfig::from_json("{ not json");
        assert!(matches!(result, Err(crate::catalog::error::CatalogError::Config(_))));
    }
}
