// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Registry of open transaction scopes

use parking_lot::Mutex;
use std::collections::BTreeMap;

use crate::catalog::table_id::TableId;

/// Open scopes per table.
///
/// The catalog holds the only strong reference; scopes keep a `Weak` and
/// treat a failed upgrade as "the catalog is gone".
#[derive(Debug, Default)]
pub struct TransactionList {
    active: Mutex<BTreeMap<TableId, usize>>,
}

impl TransactionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: &TableId) {
        *self.active.lock().entry(id.clone()).or_insert(0) += 1;
    }

    pub fn remove(&self, id: &TableId) {
        let mut active = self.active.lock();
        if let Some(count) = active.get_mut(id) {
            *count -= 1;
            if *count == 0 {
                active.remove(id);
            }
        }
    }

    /// Open scopes on `id`
    pub fn count(&self, id: &TableId) -> usize {
        self.active.lock().get(id).copied().unwrap_or(0)
    }

    /// Open scopes across all tables
    pub fn total(&self) -> usize {
        self.active.lock().values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.active.lock().is_empty()
    }
}
