// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Single-table transaction handle

use parking_lot::RwLock;
use std::sync::{Arc, Weak};

use super::list::TransactionList;
use super::metadata_transaction::{MetadataTransaction, TransactionState};
use crate::catalog::error::{Mistake, TransactionMistake};
use crate::catalog::storage::NamespaceStorage;
use crate::catalog::table_id::TableId;

/// Schema transaction on one table, handed out by
/// [`Catalog::begin_transaction`](crate::catalog::Catalog::begin_transaction).
///
/// The scope does not keep the catalog alive. Committing after the catalog
/// was dropped fails with `COMMIT_FAILED`; aborting always works. A scope
/// dropped without commit or abort aborts itself.
#[derive(Debug)]
pub struct TransactionScope {
    id: TableId,
    transaction: MetadataTransaction,
    transactions: Weak<TransactionList>,
    storage: Weak<RwLock<NamespaceStorage>>,
}

impl TransactionScope {
    pub(crate) fn new(
        id: TableId,
        transactions: &Arc<TransactionList>,
        storage: &Arc<RwLock<NamespaceStorage>>,
    ) -> Self {
        transactions.add(&id);
        Self {
            id,
            transaction: MetadataTransaction::new(),
            transactions: Arc::downgrade(transactions),
            storage: Arc::downgrade(storage),
        }
    }

    pub fn table_id(&self) -> &TableId {
        &self.id
    }

    pub fn transaction(&mut self) -> &mut MetadataTransaction {
        &mut self.transaction
    }

    /// Committed or aborted
    pub fn is_finalized(&self) -> bool {
        !self.transaction.is_active()
    }

    fn finalized(&self) -> Mistake {
        Mistake::new(
            TransactionMistake::TransactionFinalized,
            format!("Transaction on {} is already finalized", self.id),
        )
    }

    fn commit_failed(&self, reason: impl std::fmt::Display) -> Mistake {
        Mistake::new(
            TransactionMistake::CommitFailed,
            format!("Commit on {} failed: {}", self.id, reason),
        )
    }

    /// Apply the pending diff to the stored table metadata
    pub fn commit(&mut self) -> Result<(), Mistake> {
        if self.is_finalized() {
            return Err(self.finalized());
        }

        let (Some(transactions), Some(storage)) =
            (self.transactions.upgrade(), self.storage.upgrade())
        else {
            log::warn!("commit on {} after its catalog was destroyed", self.id);
            return Err(self.commit_failed("catalog destroyed"));
        };

        let id = &self.id;
        let result = self.transaction.commit(|diff| {
            let mut storage = storage.write();
            let Some(current) = storage.table_mut(id) else {
                return Err(Mistake::new(
                    TransactionMistake::CommitFailed,
                    format!("Commit on {} failed: table no longer exists", id),
                ));
            };
            let next = diff.apply(current).map_err(|m| {
                Mistake::new(
                    TransactionMistake::CommitFailed,
                    format!("Commit on {} failed: {}", id, m),
                )
            })?;
            *current = next;
            Ok(())
        });

        match result {
            Ok(()) => {
                transactions.remove(&self.id);
                log::debug!("transaction on {} committed", self.id);
                Ok(())
            }
            Err(m) => {
                log::warn!("{}", m);
                Err(m)
            }
        }
    }

    /// Discard the pending diff; aborting twice is fine
    pub fn abort(&mut self) -> Result<(), Mistake> {
        match self.transaction.state() {
            TransactionState::Aborted => return Ok(()),
            TransactionState::Committed => return Err(self.finalized()),
            TransactionState::Active => {}
        }

        self.transaction.abort()?;
        if let Some(transactions) = self.transactions.upgrade() {
            transactions.remove(&self.id);
        }
        log::debug!("transaction on {} aborted", self.id);
        Ok(())
    }
}

impl Drop for TransactionScope {
    fn drop(&mut self) {
        if !self.is_finalized() {
            let _ = self.abort();
        }
    }
}
