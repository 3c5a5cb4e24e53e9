// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the catalog
//!
//! Two channels are used:
//! - [`Mistake`] is a tagged value for conditions a caller can check and react to
//!   (duplicate columns, missing tables, inactive transactions, ...). Public
//!   operations return it as `Result<_, Mistake>`.
//! - [`CatalogError`] is reserved for internal contract violations, such as asking
//!   for the schema of a table that is known not to exist.

use std::fmt;
use thiserror::Error;

/// Result type alias for catalog operations that can break a contract
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Caller-checkable catalog conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogMistake {
    /// Two columns share an alias or a field id
    DuplicateColumn,
    /// A field lookup did not resolve
    FieldMissing,
    /// A primary key references a field id that is not in the schema
    MissingPrimaryKeyId,
    /// The namespace of a table does not exist
    MissingNamespace,
    /// The entity being created is already present
    AlreadyExists,
}

/// Caller-checkable transaction conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionMistake {
    /// The metadata transaction was already committed or aborted
    TransactionInactive,
    /// The transaction scope was already committed or aborted
    TransactionFinalized,
    /// The table the transaction targets does not exist
    MissingTable,
    /// No savepoint with the requested name
    MissingSavepoint,
    /// The commit could not be applied
    CommitFailed,
}

/// Either of the two mistake taxonomies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MistakeKind {
    Catalog(CatalogMistake),
    Transaction(TransactionMistake),
}

impl From<CatalogMistake> for MistakeKind {
    fn from(m: CatalogMistake) -> Self {
        MistakeKind::Catalog(m)
    }
}

impl From<TransactionMistake> for MistakeKind {
    fn from(m: TransactionMistake) -> Self {
        MistakeKind::Transaction(m)
    }
}

impl fmt::Display for CatalogMistake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogMistake::DuplicateColumn => "DUPLICATE_COLUMN",
            CatalogMistake::FieldMissing => "FIELD_MISSING",
            CatalogMistake::MissingPrimaryKeyId => "MISSING_PRIMARY_KEY_ID",
            CatalogMistake::MissingNamespace => "MISSING_NAMESPACE",
            CatalogMistake::AlreadyExists => "ALREADY_EXISTS",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for TransactionMistake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionMistake::TransactionInactive => "TRANSACTION_INACTIVE",
            TransactionMistake::TransactionFinalized => "TRANSACTION_FINALIZED",
            TransactionMistake::MissingTable => "MISSING_TABLE",
            TransactionMistake::MissingSavepoint => "MISSING_SAVEPOINT",
            TransactionMistake::CommitFailed => "COMMIT_FAILED",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for MistakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MistakeKind::Catalog(m) => fmt::Display::fmt(m, f),
            MistakeKind::Transaction(m) => fmt::Display::fmt(m, f),
        }
    }
}

/// Tagged mistake value with a textual detail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {what}")]
pub struct Mistake {
    kind: MistakeKind,
    what: String,
}

impl Mistake {
    pub fn new(kind: impl Into<MistakeKind>, what: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            what: what.into(),
        }
    }

    pub fn kind(&self) -> MistakeKind {
        self.kind
    }

    /// Human readable detail
    pub fn what(&self) -> &str {
        &self.what
    }

    /// Check the tag against either taxonomy
    pub fn is(&self, kind: impl Into<MistakeKind>) -> bool {
        self.kind == kind.into()
    }
}

/// Internal contract violations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Malformed namespace path (e.g. empty)
    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    /// Namespace lookup on a path that does not exist
    #[error("No such namespace: {0}")]
    NoSuchNamespace(String),

    /// Operation the catalog refuses to perform
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Entity lookup that was expected to succeed
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configured limit exceeded
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// A mistake escalated through an API that does not report values
    #[error(transparent)]
    Mistake(#[from] Mistake),
}
