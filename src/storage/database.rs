// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded inventory database backed by redb.

use std::path::Path;

use redb::{Database, ReadableDatabase, TableDefinition};

// =============================================================================
// Table Definitions
// =============================================================================

/// Credentials: username → serialized UserRecord (JSON bytes).
pub(crate) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Inventory: composite key `owner_id|id_be` → serialized StoredItem (JSON bytes).
pub(crate) const ITEMS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("items");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// InventoryDatabase
// =============================================================================

/// Shared handle to the embedded database.
///
/// Cheap to share behind an `Arc`; redb handles concurrent readers and
/// serializes writers internally, so no application lock wraps it.
pub struct InventoryDatabase {
    db: Database,
}

impl InventoryDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(ITEMS)?;
        }
        write_txn.commit()?;

        tracing::debug!(path = %path.display(), "Inventory database opened");
        Ok(Self { db })
    }

    pub(crate) fn inner(&self) -> &Database {
        &self.db
    }

    /// Cheap read used by the readiness probe.
    pub fn health_check(&self) -> StorageResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        let _ = read_txn.open_table(ITEMS)?;
        Ok(())
    }
}
