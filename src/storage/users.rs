// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User credential repository.
//!
//! Users are keyed by username (case-sensitive). The record carries the
//! generated owner id that scopes every inventory row.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use super::database::{InventoryDatabase, StorageError, StorageResult, USERS};

/// Registered user as stored in the `users` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    /// Owner id (UUID v4) used to scope inventory items
    pub user_id: String,
    /// Unique login name
    pub username: String,
    /// Argon2id PHC string, never the plaintext password
    pub password_hash: String,
    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Build a record for a fresh registration.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            user_id: uuid::Uuid::new_v4().to_string(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// Repository for credential lookups and registration.
pub struct UserRepository<'a> {
    db: &'a InventoryDatabase,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a InventoryDatabase) -> Self {
        Self { db }
    }

    /// Look up a user by username.
    pub fn find_by_username(&self, username: &str) -> StorageResult<Option<UserRecord>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(username)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Insert a new user, failing with `AlreadyExists` if the username is taken.
    ///
    /// The existence check and the write share one write transaction, so two
    /// concurrent registrations of the same name cannot both succeed.
    pub fn create(&self, user: &UserRecord) -> StorageResult<()> {
        let json = serde_json::to_vec(user)?;
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(USERS)?;
            let taken = table.get(user.username.as_str())?.is_some();
            if taken {
                return Err(StorageError::AlreadyExists(format!(
                    "User {}",
                    user.username
                )));
            }
            table.insert(user.username.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
