// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Inventory item repository.
//!
//! Rows are keyed by `(owner_id, id)`. Item ids are only unique within an
//! owner, so every operation takes the owner id and never looks an item up
//! by numeric id alone.

use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};

use super::database::{InventoryDatabase, StorageError, StorageResult, ITEMS};

/// Inventory item as persisted. The six descriptive fields hold ciphertext.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredItem {
    /// Identifier, unique within `owner_id`
    pub id: u64,
    /// Owning user's id
    pub owner_id: String,
    pub name: String,
    /// Empty string when the item has no description
    pub description: String,
    pub quantity: String,
    pub cabinet: String,
    pub room: String,
    pub location: String,
    /// Stored in clear; not considered sensitive
    #[serde(default)]
    pub barcode: Option<String>,
}

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Inserted,
    Replaced,
}

// =============================================================================
// Key Helpers
// =============================================================================

/// Composite key: `owner_id | id_be_bytes`.
///
/// Big-endian ids keep an owner's rows in ascending id order.
fn make_item_key(owner_id: &str, id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(owner_id.len() + 1 + 8);
    key.extend_from_slice(owner_id.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// Prefix covering every row of one owner.
fn make_prefix(owner_id: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(owner_id.len() + 1);
    prefix.extend_from_slice(owner_id.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Upper bound for an owner range scan, past the largest possible id.
fn make_prefix_end(owner_id: &str) -> Vec<u8> {
    let mut end = make_prefix(owner_id);
    end.extend_from_slice(&[0xFF; 9]);
    end
}

/// Recover the numeric id from the tail of a composite key.
fn id_from_key(key: &[u8]) -> Option<u64> {
    let start = key.len().checked_sub(8)?;
    let tail: [u8; 8] = key.get(start..)?.try_into().ok()?;
    Some(u64::from_be_bytes(tail))
}

// =============================================================================
// ItemRepository
// =============================================================================

/// Repository for owner-scoped item operations.
pub struct ItemRepository<'a> {
    db: &'a InventoryDatabase,
}

impl<'a> ItemRepository<'a> {
    pub fn new(db: &'a InventoryDatabase) -> Self {
        Self { db }
    }

    /// Get one item of an owner.
    pub fn get(&self, owner_id: &str, id: u64) -> StorageResult<Option<StoredItem>> {
        let key = make_item_key(owner_id, id);
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(ITEMS)?;
        match table.get(key.as_slice())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All items of an owner, ascending by id.
    pub fn list_by_owner(&self, owner_id: &str) -> StorageResult<Vec<StoredItem>> {
        let prefix = make_prefix(owner_id);
        let prefix_end = make_prefix_end(owner_id);

        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(ITEMS)?;

        let mut items = Vec::new();
        for entry in table.range(prefix.as_slice()..prefix_end.as_slice())? {
            let (_, value) = entry?;
            items.push(serde_json::from_slice(value.value())?);
        }
        Ok(items)
    }

    /// Number of items an owner has.
    pub fn count_by_owner(&self, owner_id: &str) -> StorageResult<u64> {
        let prefix = make_prefix(owner_id);
        let prefix_end = make_prefix_end(owner_id);

        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(ITEMS)?;

        let mut count = 0u64;
        for entry in table.range(prefix.as_slice()..prefix_end.as_slice())? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// Highest id in use for an owner, if any.
    pub fn max_id(&self, owner_id: &str) -> StorageResult<Option<u64>> {
        let prefix = make_prefix(owner_id);
        let prefix_end = make_prefix_end(owner_id);

        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(ITEMS)?;

        let mut range = table.range(prefix.as_slice()..prefix_end.as_slice())?;
        match range.next_back() {
            Some(entry) => {
                let (key, _) = entry?;
                id_from_key(key.value())
                    .map(Some)
                    .ok_or_else(|| StorageError::Corrupt("item key shorter than id".to_string()))
            }
            None => Ok(None),
        }
    }

    /// Insert only if `(owner_id, id)` is free.
    ///
    /// Check and write happen in one write transaction; a taken key yields
    /// `AlreadyExists` and leaves the existing row untouched.
    pub fn insert_new(&self, item: &StoredItem) -> StorageResult<()> {
        let key = make_item_key(&item.owner_id, item.id);
        let json = serde_json::to_vec(item)?;

        let write_txn = self.db.inner().begin_write()?;
        {
            let mut table = write_txn.open_table(ITEMS)?;
            let taken = table.get(key.as_slice())?.is_some();
            if taken {
                return Err(StorageError::AlreadyExists(format!(
                    "Item {} for owner {}",
                    item.id, item.owner_id
                )));
            }
            table.insert(key.as_slice(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Insert or fully replace `(owner_id, id)`.
    pub fn replace(&self, item: &StoredItem) -> StorageResult<ReplaceOutcome> {
        let key = make_item_key(&item.owner_id, item.id);
        let json = serde_json::to_vec(item)?;

        let write_txn = self.db.inner().begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(ITEMS)?;
            let previous = table.insert(key.as_slice(), json.as_slice())?.is_some();
            if previous {
                ReplaceOutcome::Replaced
            } else {
                ReplaceOutcome::Inserted
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    /// Delete `(owner_id, id)`. Returns whether a row was removed.
    pub fn delete(&self, owner_id: &str, id: u64) -> StorageResult<bool> {
        let key = make_item_key(owner_id, id);

        let write_txn = self.db.inner().begin_write()?;
        let mut table = write_txn.open_table(ITEMS)?;
        let removed = table.remove(key.as_slice())?.is_some();
        drop(table);
        write_txn.commit()?;
        Ok(removed)
    }
}
