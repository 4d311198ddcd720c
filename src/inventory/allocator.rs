// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-owner item id allocation.
//!
//! Allocation is a plain read of the current maximum. It is not atomic with
//! the insert that follows; the conditional insert in
//! [`ItemRepository::insert_new`] catches the race and the store retries.

use crate::storage::{InventoryDatabase, ItemRepository, StorageError, StorageResult};

/// Source of candidate ids for new items.
pub trait IdAllocator {
    /// Candidate id for the next item of `owner_id`.
    fn next_id(&self, owner_id: &str) -> StorageResult<u64>;
}

/// `max(id) + 1` within the owner's items, or `1` for an empty inventory.
pub struct MaxIdAllocator<'a> {
    items: ItemRepository<'a>,
}

impl<'a> MaxIdAllocator<'a> {
    pub fn new(db: &'a InventoryDatabase) -> Self {
        Self {
            items: ItemRepository::new(db),
        }
    }
}

impl IdAllocator for MaxIdAllocator<'_> {
    fn next_id(&self, owner_id: &str) -> StorageResult<u64> {
        match self.items.max_id(owner_id)? {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| StorageError::Corrupt(format!("id space exhausted for {owner_id}"))),
            None => Ok(1),
        }
    }
}
