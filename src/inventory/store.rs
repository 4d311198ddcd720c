// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Owner-scoped, encrypted item operations.
//!
//! Six descriptive fields are sealed with the [`FieldCipher`] before they
//! reach storage and opened again only on the way back to the owner.
//! Barcodes are stored in clear.

use crate::crypto::FieldCipher;
use crate::error::ServiceError;
use crate::models::{InventoryItem, ItemFields};
use crate::storage::{
    InventoryDatabase, ItemRepository, ReplaceOutcome, StorageError, StoredItem,
};

use super::allocator::{IdAllocator, MaxIdAllocator};

/// How many times a lost id race is retried with a fresh id.
pub const MAX_INSERT_RETRIES: usize = 1;

pub struct InventoryStore<'a, A: IdAllocator = MaxIdAllocator<'a>> {
    items: ItemRepository<'a>,
    cipher: &'a FieldCipher,
    allocator: A,
}

impl<'a> InventoryStore<'a> {
    pub fn new(db: &'a InventoryDatabase, cipher: &'a FieldCipher) -> Self {
        Self::with_allocator(db, cipher, MaxIdAllocator::new(db))
    }
}

impl<'a, A: IdAllocator> InventoryStore<'a, A> {
    pub fn with_allocator(db: &'a InventoryDatabase, cipher: &'a FieldCipher, allocator: A) -> Self {
        Self {
            items: ItemRepository::new(db),
            cipher,
            allocator,
        }
    }

    /// All items of the owner, decrypted, ascending by id.
    pub fn list(&self, owner_id: &str) -> Result<Vec<InventoryItem>, ServiceError> {
        self.items
            .list_by_owner(owner_id)?
            .iter()
            .map(|stored| self.open(stored))
            .collect()
    }

    /// Items whose decrypted name contains `query`, ignoring case.
    ///
    /// Ciphertext is randomized, so this is a filter over [`Self::list`].
    pub fn search_by_name(
        &self,
        owner_id: &str,
        query: &str,
    ) -> Result<Vec<InventoryItem>, ServiceError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(ServiceError::Validation("search term must not be empty".to_string()));
        }

        let matches: Vec<InventoryItem> = self
            .list(owner_id)?
            .into_iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .collect();

        if matches.is_empty() {
            return Err(ServiceError::NoMatchingItems(query.to_string()));
        }
        Ok(matches)
    }

    /// Id the next create would currently receive.
    pub fn next_id(&self, owner_id: &str) -> Result<u64, ServiceError> {
        Ok(self.allocator.next_id(owner_id)?)
    }

    pub fn create(&self, owner_id: &str, fields: &ItemFields) -> Result<u64, ServiceError> {
        fields.validate().map_err(ServiceError::Validation)?;
        let id = self.insert_with_retry(owner_id, None, fields)?;
        tracing::info!(owner_id = %owner_id, item_id = id, "Item created");
        Ok(id)
    }

    /// Fully replace `(owner_id, id)`, inserting it if absent.
    pub fn update(
        &self,
        owner_id: &str,
        id: u64,
        fields: &ItemFields,
    ) -> Result<InventoryItem, ServiceError> {
        if id == 0 {
            return Err(ServiceError::Validation("item id must be positive".to_string()));
        }
        fields.validate().map_err(ServiceError::Validation)?;

        let stored = self.seal(owner_id, id, fields)?;
        let outcome = self.items.replace(&stored)?;
        match outcome {
            ReplaceOutcome::Replaced => {
                tracing::info!(owner_id = %owner_id, item_id = id, "Item updated")
            }
            ReplaceOutcome::Inserted => {
                tracing::info!(owner_id = %owner_id, item_id = id, "Item inserted by update")
            }
        }
        self.open(&stored)
    }

    pub fn delete(&self, owner_id: &str, id: u64) -> Result<(), ServiceError> {
        if !self.items.delete(owner_id, id)? {
            return Err(ServiceError::ItemNotFound { id });
        }
        tracing::info!(owner_id = %owner_id, item_id = id, "Item deleted");
        Ok(())
    }

    pub(crate) fn count(&self, owner_id: &str) -> Result<u64, ServiceError> {
        Ok(self.items.count_by_owner(owner_id)?)
    }

    /// Seal `fields` and insert them under `candidate`, or a freshly
    /// allocated id when there is none.
    ///
    /// A taken id is retried with a new allocation up to
    /// [`MAX_INSERT_RETRIES`] times before surfacing as `IdConflict`.
    pub(crate) fn insert_with_retry(
        &self,
        owner_id: &str,
        candidate: Option<u64>,
        fields: &ItemFields,
    ) -> Result<u64, ServiceError> {
        let mut stored = self.seal(owner_id, 0, fields)?;
        let mut id = match candidate {
            Some(id) => id,
            None => self.allocator.next_id(owner_id)?,
        };

        let mut attempt = 0;
        loop {
            stored.id = id;
            match self.items.insert_new(&stored) {
                Ok(()) => return Ok(id),
                Err(StorageError::AlreadyExists(_)) if attempt < MAX_INSERT_RETRIES => {
                    tracing::debug!(owner_id = %owner_id, item_id = id, "Item id taken, reallocating");
                    attempt += 1;
                    id = self.allocator.next_id(owner_id)?;
                }
                Err(StorageError::AlreadyExists(_)) => {
                    tracing::warn!(owner_id = %owner_id, item_id = id, "Item id conflict after retry");
                    return Err(ServiceError::IdConflict { id });
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn seal(&self, owner_id: &str, id: u64, fields: &ItemFields) -> Result<StoredItem, ServiceError> {
        let cipher = self.cipher;
        Ok(StoredItem {
            id,
            owner_id: owner_id.to_string(),
            name: cipher.encrypt(&fields.name)?,
            description: cipher.encrypt(fields.description.as_deref().unwrap_or_default())?,
            quantity: cipher.encrypt(&fields.quantity.as_text())?,
            cabinet: cipher.encrypt(&fields.cabinet)?,
            room: cipher.encrypt(&fields.room)?,
            location: cipher.encrypt(&fields.location)?,
            barcode: fields
                .barcode
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string),
        })
    }

    fn open(&self, stored: &StoredItem) -> Result<InventoryItem, ServiceError> {
        let cipher = self.cipher;
        let description = cipher.decrypt(&stored.description)?;
        Ok(InventoryItem {
            id: stored.id,
            name: cipher.decrypt(&stored.name)?,
            description: (!description.is_empty()).then_some(description),
            quantity: cipher.decrypt(&stored.quantity)?,
            cabinet: cipher.decrypt(&stored.cabinet)?,
            room: cipher.decrypt(&stored.room)?,
            location: cipher.decrypt(&stored.location)?,
            barcode: stored.barcode.clone(),
        })
    }
}
