// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Inventory
//!
//! Encrypted, owner-scoped item storage.
//!
//! - [`allocator`]: per-owner id allocation (`max + 1`)
//! - [`store`]: list, search, create, update and delete
//! - [`import`]: bulk insertion of spreadsheet rows
//!
//! Ids are unique per owner, not globally. A new item is written with a
//! conditional insert on `(owner_id, id)`; a concurrent writer that took the
//! same id causes one retry with a fresh allocation.

pub mod allocator;
pub mod import;
pub mod store;

pub use allocator::{IdAllocator, MaxIdAllocator};
pub use import::{BulkImporter, DEFAULT_QUANTITY, REQUIRED_COLUMNS};
pub use store::InventoryStore;
