// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for user credentials and inventory items, backed by an
//! embedded [redb](https://docs.rs/redb) database (pure Rust, ACID).
//!
//! ## Security Model
//!
//! - This layer never sees plaintext item fields: the inventory service seals
//!   them with the field cipher before handing records down
//! - Password hashes are stored as Argon2id PHC strings
//! - Every item key starts with the owner id, so reads and deletes cannot
//!   reach another owner's rows by numeric id alone
//!
//! ## Table Layout
//!
//! ```text
//! users:  username                  → UserRecord (JSON)
//! items:  owner_id | id (u64, BE)   → StoredItem (JSON)
//! ```
//!
//! ## Concurrency
//!
//! redb serializes write transactions. Conditional inserts check for the key
//! and write it inside one write transaction, which is what makes id
//! allocation conflicts detectable instead of silently overwriting rows.

pub mod database;
pub mod items;
pub mod users;

pub use database::{InventoryDatabase, StorageError, StorageResult};
pub use items::{ItemRepository, ReplaceOutcome, StoredItem};
pub use users::{UserRecord, UserRepository};
