// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Glassify - Encrypted Lab Inventory Service
//!
//! Multi-user inventory of lab equipment. Each user sees only their own
//! items, and the descriptive fields of every item are encrypted at rest.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Accounts, password hashing and session tokens
//! - `crypto` - Field-level AES-256-GCM encryption
//! - `inventory` - Item store, id allocation and bulk import
//! - `storage` - Embedded database (redb)

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod inventory;
pub mod models;
pub mod state;
pub mod storage;
