// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures used by the REST API. Everything except
//! the raw spreadsheet [`Cell`] derives `ToSchema` for the OpenAPI document.
//!
//! ## Quantity
//!
//! Stock is counted either exactly ("10"), fractionally ("2.5") or
//! qualitatively ("too many"). [`Quantity`] accepts all three shapes and the
//! service always stores and returns its text form.
//!
//! ## Model Categories
//!
//! - **Accounts**: registration, login and token responses
//! - **Items**: item fields, decrypted items and mutation responses
//! - **Import**: tabular rows supplied by a spreadsheet reader

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Account Models
// =============================================================================

/// Username/password pair for registration and login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Response after a successful registration.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
    /// Owner id assigned to the account
    pub user_id: String,
}

/// Bearer token issued at login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

// =============================================================================
// Quantity
// =============================================================================

/// Stock quantity as supplied by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Quantity {
    /// Exact count, e.g. `10`
    Count(i64),
    /// Fractional amount, e.g. `2.5`
    Decimal(f64),
    /// Free text, e.g. `"too many"`
    Text(String),
}

impl Quantity {
    /// Canonical text form stored for this quantity.
    pub fn as_text(&self) -> String {
        match self {
            Quantity::Count(n) => n.to_string(),
            Quantity::Decimal(x) => x.to_string(),
            Quantity::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for Quantity {
    fn from(value: &str) -> Self {
        Quantity::Text(value.to_string())
    }
}

impl From<i64> for Quantity {
    fn from(value: i64) -> Self {
        Quantity::Count(value)
    }
}

// =============================================================================
// Item Models
// =============================================================================

/// Caller-supplied fields of an inventory item.
///
/// Used for both creation and full replacement; there is no partial update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemFields {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: Quantity,
    pub cabinet: String,
    pub room: String,
    pub location: String,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl ItemFields {
    /// Boundary validation shared by create, update and import.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if let Quantity::Decimal(x) = self.quantity {
            if !x.is_finite() {
                return Err("quantity must be a finite number".to_string());
            }
        }
        Ok(())
    }
}

/// Decrypted inventory item as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InventoryItem {
    /// Identifier, unique within the owner's inventory
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Always text, even when a number was supplied
    pub quantity: String,
    pub cabinet: String,
    pub room: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

/// Response after creating an item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateItemResponse {
    pub message: String,
    pub id: u64,
}

/// Response after deleting an item.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteItemResponse {
    pub message: String,
}

/// Next id that a create would currently receive.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NextIdResponse {
    pub next_id: u64,
}

// =============================================================================
// Import Models
// =============================================================================

/// A spreadsheet cell after extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Number(f64),
    Text(String),
    /// Missing / NaN cell
    Empty,
}

impl Cell {
    /// Text form of the cell, `None` when it is empty or blank.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Integer(n) => Some(n.to_string()),
            Cell::Number(x) if x.is_finite() => Some(x.to_string()),
            Cell::Number(_) | Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

/// Rows of a spreadsheet with named columns.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportBatch {
    /// Header row, in sheet order
    pub columns: Vec<String>,
    /// One map per data row, keyed by column name
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<BTreeMap<String, Cell>>,
}

/// Response after a complete import.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    pub message: String,
    pub inserted: usize,
}
