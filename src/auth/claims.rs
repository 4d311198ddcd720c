// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::UserRecord;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject: the username the token was issued to
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Authenticated user information resolved from a verified token.
///
/// This is the primary type handlers use to scope inventory access.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Owner id that scopes inventory items
    pub user_id: String,

    /// Login name (token subject)
    pub username: String,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Combine verified claims with the account they refer to.
    pub fn from_record(record: &UserRecord, claims: &SessionClaims) -> Self {
        Self {
            user_id: record.user_id.clone(),
            username: record.username.clone(),
            expires_at: claims.exp,
        }
    }
}
