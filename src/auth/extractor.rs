// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user.user_id scopes every inventory operation
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Verifies the bearer token from the `Authorization` header, then resolves
/// its subject to an existing account. Both steps must pass.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(AuthError::InvalidAuthHeader)?
            .trim();

        let claims = state.tokens.verify(token)?;
        let record = state.tokens.resolve_identity(&state.db, &claims.sub)?;

        let user = AuthenticatedUser::from_record(&record, &claims);
        tracing::debug!(
            user_id = %user.user_id,
            expires_at = user.expires_at,
            "Request authenticated"
        );
        Ok(Auth(user))
    }
}
