// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::ErrorKind;

/// Authentication error type.
///
/// Returned by credential checks, token verification and identity
/// resolution, and used directly as the rejection of the `Auth` extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Token is malformed or its signature does not verify
    InvalidToken,
    /// Token has expired
    TokenExpired,
    /// Username/password pair rejected
    InvalidCredentials,
    /// Token verified but the account no longer exists
    UserNotFound(String),
    /// Credential store unreachable during identity resolution
    StorageUnavailable(String),
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidToken => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::UserNotFound(_) => "user_not_found",
            AuthError::StorageUnavailable(_) => "storage_unavailable",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound(_) => ErrorKind::NotFound,
            AuthError::StorageUnavailable(_) => ErrorKind::Storage,
            // Hashing or signing failed; reported as 500 like field crypto
            AuthError::InternalError(_) => ErrorKind::Crypto,
            _ => ErrorKind::Authentication,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AuthError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::InvalidToken => write!(f, "Token is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InvalidCredentials => write!(f, "Incorrect username or password"),
            AuthError::UserNotFound(username) => write!(f, "User {username} not found"),
            AuthError::StorageUnavailable(msg) => write!(f, "Credential store unavailable: {msg}"),
            AuthError::InternalError(msg) => write!(f, "Internal authentication error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
