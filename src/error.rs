// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service error taxonomy and its HTTP mapping.
//!
//! Every failure carries an [`ErrorKind`] so callers can branch on the kind
//! rather than on message text:
//!
//! | Kind | HTTP | Retry |
//! |------|------|-------|
//! | `Validation` | 400 | no, fix the input |
//! | `Authentication` | 401 | only with new credentials |
//! | `NotFound` | 404 | no |
//! | `Conflict` | 409 | id conflicts: yes, once |
//! | `Crypto` | 500 | no, data integrity failure |
//! | `Storage` | 503 | yes, transient |

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::crypto::CipherError;
use crate::storage::StorageError;

/// Coarse classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authentication,
    NotFound,
    Conflict,
    Crypto,
    Storage,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Crypto => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Storage => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Errors returned by account and inventory operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("username {0} is already taken")]
    UsernameTaken(String),

    #[error("item {id} not found")]
    ItemNotFound { id: u64 },

    #[error("no items match {0:?}")]
    NoMatchingItems(String),

    #[error("item id {id} was allocated concurrently; retry the request")]
    IdConflict { id: u64 },

    #[error("stored data failed integrity check: {0}")]
    Crypto(#[from] CipherError),

    #[error("storage unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("import stopped at row {failed_row} after inserting {inserted} item(s): {cause}")]
    PartialImport {
        inserted: usize,
        failed_row: usize,
        #[source]
        cause: Box<ServiceError>,
    },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Auth(e) => e.kind(),
            ServiceError::UsernameTaken(_) | ServiceError::IdConflict { .. } => ErrorKind::Conflict,
            ServiceError::ItemNotFound { .. } | ServiceError::NoMatchingItems(_) => {
                ErrorKind::NotFound
            }
            ServiceError::Crypto(_) => ErrorKind::Crypto,
            // A lost insert race that slipped past the retry is still a conflict
            ServiceError::Storage(StorageError::AlreadyExists(_)) => ErrorKind::Conflict,
            ServiceError::Storage(_) => ErrorKind::Storage,
            ServiceError::PartialImport { cause, .. } => cause.kind(),
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::Auth(e) => e.error_code(),
            ServiceError::UsernameTaken(_) => "username_taken",
            ServiceError::ItemNotFound { .. } => "item_not_found",
            ServiceError::NoMatchingItems(_) => "no_matching_items",
            ServiceError::IdConflict { .. } => "id_conflict",
            ServiceError::Crypto(_) => "data_integrity",
            ServiceError::Storage(StorageError::AlreadyExists(_)) => "conflict",
            ServiceError::Storage(_) => "storage_unavailable",
            ServiceError::PartialImport { .. } => "partial_import",
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let kind = err.kind();
        match kind {
            ErrorKind::Crypto => tracing::error!(error = %err, "Data integrity failure"),
            ErrorKind::Storage => tracing::error!(error = %err, "Storage failure"),
            _ => tracing::debug!(error = %err, code = err.error_code(), "Request rejected"),
        }
        Self::new(kind.status_code(), err.error_code(), err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Malformed request body");
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection, "Malformed path parameter");
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection, "Malformed query string");
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
        });
        (self.status, body).into_response()
    }
}
