// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request extractors whose rejections use the API error body.
//!
//! axum's stock `Json`, `Path` and `Query` reject with plain text (and 422
//! for a body that parses but does not fit the type). These wrappers turn
//! every such rejection into a `validation_error` with status 400.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path parameters, such as the item id.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
