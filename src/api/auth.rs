// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints: registration and token issuance.

use axum::{extract::State, http::StatusCode, Json};

use super::extract::ApiJson;
use crate::{
    auth::AccountService,
    error::ApiError,
    models::{CredentialsRequest, RegisterResponse, TokenResponse},
    state::AppState,
};

/// Register a new account.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid username or password"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let accounts = AccountService::new(&state.db, &state.credentials, &state.tokens);
    let record = accounts.register(&request.username, &request.password)?;

    let response = RegisterResponse {
        message: "User registered successfully".to_string(),
        user_id: record.user_id,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Exchange a username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/v1/auth/token",
    tag = "Auth",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let accounts = AccountService::new(&state.db, &state.credentials, &state.tokens);
    let issued = accounts.login(&request.username, &request.password)?;

    Ok(Json(TokenResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
    }))
}
