// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Local accounts with Argon2id password hashes and HS256 session tokens.
//!
//! ## Auth Flow
//!
//! 1. Client registers with `POST /v1/auth/register`
//! 2. Client logs in with `POST /v1/auth/token` and receives a bearer token
//! 3. Client sends `Authorization: Bearer <token>` on every inventory call
//! 4. Server:
//!    - Verifies signature and expiry (no leeway)
//!    - Resolves `sub` to an existing account
//!    - Scopes the request to that account's owner id
//!
//! ## Security
//!
//! - Passwords are never stored or logged in recoverable form
//! - Tokens are stateless; default lifetime is 30 minutes
//! - A token for a deleted account is rejected even if its signature is valid

pub mod accounts;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod token;

pub use accounts::AccountService;
pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use password::CredentialManager;
pub use token::{IssuedToken, TokenService, DEFAULT_TOKEN_TTL_MINUTES};
