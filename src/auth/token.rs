// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a shared secret. They are stateless:
//! nothing is persisted, and a token stops working once `exp` has passed or
//! once the account it names has been removed.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::{AuthError, SessionClaims};
use crate::storage::{InventoryDatabase, UserRecord, UserRepository};

/// Default session lifetime.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// A freshly issued token together with its absolute expiry.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
    pub expires_in: i64,
}

/// Issues and verifies signed session tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Build a service from the signing secret and default lifetime.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; no clock-skew grace period.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a token for `subject` with the default lifetime.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        self.issue_with_ttl(subject, self.ttl)
    }

    /// Issue a token for `subject` expiring `ttl` from now.
    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = (now + ttl).timestamp();
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(format!("token signing failed: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: ttl.num_seconds(),
        })
    }

    /// Verify signature and expiry, returning the claims.
    ///
    /// The signature is checked before any claim is trusted.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            },
        )?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(data.claims)
    }

    /// Look up the account a verified subject refers to.
    ///
    /// A valid signature alone does not grant access: the account must still
    /// exist.
    pub fn resolve_identity(
        &self,
        db: &InventoryDatabase,
        subject: &str,
    ) -> Result<UserRecord, AuthError> {
        UserRepository::new(db)
            .find_by_username(subject)
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?
            .ok_or_else(|| AuthError::UserNotFound(subject.to_string()))
    }
}
