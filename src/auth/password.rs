// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing built around Argon2id.
//!
//! Hashes are PHC strings carrying their own salt and parameters, so
//! verification keeps working if the cost parameters are raised later.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;

use super::AuthError;

/// 19 MiB, 3 passes, 1 lane.
const MEMORY_COST_KIB: u32 = 19 * 1024;
const TIME_COST: u32 = 3;
const PARALLELISM: u32 = 1;

/// One-way credential hashing and verification.
#[derive(Clone)]
pub struct CredentialManager {
    argon2: Argon2<'static>,
    /// Hash of a random secret at the same cost, checked when no account matches.
    decoy_hash: String,
}

impl CredentialManager {
    /// Manager with the production cost parameters.
    pub fn new() -> Result<Self, AuthError> {
        Self::with_params(MEMORY_COST_KIB, TIME_COST, PARALLELISM)
    }

    /// Manager with explicit Argon2id costs.
    pub fn with_params(memory_kib: u32, time_cost: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, time_cost, parallelism, None)
            .map_err(|e| AuthError::InternalError(format!("argon2 params: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let decoy_secret = SaltString::generate(&mut OsRng);
        let decoy_hash = argon2
            .hash_password(decoy_secret.as_str().as_bytes(), &SaltString::generate(&mut OsRng))
            .map_err(|e| AuthError::InternalError(format!("decoy hash: {e}")))?
            .to_string();

        Ok(Self { argon2, decoy_hash })
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::InternalError(format!("password hashing failed: {e}")))
    }

    /// Check a password against a stored hash.
    ///
    /// A malformed stored hash counts as a failed check.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend one verification on a password with no matching account.
    ///
    /// Always `false`. Keeps an unknown username as slow as a wrong password.
    pub fn verify_unknown(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.decoy_hash);
        false
    }
}
