// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthError, CredentialManager, TokenService};
use crate::config::{AppConfig, ConfigError};
use crate::crypto::FieldCipher;
use crate::storage::{InventoryDatabase, StorageError};

/// Shared handles for request handlers. Everything here is read-only after
/// startup; the database serializes its own writes.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<InventoryDatabase>,
    pub cipher: Arc<FieldCipher>,
    pub tokens: Arc<TokenService>,
    pub credentials: Arc<CredentialManager>,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to open database: {0}")]
    Storage(#[from] StorageError),

    #[error("failed to initialise password hashing: {0}")]
    Credentials(#[from] AuthError),
}

impl AppState {
    pub fn new(
        db: InventoryDatabase,
        cipher: FieldCipher,
        tokens: TokenService,
        credentials: CredentialManager,
    ) -> Self {
        Self {
            db: Arc::new(db),
            cipher: Arc::new(cipher),
            tokens: Arc::new(tokens),
            credentials: Arc::new(credentials),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let path = config.database_path();
        let db = InventoryDatabase::open(&path)?;
        tracing::info!(path = %path.display(), "Database opened");

        Ok(Self::new(
            db,
            config.field_cipher()?,
            TokenService::new(&config.token_secret, config.token_ttl),
            CredentialManager::new()?,
        ))
    }

    /// State over a throwaway database with fast hashing parameters.
    #[cfg(test)]
    pub fn for_tests() -> (Self, tempfile::TempDir) {
        use crate::auth::password::test_support::fast_credentials;
        use crate::auth::token::test_support::test_tokens;
        use crate::crypto::field_cipher::test_support::test_cipher;
        use crate::storage::database::test_support::temp_db;

        let (db, dir) = temp_db();
        let state = Self::new(db, test_cipher(), test_tokens(), fast_credentials());
        (state, dir)
    }
}
