// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login.

use super::{AuthError, CredentialManager, IssuedToken, TokenService};
use crate::error::ServiceError;
use crate::storage::{InventoryDatabase, StorageError, UserRecord, UserRepository};

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 64;

/// Account operations over the credential store.
pub struct AccountService<'a> {
    users: UserRepository<'a>,
    credentials: &'a CredentialManager,
    tokens: &'a TokenService,
}

impl<'a> AccountService<'a> {
    pub fn new(
        db: &'a InventoryDatabase,
        credentials: &'a CredentialManager,
        tokens: &'a TokenService,
    ) -> Self {
        Self {
            users: UserRepository::new(db),
            credentials,
            tokens,
        }
    }

    /// Register a new account. Fails with `UsernameTaken` on a duplicate.
    pub fn register(&self, username: &str, password: &str) -> Result<UserRecord, ServiceError> {
        validate_username(username)?;
        if password.is_empty() {
            return Err(ServiceError::Validation("password must not be empty".to_string()));
        }

        let hash = self.credentials.hash(password)?;
        let record = UserRecord::new(username, hash);

        match self.users.create(&record) {
            Ok(()) => {
                tracing::info!(user_id = %record.user_id, username = %username, "User registered");
                Ok(record)
            }
            Err(StorageError::AlreadyExists(_)) => {
                tracing::info!(username = %username, "Registration rejected: username taken");
                Err(ServiceError::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, ServiceError> {
        let user = self.users.find_by_username(username)?;

        let verified = match &user {
            Some(user) => self.credentials.verify(password, &user.password_hash),
            None => self.credentials.verify_unknown(password),
        };

        if !verified {
            tracing::info!(username = %username, "Login failed");
            return Err(AuthError::InvalidCredentials.into());
        }

        let issued = self.tokens.issue(username)?;
        tracing::info!(username = %username, expires_at = issued.expires_at, "Session token issued");
        Ok(issued)
    }
}

fn validate_username(username: &str) -> Result<(), ServiceError> {
    if username.trim().is_empty() {
        return Err(ServiceError::Validation("username must not be empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(ServiceError::Validation(format!(
            "username must be at most {MAX_USERNAME_LEN} bytes"
        )));
    }
    if username.chars().any(char::is_control) {
        return Err(ServiceError::Validation(
            "username must not contain control characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::test_support::fast_credentials;
    use crate::auth::token::test_support::test_tokens;
    use crate::error::ErrorKind;
    use crate::storage::database::test_support::temp_db;

    #[test]
    fn register_stores_hash_not_password() {
        let (db, _dir) = temp_db();
        let (credentials, tokens) = (fast_credentials(), test_tokens());
        let accounts = AccountService::new(&db, &credentials, &tokens);

        let record = accounts.register("alice", "pw1").unwrap();
        assert_ne!(record.password_hash, "pw1");

        let stored = UserRepository::new(&db).find_by_username("alice").unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw1");
        assert!(credentials.verify("pw1", &stored.password_hash));
    }

    #[test]
    fn duplicate_registration_conflicts() {
        let (db, _dir) = temp_db();
        let (credentials, tokens) = (fast_credentials(), test_tokens());
        let accounts = AccountService::new(&db, &credentials, &tokens);

        accounts.register("alice", "pw1").unwrap();
        let err = accounts.register("alice", "pw2").unwrap_err();
        assert!(matches!(err, ServiceError::UsernameTaken(_)));
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn login_checks_password() {
        let (db, _dir) = temp_db();
        let (credentials, tokens) = (fast_credentials(), test_tokens());
        let accounts = AccountService::new(&db, &credentials, &tokens);
        accounts.register("alice", "pw1").unwrap();

        let err = accounts.login("alice", "wrong").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);

        let issued = accounts.login("alice", "pw1").unwrap();
        assert_eq!(tokens.verify(&issued.token).unwrap().sub, "alice");
    }

    #[test]
    fn login_for_unknown_user_looks_like_bad_password() {
        let (db, _dir) = temp_db();
        let (credentials, tokens) = (fast_credentials(), test_tokens());
        let accounts = AccountService::new(&db, &credentials, &tokens);

        let err = accounts.login("nobody", "pw1").unwrap_err();
        assert!(matches!(err, ServiceError::Auth(AuthError::InvalidCredentials)));
    }

    #[test]
    fn register_validates_input() {
        let (db, _dir) = temp_db();
        let (credentials, tokens) = (fast_credentials(), test_tokens());
        let accounts = AccountService::new(&db, &credentials, &tokens);

        for (username, password) in [("", "pw"), ("   ", "pw"), ("bob", ""), ("a\nb", "pw")] {
            let err = accounts.register(username, password).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "{username:?}/{password:?}");
        }
        let long = "x".repeat(MAX_USERNAME_LEN + 1);
        assert!(matches!(accounts.register(&long, "pw"), Err(ServiceError::Validation(_))));
    }
}
