// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`AppConfig`] loaded from
//! them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding `inventory.redb` | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TOKEN_SECRET` | HS256 signing secret, at least 32 bytes | Required |
//! | `FIELD_ENCRYPTION_KEY` | Base64 of the 32-byte field key | Required |
//! | `TOKEN_TTL_MINUTES` | Session token lifetime | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::auth::DEFAULT_TOKEN_TTL_MINUTES;
use crate::crypto::{CipherError, FieldCipher};

/// Directory holding the database file.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Database file name inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "inventory.redb";

pub const HOST_ENV: &str = "HOST";
pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// HS256 signing secret for session tokens.
///
/// Never logged. Changing it invalidates every outstanding token.
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";

/// Shortest accepted token secret, in bytes.
pub const MIN_TOKEN_SECRET_LEN: usize = 32;

/// Base64-encoded AES-256 key for item fields.
///
/// Rotating it makes existing items undecryptable.
pub const FIELD_KEY_ENV: &str = "FIELD_ENCRYPTION_KEY";

pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_MINUTES";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("FIELD_ENCRYPTION_KEY is invalid: {0}")]
    FieldKey(#[from] CipherError),
}

/// Settings read once at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub bind_addr: SocketAddr,
    pub token_secret: Vec<u8>,
    /// Base64 as supplied; decoded by [`AppConfig::field_cipher`]
    pub field_key: String,
    pub token_ttl: chrono::Duration,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("data_dir", &self.data_dir)
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = PathBuf::from(
            lookup(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let token_secret = lookup(TOKEN_SECRET_ENV)
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing(TOKEN_SECRET_ENV))?
            .into_bytes();
        if token_secret.len() < MIN_TOKEN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: TOKEN_SECRET_ENV,
                reason: format!("must be at least {MIN_TOKEN_SECRET_LEN} bytes"),
            });
        }

        let field_key = lookup(FIELD_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing(FIELD_KEY_ENV))?;
        // Fail at startup rather than on the first request
        FieldCipher::from_base64(&field_key)?;

        let token_ttl = match lookup(TOKEN_TTL_ENV) {
            Some(raw) => {
                let minutes = raw.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                    name: TOKEN_TTL_ENV,
                    reason: e.to_string(),
                })?;
                if minutes <= 0 {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_ENV,
                        reason: "must be positive".to_string(),
                    });
                }
                chrono::Duration::minutes(minutes)
            }
            None => chrono::Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        };

        Ok(Self {
            data_dir,
            bind_addr,
            token_secret,
            field_key,
            token_ttl,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn field_cipher(&self) -> Result<FieldCipher, ConfigError> {
        Ok(FieldCipher::from_base64(&self.field_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const KEY_B64: &str = "BwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwcHBwc=";
    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_apply_with_required_values() {
        let config = load(&[(TOKEN_SECRET_ENV, SECRET), (FIELD_KEY_ENV, KEY_B64)]).unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.database_path(), PathBuf::from("./data/inventory.redb"));
        assert_eq!(config.token_ttl, chrono::Duration::minutes(30));
        assert!(config.field_cipher().is_ok());
    }

    #[test]
    fn overrides_are_read() {
        let config = load(&[
            (TOKEN_SECRET_ENV, SECRET),
            (FIELD_KEY_ENV, KEY_B64),
            (DATA_DIR_ENV, "/var/lib/glassify"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (TOKEN_TTL_ENV, "5"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/glassify/inventory.redb")
        );
        assert_eq!(config.token_ttl, chrono::Duration::minutes(5));
    }

    #[test]
    fn required_values_are_enforced() {
        assert!(matches!(
            load(&[(FIELD_KEY_ENV, KEY_B64)]),
            Err(ConfigError::Missing(TOKEN_SECRET_ENV))
        ));
        assert!(matches!(
            load(&[(TOKEN_SECRET_ENV, SECRET)]),
            Err(ConfigError::Missing(FIELD_KEY_ENV))
        ));
    }

    #[test]
    fn weak_or_malformed_values_are_rejected() {
        assert!(matches!(
            load(&[(TOKEN_SECRET_ENV, "short"), (FIELD_KEY_ENV, KEY_B64)]),
            Err(ConfigError::Invalid { name: TOKEN_SECRET_ENV, .. })
        ));
        assert!(matches!(
            load(&[(TOKEN_SECRET_ENV, SECRET), (FIELD_KEY_ENV, "c2hvcnQ=")]),
            Err(ConfigError::FieldKey(CipherError::InvalidKeyLength(5)))
        ));
        assert!(matches!(
            load(&[(TOKEN_SECRET_ENV, SECRET), (FIELD_KEY_ENV, KEY_B64), (PORT_ENV, "http")]),
            Err(ConfigError::Invalid { name: PORT_ENV, .. })
        ));
        assert!(matches!(
            load(&[(TOKEN_SECRET_ENV, SECRET), (FIELD_KEY_ENV, KEY_B64), (TOKEN_TTL_ENV, "0")]),
            Err(ConfigError::Invalid { name: TOKEN_TTL_ENV, .. })
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = load(&[(TOKEN_SECRET_ENV, SECRET), (FIELD_KEY_ENV, KEY_B64)]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(SECRET));
        assert!(!rendered.contains(KEY_B64));
    }
}
