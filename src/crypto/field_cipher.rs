// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated encryption of individual item fields.
//!
//! Each value is sealed with AES-256-GCM under the process-wide field key and
//! a fresh random nonce. The stored form is
//! `base64(nonce[12] || ciphertext || tag[16])`.
//!
//! Empty strings are passed through unchanged in both directions so that
//! absent optional fields stay empty at rest.
//!
//! Rotating the key makes every previously stored value undecryptable;
//! there is no re-encryption path.

use base64ct::{Base64, Base64Url, Encoding};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};

/// Required key length for AES-256-GCM.
pub const FIELD_KEY_LEN: usize = 32;

const TAG_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("field key must be 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("field key is not valid base64")]
    InvalidKeyEncoding,

    #[error("ciphertext is not valid base64")]
    InvalidEncoding,

    #[error("ciphertext is too short ({0} bytes)")]
    Truncated(usize),

    #[error("ciphertext failed authentication (tampered or foreign key)")]
    Tampered,

    #[error("decrypted field is not valid UTF-8")]
    InvalidUtf8,

    #[error("random nonce generation failed")]
    Rng,

    #[error("encryption failed")]
    Seal,
}

/// Process-wide field cipher. Read-only after construction.
pub struct FieldCipher {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher").finish_non_exhaustive()
    }
}

impl FieldCipher {
    /// Build a cipher from raw key bytes.
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<Self, CipherError> {
        if key_bytes.len() != FIELD_KEY_LEN {
            return Err(CipherError::InvalidKeyLength(key_bytes.len()));
        }
        let unbound = UnboundKey::new(&AES_256_GCM, key_bytes)
            .map_err(|_| CipherError::InvalidKeyLength(key_bytes.len()))?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Build a cipher from a base64 key (standard or URL-safe alphabet).
    pub fn from_base64(encoded: &str) -> Result<Self, CipherError> {
        let trimmed = encoded.trim();
        let bytes = Base64::decode_vec(trimmed)
            .or_else(|_| Base64Url::decode_vec(trimmed))
            .map_err(|_| CipherError::InvalidKeyEncoding)?;
        Self::from_key_bytes(&bytes)
    }

    /// Seal a field value. `""` stays `""`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CipherError::Rng)?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| CipherError::Seal)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(Base64::encode_string(&sealed))
    }

    /// Open a sealed field value. `""` stays `""`.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }

        let sealed = Base64::decode_vec(ciphertext).map_err(|_| CipherError::InvalidEncoding)?;
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Truncated(sealed.len()));
        }

        let (nonce_bytes, body) = sealed.split_at(NONCE_LEN);
        let nonce =
            Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| CipherError::Tampered)?;

        let mut in_out = body.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| CipherError::Tampered)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| CipherError::InvalidUtf8)
    }
}
