// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Field-level encryption for inventory data at rest.

pub mod field_cipher;

pub use field_cipher::{CipherError, FieldCipher, FIELD_KEY_LEN};
