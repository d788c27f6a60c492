// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Policy Key Derivation
//!
//! Each deployed policy holds one 32-byte secret; every message kit gets its
//! own key derived with HKDF-SHA256 from that secret and a per-message salt.

use hkdf::Hkdf;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

use super::error::CryptoError;

const MESSAGE_KEY_INFO: &[u8] = b"cbd-demo/message-kit/v1";

pub fn random_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    OsRng.fill_bytes(&mut secret);
    secret
}

/// Derive the key sealing a single message kit
pub fn derive_message_key(policy_secret: &[u8; 32], salt: &[u8]) -> Result<[u8; 32], CryptoError> {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), policy_secret);
    let mut key = [0u8; 32];
    hkdf.expand(MESSAGE_KEY_INFO, &mut key)
        .map_err(|e| CryptoError::KeyDerivationFailed {
            operation: "message_key".to_string(),
            reason: e.to_string(),
        })?;
    Ok(key)
}
