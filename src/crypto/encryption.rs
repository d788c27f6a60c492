// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! XChaCha20-Poly1305 Sealing
//!
//! Authenticated encryption for message kits produced by the local cohort.
//! The condition set JSON is passed as AAD so a ciphertext cannot be
//! re-bound to a weaker policy without failing authentication.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::{rngs::OsRng, RngCore};

use super::error::CryptoError;

pub const NONCE_SIZE: usize = 24;
pub const KEY_SIZE: usize = 32;

/// Fresh random 24-byte nonce
pub fn random_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt data using XChaCha20-Poly1305 AEAD
///
/// # Arguments
///
/// * `plaintext` - Data to encrypt
/// * `nonce` - 24-byte nonce (must be unique for this key)
/// * `aad` - Additional authenticated data
/// * `key` - 32-byte encryption key
///
/// # Returns
///
/// Ciphertext with the 16-byte authentication tag appended
pub fn encrypt_with_aead(
    plaintext: &[u8],
    nonce: &[u8],
    aad: &[u8],
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(nonce, key)?;
    cipher
        .encrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CryptoError::Other(format!("Encryption failed: {}", e)))
}

/// Decrypt data using XChaCha20-Poly1305 AEAD
///
/// # Errors
///
/// Returns [`CryptoError::DecryptionFailed`] if the tag does not verify
/// (tampered ciphertext, wrong key or different AAD).
pub fn decrypt_with_aead(
    ciphertext: &[u8],
    nonce: &[u8],
    aad: &[u8],
    key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(nonce, key)?;
    cipher
        .decrypt(
            XNonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|e| CryptoError::DecryptionFailed {
            operation: "message_kit".to_string(),
            reason: format!("authentication error: {}", e),
        })
}

fn cipher_for(nonce: &[u8], key: &[u8]) -> Result<XChaCha20Poly1305, CryptoError> {
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::InvalidNonce {
            expected_size: NONCE_SIZE,
            actual_size: nonce.len(),
        });
    }
    if key.len() != KEY_SIZE {
        return Err(CryptoError::InvalidKey {
            key_type: "message_key".to_string(),
            reason: format!("expected {} bytes, got {}", KEY_SIZE, key.len()),
        });
    }
    XChaCha20Poly1305::new_from_slice(key).map_err(|e| CryptoError::InvalidKey {
        key_type: "message_key".to_string(),
        reason: e.to_string(),
    })
}
