// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Error Types
//!
//! Errors for the sealing and signature primitives used by the local cohort.
//!
//! ## Error Variants
//!
//! - **DecryptionFailed**: AEAD decryption failed (wrong key, corrupted ciphertext, AAD mismatch)
//! - **InvalidSignature**: ECDSA signature recovery failed
//! - **InvalidKey**: key has the wrong size or is malformed
//! - **InvalidNonce**: nonce size validation failed (XChaCha20 requires 24 bytes)
//! - **KeyDerivationFailed**: HKDF expansion failed
//! - **Other**: unexpected library failure

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    DecryptionFailed {
        /// Which operation was being performed
        operation: String,
        /// Specific failure reason
        reason: String,
    },

    InvalidSignature {
        operation: String,
        reason: String,
    },

    InvalidKey {
        /// Type of key that failed (e.g. "message_key")
        key_type: String,
        reason: String,
    },

    InvalidNonce {
        expected_size: usize,
        actual_size: usize,
    },

    KeyDerivationFailed {
        operation: String,
        reason: String,
    },

    Other(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::DecryptionFailed { operation, reason } => {
                write!(f, "Decryption failed during {}: {}", operation, reason)
            }
            CryptoError::InvalidSignature { operation, reason } => {
                write!(f, "Invalid signature during {}: {}", operation, reason)
            }
            CryptoError::InvalidKey { key_type, reason } => {
                write!(f, "Invalid key ({}): {}", key_type, reason)
            }
            CryptoError::InvalidNonce {
                expected_size,
                actual_size,
            } => {
                write!(
                    f,
                    "Invalid nonce size: expected {} bytes, got {} bytes",
                    expected_size, actual_size
                )
            }
            CryptoError::KeyDerivationFailed { operation, reason } => {
                write!(f, "Key derivation failed during {}: {}", operation, reason)
            }
            CryptoError::Other(msg) => write!(f, "Crypto error: {}", msg),
        }
    }
}

impl std::error::Error for CryptoError {}
