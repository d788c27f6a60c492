// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Crypto Primitives
//!
//! Building blocks for the local cohort backend and the condition context:
//!
//! - **Encryption**: XChaCha20-Poly1305 AEAD with the condition set as AAD
//! - **Keys**: per-message key derivation with HKDF-SHA256
//! - **Signature**: secp256k1 signer recovery for `:userAddress` proofs
//!
//! Threshold cryptography belongs to the external network; nothing here
//! splits or reconstructs keys.

pub mod encryption;
pub mod error;
pub mod keys;
pub mod signature;

pub use encryption::{decrypt_with_aead, encrypt_with_aead, random_nonce};
pub use error::CryptoError;
pub use keys::{derive_message_key, random_secret};
pub use signature::recover_signer_address;
