// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! ECDSA Signature Recovery
//!
//! Recovers the Ethereum address that signed a message hash. Service nodes
//! use this to check the `:userAddress` proof attached to a condition context.

use ethers::types::Address;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use tiny_keccak::{Hasher, Keccak};

use super::error::CryptoError;

/// Recover the signer's Ethereum address from a 65-byte `r || s || v` signature
///
/// Accepts both raw (0/1) and Ethereum-style (27/28) recovery ids.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidSignature`] if the signature or hash has the
/// wrong size, the recovery id is out of range, or recovery fails.
pub fn recover_signer_address(signature: &[u8], message_hash: &[u8]) -> Result<Address, CryptoError> {
    let invalid = |reason: String| CryptoError::InvalidSignature {
        operation: "user_address_proof".to_string(),
        reason,
    };

    if signature.len() != 65 {
        return Err(invalid(format!(
            "expected 65 bytes, got {}",
            signature.len()
        )));
    }
    if message_hash.len() != 32 {
        return Err(invalid(format!(
            "message hash must be 32 bytes, got {}",
            message_hash.len()
        )));
    }

    let mut recovery_id = signature[64];
    if recovery_id >= 27 {
        recovery_id -= 27;
    }
    if recovery_id > 3 {
        return Err(invalid(format!("recovery id {} out of range", recovery_id)));
    }

    let recovery_id = RecoveryId::try_from(recovery_id).map_err(|e| invalid(e.to_string()))?;
    let signature = Signature::try_from(&signature[..64]).map_err(|e| invalid(e.to_string()))?;
    let verifying_key = VerifyingKey::recover_from_prehash(message_hash, &signature, recovery_id)
        .map_err(|e| invalid(e.to_string()))?;

    // Address = last 20 bytes of keccak256(uncompressed pubkey without 0x04 prefix)
    let public_key = verifying_key.to_encoded_point(false);
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];
    hasher.update(&public_key.as_bytes()[1..]);
    hasher.finalize(&mut hash);

    Ok(Address::from_slice(&hash[12..]))
}
