// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Encrypt action

use tracing::info;

use super::error::{AppError, Precondition};
use crate::conditions::ConditionSet;
use crate::sdk::{Encrypter, MessageKit};

/// Whether the encrypt action is offered
pub fn can_encrypt(encrypter: Option<&dyn Encrypter>, conditions: Option<&ConditionSet>) -> bool {
    encrypter.is_some() && conditions.map(|c| !c.is_empty()).unwrap_or(false)
}

/// Seal `plaintext` under `conditions`
///
/// No encrypter call is made unless both an encrypter and a non-empty
/// condition set are present.
pub fn encrypt(
    plaintext: &str,
    conditions: Option<&ConditionSet>,
    encrypter: Option<&dyn Encrypter>,
) -> Result<MessageKit, AppError> {
    let encrypter = encrypter.ok_or(AppError::Precondition(Precondition::NoCapabilities))?;
    let conditions = conditions
        .filter(|c| !c.is_empty())
        .ok_or(AppError::Precondition(Precondition::NoConditions))?;

    info!("Encrypting {} bytes under {}", plaintext.len(), conditions);
    Ok(encrypter.encrypt_message(plaintext.as_bytes(), conditions)?)
}
