// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Application-level errors

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::conditions::ConditionError;
use crate::sdk::SdkError;
use crate::wallet::WalletError;

/// Why an action is currently unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    WalletNotConnected,
    /// No encrypter/decrypter yet (strategy not deployed)
    NoCapabilities,
    NoConditions,
    NoMessageKit,
    StrategyAlreadyDeployed,
    /// Deployment requested while capabilities were provisioned directly
    DirectProvisioning,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Precondition::WalletNotConnected => "wallet is not connected",
            Precondition::NoCapabilities => "no encrypter or decrypter is available",
            Precondition::NoConditions => "no conditions have been added",
            Precondition::NoMessageKit => "nothing has been encrypted yet",
            Precondition::StrategyAlreadyDeployed => "a strategy is already deployed",
            Precondition::DirectProvisioning => "capabilities are provisioned directly",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error("Action unavailable: {0}")]
    Precondition(Precondition),

    #[error("Decryption of message kit {0} is already in progress")]
    DecryptInFlight(Uuid),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Condition(e) => e.error_code(),
            AppError::Wallet(e) => e.error_code(),
            AppError::Sdk(e) => e.error_code(),
            AppError::Precondition(_) => "PRECONDITION_FAILED",
            AppError::DecryptInFlight(_) => "DECRYPT_IN_FLIGHT",
        }
    }
}

/// Last failure as kept in the session state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub code: &'static str,
    pub message: String,
}

impl From<&AppError> for ErrorRecord {
    fn from(error: &AppError) -> Self {
        Self {
            code: error.error_code(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pass_through_layers() {
        let err: AppError = WalletError::NotConnected.into();
        assert_eq!(err.error_code(), "WALLET_NOT_CONNECTED");

        let err: AppError = ConditionError::EmptySet.into();
        assert_eq!(ErrorRecord::from(&err).code, err.error_code());

        let err = AppError::Precondition(Precondition::NoConditions);
        assert_eq!(err.to_string(), "Action unavailable: no conditions have been added");
    }
}
