// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Errors crossing the policy/encryption SDK boundary

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::wallet::WalletError;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Invalid cohort: threshold {threshold} with {shares} shares")]
    InvalidCohort { threshold: usize, shares: usize },

    #[error("Not enough service nodes: requested {requested}, directory returned {available}")]
    NotEnoughNodes { requested: usize, available: usize },

    /// Node directory (Porter) request failed
    #[error("Directory request to {endpoint} failed: {reason}")]
    Directory { endpoint: String, reason: String },

    #[error("Strategy deployment failed: {0}")]
    Deployment(String),

    #[error("Unknown policy: {0}")]
    UnknownPolicy(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// `decrypt` was called on a kit without enough released fragments
    #[error("Message kit is not decryptable: {released} of {threshold} fragments released")]
    NotDecryptable { released: usize, threshold: usize },

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl SdkError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SdkError::InvalidCohort { .. } => "INVALID_COHORT",
            SdkError::NotEnoughNodes { .. } => "NOT_ENOUGH_NODES",
            SdkError::Directory { .. } => "DIRECTORY_FAILED",
            SdkError::Deployment(_) => "DEPLOYMENT_FAILED",
            SdkError::UnknownPolicy(_) => "UNKNOWN_POLICY",
            SdkError::Encryption(_) => "ENCRYPTION_FAILED",
            SdkError::Retrieval(_) => "RETRIEVAL_FAILED",
            SdkError::NotDecryptable { .. } => "NOT_DECRYPTABLE",
            SdkError::Crypto(_) => "CRYPTO_ERROR",
            SdkError::Wallet(e) => e.error_code(),
        }
    }

    /// Network-facing failures worth a manual retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SdkError::Directory { .. } | SdkError::Retrieval(_) | SdkError::Deployment(_)
        )
    }
}
