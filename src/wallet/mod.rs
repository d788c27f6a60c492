// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Wallet Session
//!
//! The browser-wallet boundary: connect/disconnect, current account, current
//! chain, chain switching and message signing. The application only consumes
//! this interface; [`LocalWalletSession`] is an in-process implementation
//! backed by an `ethers` local signer.

pub mod local;

use async_trait::async_trait;
use ethers::types::{Address, Signature};
use thiserror::Error;

pub use local::LocalWalletSession;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet is not connected")]
    NotConnected,

    /// The user declined the request in the wallet
    #[error("Request rejected by wallet: {0}")]
    Rejected(String),

    #[error("Chain {0} is not configured in the wallet")]
    UnsupportedChain(u64),

    #[error("Failed to switch to chain {chain_id}: {reason}")]
    ChainSwitchFailed { chain_id: u64, reason: String },

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid wallet key: {0}")]
    InvalidKey(String),
}

impl WalletError {
    pub fn error_code(&self) -> &'static str {
        match self {
            WalletError::NotConnected => "WALLET_NOT_CONNECTED",
            WalletError::Rejected(_) => "WALLET_REJECTED",
            WalletError::UnsupportedChain(_) => "UNSUPPORTED_CHAIN",
            WalletError::ChainSwitchFailed { .. } => "CHAIN_SWITCH_FAILED",
            WalletError::Signing(_) => "SIGNING_FAILED",
            WalletError::InvalidKey(_) => "INVALID_WALLET_KEY",
        }
    }
}

/// Wallet provider consumed by the application
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Connect the wallet and return the active account
    async fn activate(&self) -> Result<Address, WalletError>;

    async fn deactivate(&self);

    /// Active account, `None` while disconnected
    async fn account(&self) -> Option<Address>;

    async fn chain_id(&self) -> Result<u64, WalletError>;

    /// Ask the wallet to make `chain_id` the active chain
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// EIP-191 personal-message signature by the active account
    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError>;
}
