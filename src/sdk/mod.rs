// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Policy / Encryption SDK Boundary
//!
//! The application delegates all cryptography and node communication to an
//! external network reached through these traits:
//!
//! - [`CohortDirectory`]: lists service nodes ([`porter::PorterClient`])
//! - [`StrategyDeployer`]: turns a strategy into encrypter/decrypter capabilities
//! - [`Encrypter`]: seals plaintext under a condition set
//! - [`Decrypter`]: retrieves per-node results and decrypts
//!
//! [`local::LocalNetwork`] implements all four in-process for offline runs
//! and tests.

pub mod cohort;
pub mod error;
pub mod local;
pub mod message_kit;
pub mod porter;

use async_trait::async_trait;

use crate::conditions::{ConditionContext, ConditionSet};
use crate::wallet::WalletProvider;

pub use cohort::{Cohort, CohortConfig, DeployedStrategy, Strategy, Ursula};
pub use error::SdkError;
pub use message_kit::{MessageKit, PolicyMessageKit};
pub use porter::PorterClient;

/// Encryption capability of a policy
///
/// The condition set is an explicit argument: an encrypter holds no condition
/// binding of its own, so concurrent callers cannot observe each other's sets.
pub trait Encrypter: Send + Sync {
    fn encrypt_message(
        &self,
        plaintext: &[u8],
        conditions: &ConditionSet,
    ) -> Result<MessageKit, SdkError>;
}

/// Decryption capability of a policy
#[async_trait]
pub trait Decrypter: Send + Sync {
    /// Contact the cohort; one annotated kit is returned per input kit
    async fn retrieve(
        &self,
        message_kits: &[MessageKit],
        context: &ConditionContext,
    ) -> Result<Vec<PolicyMessageKit>, SdkError>;

    fn decrypt(&self, policy_message_kit: &PolicyMessageKit) -> Result<Vec<u8>, SdkError>;
}

#[async_trait]
pub trait CohortDirectory: Send + Sync {
    async fn get_ursulas(&self, quantity: usize) -> Result<Vec<Ursula>, SdkError>;
}

#[async_trait]
pub trait StrategyDeployer: Send + Sync {
    async fn deploy(
        &self,
        strategy: &Strategy,
        label: &str,
        wallet: &dyn WalletProvider,
    ) -> Result<DeployedStrategy, SdkError>;
}
