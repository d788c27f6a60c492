// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Cohorts and Strategies
//!
//! A cohort is a group of service nodes plus the number of them that must
//! cooperate. A strategy binds a cohort to an access policy; deploying it
//! yields the encrypter/decrypter pair for that policy.

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;
use url::Url;
use uuid::Uuid;

use super::error::SdkError;
use super::{CohortDirectory, Decrypter, Encrypter, StrategyDeployer};
use crate::wallet::WalletProvider;

/// A service node as listed by the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ursula {
    pub checksum_address: Address,
    pub uri: String,
    pub encrypting_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CohortConfig {
    pub threshold: usize,
    pub shares: usize,
    pub porter_uri: Url,
}

impl CohortConfig {
    pub fn validate(&self) -> Result<(), SdkError> {
        if self.threshold == 0 || self.threshold > self.shares {
            return Err(SdkError::InvalidCohort {
                threshold: self.threshold,
                shares: self.shares,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cohort {
    pub config: CohortConfig,
    pub ursulas: Vec<Ursula>,
}

impl Cohort {
    /// Select `shares` nodes from the directory
    pub async fn create(
        config: CohortConfig,
        directory: &dyn CohortDirectory,
    ) -> Result<Self, SdkError> {
        config.validate()?;
        let ursulas = directory.get_ursulas(config.shares).await?;
        if ursulas.len() < config.shares {
            return Err(SdkError::NotEnoughNodes {
                requested: config.shares,
                available: ursulas.len(),
            });
        }
        info!(
            "Created cohort: {}-of-{} via {}",
            config.threshold, config.shares, config.porter_uri
        );
        Ok(Self { config, ursulas })
    }

    pub fn threshold(&self) -> usize {
        self.config.threshold
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.ursulas.iter().map(|u| u.checksum_address).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub id: Uuid,
    pub cohort: Cohort,
}

impl Strategy {
    pub fn create(cohort: Cohort) -> Self {
        let strategy = Self {
            id: Uuid::new_v4(),
            cohort,
        };
        info!("Created strategy: {}", strategy.id);
        strategy
    }

    /// Deploy the policy with the wallet as publisher
    pub async fn deploy(
        &self,
        label: &str,
        wallet: &dyn WalletProvider,
        deployer: &dyn StrategyDeployer,
    ) -> Result<DeployedStrategy, SdkError> {
        let deployed = deployer.deploy(self, label, wallet).await?;
        info!(
            "Deployed Strategy: '{}' ({}) on chain {}",
            deployed.label, deployed.strategy.id, deployed.chain_id
        );
        Ok(deployed)
    }
}

/// A strategy after deployment; immutable for the rest of the session
#[derive(Clone)]
pub struct DeployedStrategy {
    pub label: String,
    pub strategy: Strategy,
    pub chain_id: u64,
    pub encrypter: Arc<dyn Encrypter>,
    pub decrypter: Arc<dyn Decrypter>,
}

impl fmt::Debug for DeployedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployedStrategy")
            .field("label", &self.label)
            .field("strategy", &self.strategy.id)
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}
