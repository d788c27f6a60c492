// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Strategy Setup
//!
//! Deployment runs on the deploy chain while conditions are read on the read
//! chain, so the wallet is switched over for the deployment and back after,
//! whether or not deployment succeeded.

use tracing::{info, warn};

use super::error::AppError;
use crate::config::AppConfig;
use crate::sdk::{
    Cohort, CohortConfig, CohortDirectory, DeployedStrategy, Strategy, StrategyDeployer,
};
use crate::wallet::WalletProvider;

impl From<&AppConfig> for CohortConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            threshold: config.threshold,
            shares: config.shares,
            porter_uri: config.porter_uri.clone(),
        }
    }
}

/// Create and deploy a strategy inside the chain-switch bracket
pub async fn deploy_strategy(
    config: &AppConfig,
    wallet: &dyn WalletProvider,
    directory: &dyn CohortDirectory,
    deployer: &dyn StrategyDeployer,
) -> Result<DeployedStrategy, AppError> {
    let deploy_chain = config.deploy_chain.chain_id;
    let read_chain = config.read_chain.chain_id;

    info!("Switching to {} for deployment", config.deploy_chain.name);
    wallet.switch_chain(deploy_chain).await?;

    let result = create_and_deploy(config, wallet, directory, deployer).await;

    if let Err(e) = wallet.switch_chain(read_chain).await {
        warn!(
            "Failed to switch back to {} after deployment: {}",
            config.read_chain.name, e
        );
    }
    result
}

async fn create_and_deploy(
    config: &AppConfig,
    wallet: &dyn WalletProvider,
    directory: &dyn CohortDirectory,
    deployer: &dyn StrategyDeployer,
) -> Result<DeployedStrategy, AppError> {
    let cohort = Cohort::create(CohortConfig::from(config), directory).await?;
    let strategy = Strategy::create(cohort);
    Ok(strategy
        .deploy(&config.strategy_label, wallet, deployer)
        .await?)
}
