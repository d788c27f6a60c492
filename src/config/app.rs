// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Application configuration
//!
//! Loaded from environment variables (a `.env` file is honoured by the
//! binary). Every value has a default so the demo runs with no setup.

use anyhow::{anyhow, Result};
use std::env;
use url::Url;

use super::chains::{ChainConfig, ChainRegistry, GOERLI_CHAIN_ID, MUMBAI_CHAIN_ID};

pub const DEFAULT_PORTER_URI: &str = "https://porter-lynx.nucypher.community";
pub const DEFAULT_STRATEGY_LABEL: &str = "test";
pub const DEFAULT_THRESHOLD: usize = 2;
pub const DEFAULT_SHARES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Chain the wallet stays on and conditions are evaluated against
    pub read_chain: ChainConfig,
    /// Chain strategies are deployed to
    pub deploy_chain: ChainConfig,
    pub porter_uri: Url,
    pub strategy_label: String,
    pub threshold: usize,
    pub shares: usize,
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow!("Invalid value for {}: {}", name, raw)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let registry = ChainRegistry::new();
        let read_chain_id = parse_env("CBD_READ_CHAIN_ID", GOERLI_CHAIN_ID)?;
        let deploy_chain_id = parse_env("CBD_DEPLOY_CHAIN_ID", MUMBAI_CHAIN_ID)?;

        let read_chain = registry
            .get_chain(read_chain_id)
            .cloned()
            .ok_or_else(|| anyhow!("Unsupported read chain: {}", read_chain_id))?;
        let deploy_chain = registry
            .get_chain(deploy_chain_id)
            .cloned()
            .ok_or_else(|| anyhow!("Unsupported deploy chain: {}", deploy_chain_id))?;

        let porter_raw =
            env::var("CBD_PORTER_URI").unwrap_or_else(|_| DEFAULT_PORTER_URI.to_string());
        let porter_uri =
            Url::parse(&porter_raw).map_err(|e| anyhow!("Invalid CBD_PORTER_URI: {}", e))?;

        let config = Self {
            read_chain,
            deploy_chain,
            porter_uri,
            strategy_label: env::var("CBD_STRATEGY_LABEL")
                .unwrap_or_else(|_| DEFAULT_STRATEGY_LABEL.to_string()),
            threshold: parse_env("CBD_THRESHOLD", DEFAULT_THRESHOLD)?,
            shares: parse_env("CBD_SHARES", DEFAULT_SHARES)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold == 0 {
            return Err(anyhow!("Threshold must be at least 1"));
        }
        if self.threshold > self.shares {
            return Err(anyhow!(
                "Threshold {} exceeds shares {}",
                self.threshold,
                self.shares
            ));
        }
        Ok(())
    }

    /// Chains the wallet session has to know about
    pub fn wallet_chains(&self) -> Vec<u64> {
        let mut chains = vec![self.read_chain.chain_id];
        if self.deploy_chain.chain_id != self.read_chain.chain_id {
            chains.push(self.deploy_chain.chain_id);
        }
        chains
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            read_chain: ChainConfig::goerli(),
            deploy_chain: ChainConfig::mumbai(),
            porter_uri: Url::parse(DEFAULT_PORTER_URI).expect("default porter uri is valid"),
            strategy_label: DEFAULT_STRATEGY_LABEL.to_string(),
            threshold: DEFAULT_THRESHOLD,
            shares: DEFAULT_SHARES,
        }
    }
}
