// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chain Readers
//!
//! The on-chain lookups a service node performs while evaluating conditions.
//! [`StaticChainReader`] answers from fixed tables; [`ProviderChainReader`]
//! queries live JSON-RPC endpoints through `ethers`.

use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{Http, Provider};
use ethers::types::{Address, BlockNumber, U256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::conditions::ConditionError;
use crate::config::ChainRegistry;

abigen!(
    StandardToken,
    r#"[
        function balanceOf(address owner) external view returns (uint256)
        function ownerOf(uint256 tokenId) external view returns (address)
    ]"#
);

#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Timestamp of the latest block
    async fn block_timestamp(&self, chain: u64) -> Result<u64, ConditionError>;

    async fn native_balance(&self, chain: u64, holder: Address) -> Result<U256, ConditionError>;

    /// `balanceOf(holder)` on an ERC20 or ERC721 contract
    async fn token_balance(
        &self,
        chain: u64,
        contract: Address,
        holder: Address,
    ) -> Result<U256, ConditionError>;

    /// `ownerOf(tokenId)` on an ERC721 contract
    async fn token_owner(
        &self,
        chain: u64,
        contract: Address,
        token_id: U256,
    ) -> Result<Address, ConditionError>;
}

/// Fixed answers, identical on every chain
///
/// Unset balances read as zero; unknown tokens fail like a reverted call.
#[derive(Debug, Clone, Default)]
pub struct StaticChainReader {
    timestamp: Option<u64>,
    balances: HashMap<Address, U256>,
    token_balances: HashMap<(Address, Address), U256>,
    token_owners: HashMap<(Address, U256), Address>,
}

impl StaticChainReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the block timestamp; unpinned readers report the wall clock
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_balance(mut self, holder: Address, balance: U256) -> Self {
        self.balances.insert(holder, balance);
        self
    }

    pub fn with_token_balance(mut self, contract: Address, holder: Address, balance: U256) -> Self {
        self.token_balances.insert((contract, holder), balance);
        self
    }

    pub fn with_token_owner(mut self, contract: Address, token_id: U256, owner: Address) -> Self {
        self.token_owners.insert((contract, token_id), owner);
        self
    }
}

#[async_trait]
impl ChainReader for StaticChainReader {
    async fn block_timestamp(&self, _chain: u64) -> Result<u64, ConditionError> {
        Ok(self
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64))
    }

    async fn native_balance(&self, _chain: u64, holder: Address) -> Result<U256, ConditionError> {
        Ok(self.balances.get(&holder).copied().unwrap_or_default())
    }

    async fn token_balance(
        &self,
        _chain: u64,
        contract: Address,
        holder: Address,
    ) -> Result<U256, ConditionError> {
        Ok(self
            .token_balances
            .get(&(contract, holder))
            .copied()
            .unwrap_or_default())
    }

    async fn token_owner(
        &self,
        _chain: u64,
        contract: Address,
        token_id: U256,
    ) -> Result<Address, ConditionError> {
        self.token_owners
            .get(&(contract, token_id))
            .copied()
            .ok_or_else(|| {
                ConditionError::Evaluation(format!(
                    "ownerOf({}) reverted: nonexistent token",
                    token_id
                ))
            })
    }
}

/// Reads through one HTTP provider per configured chain
pub struct ProviderChainReader {
    providers: HashMap<u64, Arc<Provider<Http>>>,
}

impl ProviderChainReader {
    pub fn new(registry: &ChainRegistry) -> anyhow::Result<Self> {
        let mut providers = HashMap::new();
        for chain_id in registry.list_supported_chains() {
            if let Some(chain) = registry.get_chain(chain_id) {
                let provider = Provider::<Http>::try_from(chain.rpc_url.as_str()).map_err(|e| {
                    anyhow::anyhow!("Failed to create provider for chain {}: {}", chain_id, e)
                })?;
                providers.insert(chain_id, Arc::new(provider));
            }
        }
        Ok(Self { providers })
    }

    fn provider(&self, chain: u64) -> Result<Arc<Provider<Http>>, ConditionError> {
        self.providers
            .get(&chain)
            .cloned()
            .ok_or_else(|| ConditionError::Evaluation(format!("no RPC endpoint for chain {}", chain)))
    }
}

fn rpc_error(call: &str, err: impl std::fmt::Display) -> ConditionError {
    ConditionError::Evaluation(format!("{} failed: {}", call, err))
}

#[async_trait]
impl ChainReader for ProviderChainReader {
    async fn block_timestamp(&self, chain: u64) -> Result<u64, ConditionError> {
        let block = self
            .provider(chain)?
            .get_block(BlockNumber::Latest)
            .await
            .map_err(|e| rpc_error("eth_getBlockByNumber", e))?
            .ok_or_else(|| ConditionError::Evaluation("latest block unavailable".to_string()))?;
        Ok(block.timestamp.as_u64())
    }

    async fn native_balance(&self, chain: u64, holder: Address) -> Result<U256, ConditionError> {
        debug!("eth_getBalance({:?}) on chain {}", holder, chain);
        self.provider(chain)?
            .get_balance(holder, None)
            .await
            .map_err(|e| rpc_error("eth_getBalance", e))
    }

    async fn token_balance(
        &self,
        chain: u64,
        contract: Address,
        holder: Address,
    ) -> Result<U256, ConditionError> {
        let token = StandardToken::new(contract, self.provider(chain)?);
        token
            .balance_of(holder)
            .call()
            .await
            .map_err(|e| rpc_error("balanceOf", e))
    }

    async fn token_owner(
        &self,
        chain: u64,
        contract: Address,
        token_id: U256,
    ) -> Result<Address, ConditionError> {
        let token = StandardToken::new(contract, self.provider(chain)?);
        token
            .owner_of(token_id)
            .call()
            .await
            .map_err(|e| rpc_error("ownerOf", e))
    }
}
