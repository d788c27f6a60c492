// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const GOERLI_CHAIN_ID: u64 = 5;
pub const MUMBAI_CHAIN_ID: u64 = 80001;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub native_token: TokenInfo,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
}

impl ChainConfig {
    /// Read chain: conditions are evaluated here
    pub fn goerli() -> Self {
        ChainConfig {
            chain_id: GOERLI_CHAIN_ID,
            name: "Goerli".to_string(),
            rpc_url: std::env::var("GOERLI_RPC_URL")
                .unwrap_or_else(|_| "https://rpc.ankr.com/eth_goerli".to_string()),
            native_token: TokenInfo {
                symbol: "ETH".to_string(),
                decimals: 18,
            },
        }
    }

    /// Policy chain: strategies are deployed here
    pub fn mumbai() -> Self {
        ChainConfig {
            chain_id: MUMBAI_CHAIN_ID,
            name: "Polygon Mumbai".to_string(),
            rpc_url: std::env::var("MUMBAI_RPC_URL")
                .unwrap_or_else(|_| "https://rpc-mumbai.maticvigil.com".to_string()),
            native_token: TokenInfo {
                symbol: "MATIC".to_string(),
                decimals: 18,
            },
        }
    }
}

pub struct ChainRegistry {
    chains: HashMap<u64, ChainConfig>,
    default_chain: u64,
}

impl ChainRegistry {
    pub fn new() -> Self {
        let mut chains = HashMap::new();
        chains.insert(GOERLI_CHAIN_ID, ChainConfig::goerli());
        chains.insert(MUMBAI_CHAIN_ID, ChainConfig::mumbai());

        ChainRegistry {
            chains,
            default_chain: GOERLI_CHAIN_ID,
        }
    }

    pub fn get_chain(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.get(&chain_id)
    }

    pub fn default_chain(&self) -> u64 {
        self.default_chain
    }

    pub fn list_supported_chains(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.chains.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_chain_supported(&self, chain_id: u64) -> bool {
        self.chains.contains_key(&chain_id)
    }

    /// Register an extra chain, e.g. a local devnet
    pub fn add_chain(&mut self, config: ChainConfig) {
        self.chains.insert(config.chain_id, config);
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}
