// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-process wallet session backed by an `ethers` [`LocalWallet`]

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Signature};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::{WalletError, WalletProvider};

#[derive(Debug)]
struct SessionState {
    connected: bool,
    chain_id: u64,
}

/// Wallet session holding a local signing key
///
/// Chain switching is limited to the chains the session was configured with,
/// mirroring a browser wallet that only knows a fixed set of networks.
#[derive(Clone)]
pub struct LocalWalletSession {
    wallet: LocalWallet,
    supported_chains: Vec<u64>,
    state: Arc<RwLock<SessionState>>,
}

impl LocalWalletSession {
    pub fn new(wallet: LocalWallet, chain_id: u64, supported_chains: Vec<u64>) -> Self {
        let mut supported_chains = supported_chains;
        if !supported_chains.contains(&chain_id) {
            supported_chains.push(chain_id);
        }
        Self {
            wallet: wallet.with_chain_id(chain_id),
            supported_chains,
            state: Arc::new(RwLock::new(SessionState {
                connected: false,
                chain_id,
            })),
        }
    }

    /// Session with a freshly generated key
    pub fn random(chain_id: u64, supported_chains: Vec<u64>) -> Self {
        let wallet = LocalWallet::new(&mut rand::thread_rng());
        Self::new(wallet, chain_id, supported_chains)
    }

    /// Session from a hex-encoded private key
    pub fn from_private_key(
        private_key: &str,
        chain_id: u64,
        supported_chains: Vec<u64>,
    ) -> Result<Self, WalletError> {
        let wallet = private_key
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        Ok(Self::new(wallet, chain_id, supported_chains))
    }

    /// Signer address, available whether or not the session is connected
    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

#[async_trait]
impl WalletProvider for LocalWalletSession {
    async fn activate(&self) -> Result<Address, WalletError> {
        let mut state = self.state.write().await;
        state.connected = true;
        info!("🔌 Wallet connected: {:?} on chain {}", self.wallet.address(), state.chain_id);
        Ok(self.wallet.address())
    }

    async fn deactivate(&self) {
        let mut state = self.state.write().await;
        if state.connected {
            state.connected = false;
            info!("🔌 Wallet disconnected: {:?}", self.wallet.address());
        }
    }

    async fn account(&self) -> Option<Address> {
        let state = self.state.read().await;
        state.connected.then(|| self.wallet.address())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        let state = self.state.read().await;
        if !state.connected {
            return Err(WalletError::NotConnected);
        }
        Ok(state.chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let mut state = self.state.write().await;
        if !state.connected {
            return Err(WalletError::NotConnected);
        }
        if !self.supported_chains.contains(&chain_id) {
            return Err(WalletError::UnsupportedChain(chain_id));
        }
        if state.chain_id != chain_id {
            info!("🔀 Switching wallet chain {} -> {}", state.chain_id, chain_id);
            state.chain_id = chain_id;
        }
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        let chain_id = self.chain_id().await?;
        self.wallet
            .clone()
            .with_chain_id(chain_id)
            .sign_message(message)
            .await
            .map_err(|e| WalletError::Signing(e.to_string()))
    }
}
