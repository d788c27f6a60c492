//! Shared fixtures for app tests

use async_trait::async_trait;
use cbd_demo::app::{AppShell, Provisioning};
use cbd_demo::conditions::{Comparator, SelectionChange};
use cbd_demo::config::AppConfig;
use cbd_demo::sdk::local::{LocalNetwork, StaticChainReader};
use cbd_demo::wallet::{LocalWalletSession, WalletError, WalletProvider};
use ethers::types::{Address, Signature};
use std::sync::{Arc, Mutex};

pub const BLOCK_TIME: u64 = 1_700_000_000;

pub fn config(threshold: usize, shares: usize) -> AppConfig {
    AppConfig {
        threshold,
        shares,
        ..AppConfig::default()
    }
}

pub fn network(nodes: usize) -> LocalNetwork {
    LocalNetwork::new(
        nodes,
        Arc::new(StaticChainReader::new().with_timestamp(BLOCK_TIME)),
    )
}

pub fn wallet(config: &AppConfig) -> LocalWalletSession {
    LocalWalletSession::random(config.read_chain.chain_id, config.wallet_chains())
}

/// Shell with capabilities provisioned straight from `network`
pub async fn direct_shell(network: &LocalNetwork, config: AppConfig) -> AppShell {
    let (encrypter, decrypter) = network
        .provision_direct(config.threshold, config.shares)
        .await
        .unwrap();
    let wallet = wallet(&config);
    AppShell::new(
        config,
        Arc::new(wallet),
        Provisioning::Direct {
            encrypter,
            decrypter,
        },
    )
}

/// Add `Timelock > value` to the shell's condition set
pub async fn add_timelock(shell: &AppShell, value: u64) {
    shell
        .edit_builder(|b| {
            b.select(SelectionChange::Comparator(Comparator::Gt)).unwrap();
            b.set_return_value(value.to_string());
        })
        .await;
    shell.add_condition().await.unwrap();
}

/// Wallet that logs every chain switch
#[derive(Clone)]
pub struct RecordingWallet {
    pub inner: LocalWalletSession,
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingWallet {
    pub fn new(inner: LocalWalletSession) -> Self {
        Self {
            inner,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for RecordingWallet {
    async fn activate(&self) -> Result<Address, WalletError> {
        self.inner.activate().await
    }

    async fn deactivate(&self) {
        self.inner.deactivate().await
    }

    async fn account(&self) -> Option<Address> {
        self.inner.account().await
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.inner.chain_id().await
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.events.lock().unwrap().push(format!("switch:{}", chain_id));
        self.inner.switch_chain(chain_id).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, WalletError> {
        self.inner.sign_message(message).await
    }
}
