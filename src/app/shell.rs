// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! App Shell
//!
//! Owns the session: wallet, configuration, builder form, capabilities and
//! the shared [`AppState`]. Every action records its failure in
//! `AppState::last_error` and clears the loading flag when it returns.

use ethers::types::Address;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::decrypt::{run_decrypt, DecryptPhase, DecryptionOutcome, InFlight};
use super::encrypt::{can_encrypt, encrypt};
use super::error::{AppError, ErrorRecord, Precondition};
use super::state::{AppState, LoadingFlag, SharedState};
use super::strategy::deploy_strategy;
use crate::conditions::{ConditionBuilder, ConditionSet, Selection, SelectionChange};
use crate::config::AppConfig;
use crate::sdk::{CohortDirectory, Decrypter, DeployedStrategy, Encrypter, MessageKit, StrategyDeployer};
use crate::wallet::WalletProvider;

/// Where the encrypter/decrypter pair comes from
#[derive(Clone)]
pub enum Provisioning {
    /// Capabilities handed over up front
    Direct {
        encrypter: Arc<dyn Encrypter>,
        decrypter: Arc<dyn Decrypter>,
    },
    /// Capabilities obtained by deploying a strategy on demand
    Strategy {
        directory: Arc<dyn CohortDirectory>,
        deployer: Arc<dyn StrategyDeployer>,
    },
}

#[derive(Clone)]
struct Capabilities {
    encrypter: Arc<dyn Encrypter>,
    decrypter: Arc<dyn Decrypter>,
    strategy: Option<DeployedStrategy>,
}

/// What the user currently sees
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    ConnectWallet,
    Loading,
    Ready(ReadyView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadyView {
    pub account: Address,
    pub chain_id: u64,
    pub strategy_label: Option<String>,
    pub can_deploy: bool,
    pub builder_summary: String,
    pub operator_enabled: bool,
    pub conditions: Option<String>,
    pub conditions_json: Option<String>,
    pub can_encrypt: bool,
    pub can_decrypt: bool,
    pub ciphertext: Option<String>,
    pub decrypt_phase: DecryptPhase,
    pub decrypted_text: Option<String>,
    pub error_lines: Vec<String>,
    pub last_error: Option<ErrorRecord>,
}

#[derive(Clone)]
pub struct AppShell {
    config: Arc<AppConfig>,
    wallet: Arc<dyn WalletProvider>,
    provisioning: Provisioning,
    capabilities: Arc<RwLock<Option<Capabilities>>>,
    /// Held from the already-deployed check until capabilities are stored
    deploying: Arc<Mutex<()>>,
    builder: Arc<RwLock<ConditionBuilder>>,
    state: SharedState,
    loading: LoadingFlag,
    in_flight: InFlight,
}

impl AppShell {
    pub fn new(config: AppConfig, wallet: Arc<dyn WalletProvider>, provisioning: Provisioning) -> Self {
        let capabilities = match &provisioning {
            Provisioning::Direct {
                encrypter,
                decrypter,
            } => Some(Capabilities {
                encrypter: encrypter.clone(),
                decrypter: decrypter.clone(),
                strategy: None,
            }),
            Provisioning::Strategy { .. } => None,
        };
        let builder = ConditionBuilder::new(config.read_chain.chain_id);
        Self {
            config: Arc::new(config),
            wallet,
            provisioning,
            capabilities: Arc::new(RwLock::new(capabilities)),
            deploying: Arc::new(Mutex::new(())),
            builder: Arc::new(RwLock::new(builder)),
            state: Arc::new(RwLock::new(AppState::default())),
            loading: LoadingFlag::default(),
            in_flight: InFlight::default(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Snapshot of the session state
    pub async fn state(&self) -> AppState {
        self.state.read().await.clone()
    }

    async fn record<T>(&self, result: Result<T, AppError>) -> Result<T, AppError> {
        let mut state = self.state.write().await;
        match &result {
            Ok(_) => state.last_error = None,
            Err(e) => {
                debug!("recording {} ({})", e, e.error_code());
                state.last_error = Some(ErrorRecord::from(e));
            }
        }
        result
    }

    async fn require_account(&self) -> Result<Address, AppError> {
        self.wallet
            .account()
            .await
            .ok_or(AppError::Precondition(Precondition::WalletNotConnected))
    }

    /// Connect the wallet and move it onto the read chain
    pub async fn connect(&self) -> Result<Address, AppError> {
        let _loading = self.loading.start();
        let result: Result<Address, AppError> = async {
            let account = self.wallet.activate().await?;
            let read_chain = self.config.read_chain.chain_id;
            if self.wallet.chain_id().await? != read_chain {
                self.wallet.switch_chain(read_chain).await?;
            }
            info!("👛 Connected {:?} on {}", account, self.config.read_chain.name);
            Ok(account)
        }
        .await;
        self.record(result).await
    }

    /// Disconnect and drop all session results
    pub async fn disconnect(&self) {
        self.wallet.deactivate().await;
        *self.state.write().await = AppState::default();
        info!("Wallet disconnected");
    }

    /// Change one builder selector, cascading resets downstream
    pub async fn select(&self, change: SelectionChange) -> Result<Selection, AppError> {
        let result = self
            .builder
            .write()
            .await
            .select(change)
            .copied()
            .map_err(AppError::from);
        self.record(result).await
    }

    /// Mutate the builder's free-text inputs and operator
    pub async fn edit_builder<R>(&self, edit: impl FnOnce(&mut ConditionBuilder) -> R) -> R {
        edit(&mut *self.builder.write().await)
    }

    /// Append the clause described by the builder to the session's set
    pub async fn add_condition(&self) -> Result<ConditionSet, AppError> {
        let result = {
            let builder = self.builder.read().await;
            let mut state = self.state.write().await;
            builder
                .add_to(state.conditions.as_ref())
                .map(|set| {
                    debug!("condition set now {}", set);
                    state.conditions = Some(set.clone());
                    set
                })
                .map_err(AppError::from)
        };
        self.record(result).await
    }

    pub async fn clear_conditions(&self) {
        self.state.write().await.conditions = None;
    }

    /// Deploy a strategy and adopt its encrypter/decrypter
    pub async fn deploy_strategy(&self) -> Result<DeployedStrategy, AppError> {
        let _loading = self.loading.start();
        let result = self.deploy_inner().await;
        self.record(result).await
    }

    async fn deploy_inner(&self) -> Result<DeployedStrategy, AppError> {
        let (directory, deployer) = match &self.provisioning {
            Provisioning::Strategy {
                directory,
                deployer,
            } => (directory.clone(), deployer.clone()),
            Provisioning::Direct { .. } => {
                return Err(AppError::Precondition(Precondition::DirectProvisioning))
            }
        };
        self.require_account().await?;
        let _deploying = self.deploying.lock().await;
        if self.capabilities.read().await.is_some() {
            return Err(AppError::Precondition(Precondition::StrategyAlreadyDeployed));
        }

        let deployed =
            deploy_strategy(&self.config, self.wallet.as_ref(), directory.as_ref(), deployer.as_ref())
                .await?;
        *self.capabilities.write().await = Some(Capabilities {
            encrypter: deployed.encrypter.clone(),
            decrypter: deployed.decrypter.clone(),
            strategy: Some(deployed.clone()),
        });
        Ok(deployed)
    }

    /// Encrypt `plaintext` under the session's condition set
    pub async fn encrypt(&self, plaintext: &str) -> Result<MessageKit, AppError> {
        let result: Result<MessageKit, AppError> = async {
            self.require_account().await?;
            let encrypter = self.capabilities.read().await.as_ref().map(|c| c.encrypter.clone());
            let conditions = self.state.read().await.conditions.clone();
            let kit = encrypt(plaintext, conditions.as_ref(), encrypter.as_deref())?;
            self.state.write().await.message_kit = Some(kit.clone());
            Ok(kit)
        }
        .await;
        self.record(result).await
    }

    /// Decrypt the last message kit through the cohort
    pub async fn decrypt(&self) -> Result<DecryptionOutcome, AppError> {
        let result: Result<DecryptionOutcome, AppError> = async {
            self.require_account().await?;
            let decrypter = self
                .capabilities
                .read()
                .await
                .as_ref()
                .map(|c| c.decrypter.clone())
                .ok_or(AppError::Precondition(Precondition::NoCapabilities))?;
            let kit = self
                .state
                .read()
                .await
                .message_kit
                .clone()
                .ok_or(AppError::Precondition(Precondition::NoMessageKit))?;

            let _loading = self.loading.start();
            run_decrypt(
                &self.state,
                &self.in_flight,
                &kit,
                self.wallet.as_ref(),
                decrypter.as_ref(),
            )
            .await
        }
        .await;
        self.record(result).await
    }

    pub async fn view(&self) -> View {
        let Some(account) = self.wallet.account().await else {
            return View::ConnectWallet;
        };
        if self.is_loading() {
            return View::Loading;
        }

        let chain_id = self.wallet.chain_id().await.unwrap_or_default();
        let capabilities = self.capabilities.read().await.clone();
        let builder_summary = self.builder.read().await.summary();
        let state = self.state.read().await;

        let encrypter = capabilities.as_ref().map(|c| c.encrypter.clone());
        View::Ready(ReadyView {
            account,
            chain_id,
            strategy_label: capabilities
                .as_ref()
                .and_then(|c| c.strategy.as_ref())
                .map(|s| s.label.clone()),
            can_deploy: matches!(self.provisioning, Provisioning::Strategy { .. })
                && capabilities.is_none(),
            builder_summary,
            operator_enabled: ConditionBuilder::operator_enabled(state.conditions.as_ref()),
            conditions: state.conditions.as_ref().map(|c| c.to_string()),
            conditions_json: state.conditions.as_ref().map(|c| c.preview_json()),
            can_encrypt: can_encrypt(encrypter.as_deref(), state.conditions.as_ref()),
            can_decrypt: capabilities.is_some() && state.message_kit.is_some(),
            ciphertext: state.message_kit.as_ref().map(|k| k.ciphertext_hex()),
            decrypt_phase: state.phase,
            decrypted_text: state.decrypted_text.clone(),
            error_lines: state.errors.clone(),
            last_error: state.last_error.clone(),
        })
    }
}
