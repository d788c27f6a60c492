// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-Process Cohort
//!
//! A simulated network of service nodes. Each deployed policy holds a random
//! secret; message kits are sealed with a key derived from it. On retrieval
//! every node evaluates the kit's condition set on its own and releases the
//! derived key as its fragment only when the set holds.

use async_trait::async_trait;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::chain::ChainReader;
use super::evaluator::evaluate_set;
use crate::conditions::{ConditionContext, ConditionSet};
use crate::crypto::{decrypt_with_aead, derive_message_key, encrypt_with_aead, random_nonce, random_secret};
use crate::sdk::cohort::{DeployedStrategy, Strategy, Ursula};
use crate::sdk::error::SdkError;
use crate::sdk::message_kit::{MessageKit, PolicyMessageKit};
use crate::sdk::{CohortDirectory, Decrypter, Encrypter, StrategyDeployer};
use crate::wallet::{WalletError, WalletProvider};

/// Error a node reports when the condition set evaluates to false
pub const CONDITIONS_NOT_SATISFIED: &str = "Decryption conditions not satisfied";

const SALT_SIZE: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeBehavior {
    Honest,
    /// Never responds
    Offline,
    /// Responds with this error instead of evaluating
    Faulty(String),
}

#[derive(Debug, Clone)]
struct LocalNode {
    ursula: Ursula,
    behavior: NodeBehavior,
}

struct PolicyRecord {
    secret: [u8; 32],
    threshold: usize,
    nodes: Vec<Address>,
}

struct NetworkInner {
    nodes: RwLock<Vec<LocalNode>>,
    policies: RwLock<HashMap<Uuid, PolicyRecord>>,
    reader: Arc<dyn ChainReader>,
}

#[derive(Clone)]
pub struct LocalNetwork {
    inner: Arc<NetworkInner>,
}

impl LocalNetwork {
    /// Start a network of `node_count` honest nodes
    pub fn new(node_count: usize, reader: Arc<dyn ChainReader>) -> Self {
        let nodes = (0..node_count)
            .map(|i| {
                let wallet = LocalWallet::new(&mut OsRng);
                let encrypting_key = wallet
                    .signer()
                    .verifying_key()
                    .to_encoded_point(true)
                    .as_bytes()
                    .to_vec();
                LocalNode {
                    ursula: Ursula {
                        checksum_address: wallet.address(),
                        uri: format!("local://node-{}", i),
                        encrypting_key: hex::encode(encrypting_key),
                    },
                    behavior: NodeBehavior::Honest,
                }
            })
            .collect();
        info!("🌐 Local network started with {} nodes", node_count);
        Self {
            inner: Arc::new(NetworkInner {
                nodes: RwLock::new(nodes),
                policies: RwLock::new(HashMap::new()),
                reader,
            }),
        }
    }

    pub async fn ursulas(&self) -> Vec<Ursula> {
        self.inner
            .nodes
            .read()
            .await
            .iter()
            .map(|n| n.ursula.clone())
            .collect()
    }

    /// Change how a node answers future retrievals
    pub async fn set_behavior(&self, node: Address, behavior: NodeBehavior) -> Result<(), SdkError> {
        let mut nodes = self.inner.nodes.write().await;
        let entry = nodes
            .iter_mut()
            .find(|n| n.ursula.checksum_address == node)
            .ok_or_else(|| SdkError::Retrieval(format!("unknown node {:?}", node)))?;
        debug!("node {:?} now {:?}", node, behavior);
        entry.behavior = behavior;
        Ok(())
    }

    /// Apply `behavior` to every node
    pub async fn set_all_behaviors(&self, behavior: NodeBehavior) {
        for node in self.inner.nodes.write().await.iter_mut() {
            node.behavior = behavior.clone();
        }
    }

    /// Create a policy over the first `shares` nodes without a strategy
    pub async fn provision_direct(
        &self,
        threshold: usize,
        shares: usize,
    ) -> Result<(Arc<dyn Encrypter>, Arc<dyn Decrypter>), SdkError> {
        if threshold == 0 || threshold > shares {
            return Err(SdkError::InvalidCohort { threshold, shares });
        }
        let nodes: Vec<Address> = self
            .ursulas()
            .await
            .into_iter()
            .take(shares)
            .map(|u| u.checksum_address)
            .collect();
        if nodes.len() < shares {
            return Err(SdkError::NotEnoughNodes {
                requested: shares,
                available: nodes.len(),
            });
        }
        let (policy_id, secret) = self.register_policy(threshold, nodes).await;
        info!("Provisioned direct {}-of-{} policy {}", threshold, shares, policy_id);
        Ok(self.capabilities(policy_id, secret))
    }

    async fn register_policy(&self, threshold: usize, nodes: Vec<Address>) -> (Uuid, [u8; 32]) {
        let policy_id = Uuid::new_v4();
        let secret = random_secret();
        self.inner.policies.write().await.insert(
            policy_id,
            PolicyRecord {
                secret,
                threshold,
                nodes,
            },
        );
        (policy_id, secret)
    }

    fn capabilities(&self, policy_id: Uuid, secret: [u8; 32]) -> (Arc<dyn Encrypter>, Arc<dyn Decrypter>) {
        let encrypter = LocalEncrypter { policy_id, secret };
        let decrypter = LocalDecrypter {
            policy_id,
            inner: self.inner.clone(),
        };
        (Arc::new(encrypter), Arc::new(decrypter))
    }
}

#[async_trait]
impl CohortDirectory for LocalNetwork {
    async fn get_ursulas(&self, quantity: usize) -> Result<Vec<Ursula>, SdkError> {
        Ok(self.ursulas().await.into_iter().take(quantity).collect())
    }
}

#[async_trait]
impl StrategyDeployer for LocalNetwork {
    async fn deploy(
        &self,
        strategy: &Strategy,
        label: &str,
        wallet: &dyn WalletProvider,
    ) -> Result<DeployedStrategy, SdkError> {
        let publisher = wallet.account().await.ok_or(WalletError::NotConnected)?;
        let chain_id = wallet.chain_id().await?;

        let known: Vec<Address> = self
            .ursulas()
            .await
            .into_iter()
            .map(|u| u.checksum_address)
            .collect();
        let nodes = strategy.cohort.addresses();
        if let Some(unknown) = nodes.iter().find(|n| !known.contains(n)) {
            return Err(SdkError::Deployment(format!(
                "node {:?} is not part of this network",
                unknown
            )));
        }

        let (policy_id, secret) = self.register_policy(strategy.cohort.threshold(), nodes).await;
        debug!(
            "policy {} published by {:?} on chain {}",
            policy_id, publisher, chain_id
        );
        let (encrypter, decrypter) = self.capabilities(policy_id, secret);
        Ok(DeployedStrategy {
            label: label.to_string(),
            strategy: strategy.clone(),
            chain_id,
            encrypter,
            decrypter,
        })
    }
}

pub struct LocalEncrypter {
    policy_id: Uuid,
    secret: [u8; 32],
}

impl Encrypter for LocalEncrypter {
    fn encrypt_message(
        &self,
        plaintext: &[u8],
        conditions: &ConditionSet,
    ) -> Result<MessageKit, SdkError> {
        if conditions.is_empty() {
            return Err(SdkError::Encryption("condition set is empty".to_string()));
        }
        let mut salt = vec![0u8; SALT_SIZE];
        OsRng.fill_bytes(&mut salt);
        let key = derive_message_key(&self.secret, &salt)?;
        let nonce = random_nonce();
        let aad = conditions.to_json();
        let ciphertext = encrypt_with_aead(plaintext, &nonce, aad.as_bytes(), &key)?;

        let kit = MessageKit {
            id: Uuid::new_v4(),
            policy_id: self.policy_id,
            conditions: conditions.clone(),
            ciphertext,
            nonce: nonce.to_vec(),
            salt,
        };
        info!("🔐 Encrypted message kit {} ({} bytes)", kit.id, kit.ciphertext.len());
        Ok(kit)
    }
}

pub struct LocalDecrypter {
    policy_id: Uuid,
    inner: Arc<NetworkInner>,
}

#[async_trait]
impl Decrypter for LocalDecrypter {
    async fn retrieve(
        &self,
        message_kits: &[MessageKit],
        context: &ConditionContext,
    ) -> Result<Vec<PolicyMessageKit>, SdkError> {
        let policies = self.inner.policies.read().await;
        let policy = policies
            .get(&self.policy_id)
            .ok_or_else(|| SdkError::UnknownPolicy(self.policy_id.to_string()))?;
        let nodes = self.inner.nodes.read().await;

        let mut results = Vec::with_capacity(message_kits.len());
        for kit in message_kits {
            if kit.policy_id != self.policy_id {
                return Err(SdkError::UnknownPolicy(kit.policy_id.to_string()));
            }
            let mut annotated = PolicyMessageKit::new(kit.clone(), policy.threshold);
            for address in &policy.nodes {
                let behavior = nodes
                    .iter()
                    .find(|n| n.ursula.checksum_address == *address)
                    .map(|n| n.behavior.clone())
                    .unwrap_or(NodeBehavior::Offline);
                match behavior {
                    NodeBehavior::Offline => {
                        debug!("node {:?} did not respond", address);
                    }
                    NodeBehavior::Faulty(error) => {
                        annotated.errors.insert(*address, error);
                    }
                    NodeBehavior::Honest => {
                        match evaluate_set(&kit.conditions, context, self.inner.reader.as_ref()).await {
                            Ok(true) => {
                                let fragment = derive_message_key(&policy.secret, &kit.salt)?;
                                annotated.fragments.insert(*address, fragment.to_vec());
                            }
                            Ok(false) => {
                                annotated
                                    .errors
                                    .insert(*address, CONDITIONS_NOT_SATISFIED.to_string());
                            }
                            Err(e) => {
                                annotated.errors.insert(*address, e.to_string());
                            }
                        }
                    }
                }
            }
            if !annotated.errors.is_empty() {
                warn!(
                    "Kit {}: {} node(s) refused or failed",
                    kit.id,
                    annotated.errors.len()
                );
            }
            info!(
                "🔓 Retrieved kit {}: {} fragment(s), {} error(s), threshold {}",
                kit.id,
                annotated.fragments.len(),
                annotated.errors.len(),
                annotated.threshold
            );
            results.push(annotated);
        }
        Ok(results)
    }

    fn decrypt(&self, policy_message_kit: &PolicyMessageKit) -> Result<Vec<u8>, SdkError> {
        if !policy_message_kit.is_decryptable_by_receiver() {
            return Err(SdkError::NotDecryptable {
                released: policy_message_kit.fragments.len(),
                threshold: policy_message_kit.threshold,
            });
        }
        let kit = &policy_message_kit.message_kit;
        let key = policy_message_kit
            .fragments
            .values()
            .next()
            .ok_or(SdkError::NotDecryptable {
                released: 0,
                threshold: policy_message_kit.threshold,
            })?;
        let plaintext = decrypt_with_aead(&kit.ciphertext, &kit.nonce, &kit.aad(), key)?;
        Ok(plaintext)
    }
}
