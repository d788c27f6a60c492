// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use ethers::types::U256;
use std::sync::Arc;
use tracing::info;

use super::conditions::ConditionArgs;
use crate::app::{AppShell, DecryptionOutcome, Provisioning, View};
use crate::config::{AppConfig, ChainRegistry};
use crate::sdk::local::{
    ChainReader, LocalNetwork, NodeBehavior, ProviderChainReader, StaticChainReader,
};
use crate::wallet::LocalWalletSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Flow {
    /// Encrypter and decrypter provisioned up front
    Direct,
    /// Deploy a strategy first, switching chains around the deployment
    Strategy,
}

/// Arguments for demo command
#[derive(Args, Debug)]
pub struct DemoArgs {
    /// Message to encrypt
    #[arg(long, default_value = "hello-world")]
    pub message: String,

    #[arg(long, value_enum, default_value = "direct")]
    pub flow: Flow,

    #[command(flatten)]
    pub condition: ConditionArgs,

    /// Nodes in the local network
    #[arg(long, default_value_t = 5)]
    pub nodes: usize,

    /// Cohort threshold (overrides CBD_THRESHOLD)
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Cohort size (overrides CBD_SHARES)
    #[arg(long)]
    pub shares: Option<usize>,

    /// Number of cohort nodes that never answer
    #[arg(long, default_value_t = 0)]
    pub offline: usize,

    /// Number of cohort nodes that answer with an error
    #[arg(long, default_value_t = 0)]
    pub faulty: usize,

    /// Block timestamp nodes observe (defaults to the wall clock)
    #[arg(long)]
    pub block_timestamp: Option<u64>,

    /// Native balance in wei credited to the demo wallet
    #[arg(long, default_value_t = 0)]
    pub balance: u64,

    /// Evaluate conditions against the configured RPC endpoints
    #[arg(long)]
    pub live: bool,

    /// Wallet key (a random key is generated otherwise)
    #[arg(long, env = "WALLET_PRIVATE_KEY")]
    pub private_key: Option<String>,
}

pub async fn run_demo(args: DemoArgs) -> Result<()> {
    dotenv::dotenv().ok();

    let mut config = AppConfig::from_env()?;
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(shares) = args.shares {
        config.shares = shares;
    }
    config.validate()?;
    if args.offline + args.faulty > config.shares {
        return Err(anyhow!(
            "Cannot disable {} nodes in a cohort of {}",
            args.offline + args.faulty,
            config.shares
        ));
    }

    let read_chain = config.read_chain.chain_id;
    let wallet = match &args.private_key {
        Some(key) => LocalWalletSession::from_private_key(key, read_chain, config.wallet_chains())?,
        None => LocalWalletSession::random(read_chain, config.wallet_chains()),
    };

    let reader: Arc<dyn ChainReader> = if args.live {
        let mut registry = ChainRegistry::new();
        registry.add_chain(config.read_chain.clone());
        registry.add_chain(config.deploy_chain.clone());
        Arc::new(ProviderChainReader::new(&registry)?)
    } else {
        let mut reader =
            StaticChainReader::new().with_balance(wallet.address(), U256::from(args.balance));
        if let Some(timestamp) = args.block_timestamp {
            reader = reader.with_timestamp(timestamp);
        }
        Arc::new(reader)
    };
    let network = LocalNetwork::new(args.nodes, reader);

    let provisioning = match args.flow {
        Flow::Direct => {
            let (encrypter, decrypter) = network
                .provision_direct(config.threshold, config.shares)
                .await?;
            Provisioning::Direct {
                encrypter,
                decrypter,
            }
        }
        Flow::Strategy => Provisioning::Strategy {
            directory: Arc::new(network.clone()),
            deployer: Arc::new(network.clone()),
        },
    };
    let label = config.strategy_label.clone();
    let shell = AppShell::new(config, Arc::new(wallet), provisioning);

    let account = shell.connect().await?;
    println!("👛 Connected {:?}", account);

    if args.flow == Flow::Strategy {
        let deployed = shell.deploy_strategy().await?;
        println!(
            "🚀 Deployed strategy '{}' ({}-of-{})",
            label,
            deployed.strategy.cohort.threshold(),
            deployed.strategy.cohort.ursulas.len()
        );
    }

    shell
        .edit_builder(|builder| args.condition.apply(builder))
        .await?;
    let conditions = shell.add_condition().await?;
    println!("📝 Conditions: {}", conditions);

    let kit = shell.encrypt(&args.message).await?;
    println!("🔐 Ciphertext: {}", kit.ciphertext_hex());

    let ursulas = network.ursulas().await;
    let mut disabled = ursulas.iter().map(|u| u.checksum_address);
    for address in disabled.by_ref().take(args.offline) {
        network.set_behavior(address, NodeBehavior::Offline).await?;
    }
    for address in disabled.take(args.faulty) {
        network
            .set_behavior(address, NodeBehavior::Faulty("node unavailable".to_string()))
            .await?;
    }

    let outcome = shell.decrypt().await?;
    info!("Decrypt phase: {:?}", shell.state().await.phase);
    match &outcome {
        DecryptionOutcome::Decrypted(_) => {
            if let View::Ready(view) = shell.view().await {
                println!(
                    "✅ Decrypted: {}",
                    view.decrypted_text.unwrap_or_default()
                );
            }
        }
        DecryptionOutcome::NodeErrors(_) => {
            println!("❌ Decryption failed:");
            for line in outcome.error_lines() {
                println!("  {}", line);
            }
        }
        DecryptionOutcome::Inconclusive => {
            println!("⚠️  Not decryptable and no node reported an error");
        }
    }

    shell.disconnect().await;
    Ok(())
}
