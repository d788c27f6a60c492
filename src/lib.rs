// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod app;
pub mod cli;
pub mod conditions;
pub mod config;
pub mod crypto;
pub mod sdk;
pub mod version;
pub mod wallet;

// Re-export main types
pub use app::{AppError, AppShell, DecryptionOutcome, Provisioning, View};
pub use conditions::{
    Clause, ConditionBuilder, ConditionContext, ConditionError, ConditionKind, ConditionSet,
};
pub use config::{AppConfig, ChainConfig, ChainRegistry};
pub use sdk::local::{LocalNetwork, NodeBehavior, StaticChainReader};
pub use sdk::{Decrypter, Encrypter, MessageKit, PolicyMessageKit, SdkError};
pub use wallet::{LocalWalletSession, WalletError, WalletProvider};
