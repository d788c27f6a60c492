// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decrypt Flow
//!
//! ```text
//! Idle -> BuildingContext -> Retrieving -> EvaluatingPerNode
//!      -> Decrypted | FailedWithNodeErrors | Inconclusive
//! ```
//!
//! Every run starts by clearing the previous plaintext and errors. A kit can
//! only be decrypted by one run at a time.

use ethers::types::Address;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::AppError;
use super::state::SharedState;
use crate::conditions::ConditionContext;
use crate::sdk::{Decrypter, MessageKit, PolicyMessageKit, SdkError};
use crate::wallet::WalletProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecryptPhase {
    #[default]
    Idle,
    BuildingContext,
    Retrieving,
    EvaluatingPerNode,
    Decrypted,
    FailedWithNodeErrors,
    /// Not decryptable and no node reported an error
    Inconclusive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptionOutcome {
    Decrypted(Vec<u8>),
    NodeErrors(BTreeMap<Address, String>),
    Inconclusive,
}

impl DecryptionOutcome {
    pub fn phase(&self) -> DecryptPhase {
        match self {
            DecryptionOutcome::Decrypted(_) => DecryptPhase::Decrypted,
            DecryptionOutcome::NodeErrors(_) => DecryptPhase::FailedWithNodeErrors,
            DecryptionOutcome::Inconclusive => DecryptPhase::Inconclusive,
        }
    }

    pub fn plaintext(&self) -> Option<String> {
        match self {
            DecryptionOutcome::Decrypted(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    pub fn error_lines(&self) -> Vec<String> {
        match self {
            DecryptionOutcome::NodeErrors(errors) => error_lines(errors),
            _ => Vec::new(),
        }
    }
}

/// One `"{address} - {error}"` line per failing node
pub fn error_lines(errors: &BTreeMap<Address, String>) -> Vec<String> {
    errors
        .iter()
        .map(|(address, error)| format!("{:?} - {}", address, error))
        .collect()
}

/// Decide the outcome of a retrieval
///
/// The first decryptable entry is decrypted. Otherwise the node errors of all
/// entries are reported, or the result is inconclusive if there are none.
pub fn resolve_outcome(
    retrieved: &[PolicyMessageKit],
    decrypter: &dyn Decrypter,
) -> Result<DecryptionOutcome, SdkError> {
    if let Some(entry) = retrieved.iter().find(|e| e.is_decryptable_by_receiver()) {
        return Ok(DecryptionOutcome::Decrypted(decrypter.decrypt(entry)?));
    }
    let errors: BTreeMap<Address, String> = retrieved
        .iter()
        .flat_map(|e| e.errors.iter().map(|(a, m)| (*a, m.clone())))
        .collect();
    if errors.is_empty() {
        Ok(DecryptionOutcome::Inconclusive)
    } else {
        Ok(DecryptionOutcome::NodeErrors(errors))
    }
}

/// Message kits with a decryption in progress
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    kits: Arc<Mutex<HashSet<Uuid>>>,
}

impl InFlight {
    /// Mark `id` as in flight; `None` if it already is
    pub fn try_begin(&self, id: Uuid) -> Option<InFlightGuard> {
        let mut kits = self.kits.lock().unwrap_or_else(|e| e.into_inner());
        kits.insert(id).then(|| InFlightGuard {
            id,
            kits: self.kits.clone(),
        })
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.kits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(id)
    }
}

pub struct InFlightGuard {
    id: Uuid,
    kits: Arc<Mutex<HashSet<Uuid>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.kits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

async fn enter(state: &SharedState, phase: DecryptPhase) {
    debug!("decrypt phase -> {:?}", phase);
    state.write().await.phase = phase;
}

/// Run one decryption of `message_kit`, recording progress in `state`
pub async fn run_decrypt(
    state: &SharedState,
    in_flight: &InFlight,
    message_kit: &MessageKit,
    wallet: &dyn WalletProvider,
    decrypter: &dyn Decrypter,
) -> Result<DecryptionOutcome, AppError> {
    let _guard = in_flight
        .try_begin(message_kit.id)
        .ok_or(AppError::DecryptInFlight(message_kit.id))?;

    state.write().await.reset_decryption();

    let result = decrypt_steps(state, message_kit, wallet, decrypter).await;

    let mut guard = state.write().await;
    match &result {
        Ok(outcome) => {
            guard.decrypted_text = outcome.plaintext();
            guard.errors = outcome.error_lines();
            guard.phase = outcome.phase();
            guard.outcome = Some(outcome.clone());
        }
        Err(e) => {
            warn!("Decryption of {} failed: {}", message_kit.id, e);
            guard.phase = DecryptPhase::Idle;
        }
    }
    result
}

async fn decrypt_steps(
    state: &SharedState,
    message_kit: &MessageKit,
    wallet: &dyn WalletProvider,
    decrypter: &dyn Decrypter,
) -> Result<DecryptionOutcome, AppError> {
    enter(state, DecryptPhase::BuildingContext).await;
    let context = ConditionContext::build(&message_kit.conditions, wallet).await?;

    enter(state, DecryptPhase::Retrieving).await;
    let retrieved = decrypter
        .retrieve(std::slice::from_ref(message_kit), &context)
        .await?;

    enter(state, DecryptPhase::EvaluatingPerNode).await;
    let outcome = resolve_outcome(&retrieved, decrypter)?;
    match &outcome {
        DecryptionOutcome::Decrypted(bytes) => {
            info!("✅ Decrypted message kit {} ({} bytes)", message_kit.id, bytes.len())
        }
        DecryptionOutcome::NodeErrors(errors) => {
            warn!("❌ {} node(s) refused message kit {}", errors.len(), message_kit.id)
        }
        DecryptionOutcome::Inconclusive => {
            warn!("Message kit {} is not decryptable and no node reported an error", message_kit.id)
        }
    }
    Ok(outcome)
}
