// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session State
//!
//! Everything the shell shows between actions. The state lives behind a
//! shared `tokio::sync::RwLock`; the loading flag is a counter so overlapping
//! operations keep it raised until the last one finishes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::decrypt::{DecryptPhase, DecryptionOutcome};
use super::error::ErrorRecord;
use crate::conditions::ConditionSet;
use crate::sdk::MessageKit;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub conditions: Option<ConditionSet>,
    pub message_kit: Option<MessageKit>,
    pub decrypted_text: Option<String>,
    /// `"{address} - {error}"` lines from the last decryption
    pub errors: Vec<String>,
    pub outcome: Option<DecryptionOutcome>,
    pub phase: DecryptPhase,
    pub last_error: Option<ErrorRecord>,
}

impl AppState {
    /// Clear the results of a previous decryption
    pub fn reset_decryption(&mut self) {
        self.decrypted_text = None;
        self.errors.clear();
        self.outcome = None;
        self.phase = DecryptPhase::Idle;
    }
}

pub type SharedState = Arc<RwLock<AppState>>;

#[derive(Debug, Clone, Default)]
pub struct LoadingFlag {
    active: Arc<AtomicUsize>,
}

impl LoadingFlag {
    /// Raise the flag until the returned guard is dropped
    pub fn start(&self) -> LoadingGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        LoadingGuard { flag: self.clone() }
    }

    pub fn is_loading(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }
}

#[must_use = "the loading flag drops as soon as the guard does"]
pub struct LoadingGuard {
    flag: LoadingFlag,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.active.fetch_sub(1, Ordering::SeqCst);
    }
}
