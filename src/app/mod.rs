// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Application Layer
//!
//! The session driving the demo: condition composition, strategy setup,
//! encryption and the decrypt state machine, surfaced through [`AppShell`].

pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod shell;
pub mod state;
pub mod strategy;

pub use decrypt::{error_lines, resolve_outcome, DecryptPhase, DecryptionOutcome, InFlight};
pub use error::{AppError, ErrorRecord, Precondition};
pub use shell::{AppShell, Provisioning, ReadyView, View};
pub use state::{AppState, LoadingFlag, SharedState};
pub use strategy::deploy_strategy;
