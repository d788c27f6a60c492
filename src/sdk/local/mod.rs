// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Local Cohort Backend
//!
//! Runs the whole encrypt / retrieve / decrypt flow in-process, with node
//! condition checks answered by a [`ChainReader`].

pub mod chain;
pub mod evaluator;
pub mod network;

pub use chain::{ChainReader, ProviderChainReader, StaticChainReader};
pub use evaluator::{evaluate_clause, evaluate_set};
pub use network::{LocalNetwork, NodeBehavior, CONDITIONS_NOT_SATISFIED};
