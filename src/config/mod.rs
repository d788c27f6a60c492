// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod app;
pub mod chains;

pub use app::AppConfig;
pub use chains::{ChainConfig, ChainRegistry, GOERLI_CHAIN_ID, MUMBAI_CHAIN_ID};
