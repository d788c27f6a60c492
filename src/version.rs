// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for cbd-demo

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Capabilities of this build
pub const FEATURES: &[&str] = &[
    "timelock-conditions",
    "rpc-conditions",
    "evm-conditions",
    "user-address-context",
    "strategy-deployment",
    "porter-directory",
    "local-cohort",
    "xchacha20-poly1305",
];

/// Chains conditions are read from and strategies deployed to
pub const SUPPORTED_CHAINS: &[u64] = &[
    5,     // Goerli
    80001, // Polygon Mumbai
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("cbd-demo {}", VERSION_NUMBER)
}

pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "features": FEATURES,
        "chains": SUPPORTED_CHAINS,
    })
}
