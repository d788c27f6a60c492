// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Condition Taxonomy
//!
//! Fixed lookup tables describing which condition kinds exist, which methods
//! each kind (or contract type) offers, and which parameter names each method
//! declares. The builder derives every dropdown from these tables.
//!
//! ## Tables
//!
//! | Kind      | Methods                              | Parameters                |
//! |-----------|--------------------------------------|---------------------------|
//! | timelock  | `timelock`                           | none                      |
//! | rpc       | `eth_getBalance`, `balanceOf`        | `address`                 |
//! | evm/ERC20 | `balanceOf`                          | `address`                 |
//! | evm/ERC721| `balanceOf`, `ownerOf`               | `address` / `tokenId`     |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ConditionError;

/// Context variable resolved to the requesting wallet address at decryption time
pub const USER_ADDRESS_PARAM: &str = ":userAddress";

/// Method name carried by timelock clauses
pub const TIMELOCK_METHOD: &str = "timelock";

/// Contract method whose single parameter is an integer token id
pub const OWNER_OF_METHOD: &str = "ownerOf";

pub const RPC_METHODS: &[&str] = &["eth_getBalance", "balanceOf"];

pub const STANDARD_CONTRACT_TYPES: &[ContractType] = &[ContractType::Erc20, ContractType::Erc721];

/// Kind of a condition clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    Timelock,
    Evm,
    Rpc,
}

impl ConditionKind {
    /// Kinds in the order the builder offers them
    pub const ALL: [ConditionKind; 3] = [
        ConditionKind::Timelock,
        ConditionKind::Evm,
        ConditionKind::Rpc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::Timelock => "timelock",
            ConditionKind::Evm => "evm",
            ConditionKind::Rpc => "rpc",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionKind {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timelock" => Ok(ConditionKind::Timelock),
            "evm" => Ok(ConditionKind::Evm),
            "rpc" => Ok(ConditionKind::Rpc),
            other => Err(ConditionError::UnknownConditionKind(other.to_string())),
        }
    }
}

/// Comparator used by a return value test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "!=")]
    Ne,
}

impl Comparator {
    pub const ALL: [Comparator; 6] = [
        Comparator::Eq,
        Comparator::Gt,
        Comparator::Lt,
        Comparator::Gte,
        Comparator::Lte,
        Comparator::Ne,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Gte => ">=",
            Comparator::Lte => "<=",
            Comparator::Ne => "!=",
        }
    }

    /// Apply the comparator to an ordering of `actual` relative to `expected`
    pub fn holds(&self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Comparator::Eq => ordering == Equal,
            Comparator::Gt => ordering == Greater,
            Comparator::Lt => ordering == Less,
            Comparator::Gte => ordering != Less,
            Comparator::Lte => ordering != Greater,
            Comparator::Ne => ordering != Equal,
        }
    }

    /// Whether the comparator is meaningful for non-numeric values
    pub fn is_equality(&self) -> bool {
        matches!(self, Comparator::Eq | Comparator::Ne)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Comparator::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ConditionError::UnknownComparator(s.to_string()))
    }
}

/// Logical operator joining two clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub const ALL: [LogicalOperator; 2] = [LogicalOperator::And, LogicalOperator::Or];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }

    pub fn apply(&self, left: bool, right: bool) -> bool {
        match self {
            LogicalOperator::And => left && right,
            LogicalOperator::Or => left || right,
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalOperator {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "and" => Ok(LogicalOperator::And),
            "or" => Ok(LogicalOperator::Or),
            other => Err(ConditionError::UnknownOperator(other.to_string())),
        }
    }
}

/// Standard contract interface targeted by an EVM clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC721")]
    Erc721,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Erc20 => "ERC20",
            ContractType::Erc721 => "ERC721",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = ConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ERC20" => Ok(ContractType::Erc20),
            "ERC721" => Ok(ContractType::Erc721),
            other => Err(ConditionError::UnknownContractType(other.to_string())),
        }
    }
}

/// Methods a standard contract type exposes, first entry is the default
pub fn methods_for_contract_type(contract_type: ContractType) -> &'static [&'static str] {
    match contract_type {
        ContractType::Erc20 => &["balanceOf"],
        ContractType::Erc721 => &["balanceOf", "ownerOf"],
    }
}

/// Declared parameter names of a contract method
pub fn parameters_for_contract_method(method: &str) -> &'static [&'static str] {
    match method {
        "balanceOf" => &["address"],
        "ownerOf" => &["tokenId"],
        _ => &[],
    }
}

/// Declared parameter names of an RPC method
pub fn parameters_for_rpc_method(method: &str) -> &'static [&'static str] {
    match method {
        "eth_getBalance" | "balanceOf" => &["address"],
        _ => &[],
    }
}

/// Methods selectable for a clause kind. EVM methods depend on the contract type.
pub fn methods_for_kind(kind: ConditionKind, contract_type: ContractType) -> &'static [&'static str] {
    match kind {
        ConditionKind::Timelock => &[TIMELOCK_METHOD],
        ConditionKind::Rpc => RPC_METHODS,
        ConditionKind::Evm => methods_for_contract_type(contract_type),
    }
}

/// Parameter names selectable for a method of a given kind
pub fn parameters_for(kind: ConditionKind, method: &str) -> &'static [&'static str] {
    match kind {
        ConditionKind::Timelock => &[],
        ConditionKind::Rpc => parameters_for_rpc_method(method),
        ConditionKind::Evm => parameters_for_contract_method(method),
    }
}
