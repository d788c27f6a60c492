// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Condition Clauses
//!
//! A clause is one predicate of an access policy: a timelock, an RPC call or
//! an EVM contract call, each paired with a return value test. Clauses
//! serialize to the JSON shape service nodes expect:
//!
//! ```json
//! {"method":"timelock","returnValueTest":{"comparator":">","value":0}}
//! {"chain":5,"method":"eth_getBalance","parameters":[":userAddress"],"returnValueTest":{"comparator":">=","value":1}}
//! ```

use ethers::types::Address;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use super::error::ConditionError;
use super::taxonomy::{
    methods_for_contract_type, parameters_for_contract_method, ConditionKind, Comparator,
    ContractType, RPC_METHODS, TIMELOCK_METHOD, USER_ADDRESS_PARAM,
};

/// Comparator and expected value every clause carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReturnValueTest {
    pub comparator: Comparator,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TimelockCondition {
    pub method: String,
    pub return_value_test: ReturnValueTest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RpcCondition {
    pub chain: u64,
    pub method: String,
    pub parameters: Vec<Value>,
    pub return_value_test: ReturnValueTest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EvmCondition {
    pub contract_address: Address,
    pub chain: u64,
    pub standard_contract_type: ContractType,
    pub method: String,
    pub parameters: Vec<Value>,
    pub return_value_test: ReturnValueTest,
}

/// One predicate of a condition set
///
/// Deserialization checks the method against the taxonomy, so a clause read
/// from JSON is as valid as one from [`create_clause`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Clause {
    Evm(EvmCondition),
    Rpc(RpcCondition),
    Timelock(TimelockCondition),
}

/// Shape-only parse; variants are ordered most-specific first
#[derive(Deserialize)]
#[serde(untagged)]
enum UncheckedClause {
    Evm(EvmCondition),
    Rpc(RpcCondition),
    Timelock(TimelockCondition),
}

impl<'de> Deserialize<'de> for Clause {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let clause = match UncheckedClause::deserialize(deserializer)? {
            UncheckedClause::Evm(c) => Clause::Evm(c),
            UncheckedClause::Rpc(c) => Clause::Rpc(c),
            UncheckedClause::Timelock(c) => Clause::Timelock(c),
        };
        clause.validate().map_err(serde::de::Error::custom)?;
        Ok(clause)
    }
}

/// Raw inputs for [`create_clause`]; which fields are required depends on the kind
#[derive(Debug, Clone, Default)]
pub struct ClauseParams {
    pub comparator: Option<Comparator>,
    pub value: Option<Value>,
    pub method: Option<String>,
    pub parameters: Option<Vec<Value>>,
    pub contract_address: Option<String>,
    pub contract_type: Option<ContractType>,
    pub chain: Option<u64>,
}

/// Construct a clause of the given kind
///
/// # Errors
///
/// Returns a configuration error if a parameter the kind requires is missing,
/// if the method is not declared for the kind, or if the contract address
/// does not parse.
pub fn create_clause(kind: ConditionKind, params: ClauseParams) -> Result<Clause, ConditionError> {
    let kind_name = kind.as_str();
    let return_value_test = ReturnValueTest {
        comparator: params
            .comparator
            .ok_or_else(|| ConditionError::missing(kind_name, "comparator"))?,
        value: params
            .value
            .ok_or_else(|| ConditionError::missing(kind_name, "value"))?,
    };

    match kind {
        ConditionKind::Timelock => Ok(Clause::Timelock(TimelockCondition {
            method: TIMELOCK_METHOD.to_string(),
            return_value_test,
        })),
        ConditionKind::Rpc => {
            let method = params
                .method
                .ok_or_else(|| ConditionError::missing(kind_name, "method"))?;
            if !RPC_METHODS.contains(&method.as_str()) {
                return Err(ConditionError::UnknownMethod {
                    method,
                    context: "rpc conditions".to_string(),
                });
            }
            Ok(Clause::Rpc(RpcCondition {
                chain: params
                    .chain
                    .ok_or_else(|| ConditionError::missing(kind_name, "chain"))?,
                method,
                parameters: params
                    .parameters
                    .ok_or_else(|| ConditionError::missing(kind_name, "parameters"))?,
                return_value_test,
            }))
        }
        ConditionKind::Evm => {
            let raw_address = params
                .contract_address
                .filter(|a| !a.trim().is_empty())
                .ok_or_else(|| ConditionError::missing(kind_name, "contractAddress"))?;
            let contract_address = raw_address.trim().parse::<Address>().map_err(|e| {
                ConditionError::InvalidContractAddress {
                    address: raw_address.clone(),
                    reason: e.to_string(),
                }
            })?;
            let standard_contract_type = params
                .contract_type
                .ok_or_else(|| ConditionError::missing(kind_name, "standardContractType"))?;
            let method = params
                .method
                .ok_or_else(|| ConditionError::missing(kind_name, "method"))?;
            if !methods_for_contract_type(standard_contract_type).contains(&method.as_str()) {
                return Err(ConditionError::UnknownMethod {
                    method,
                    context: format!("{} contracts", standard_contract_type),
                });
            }
            Ok(Clause::Evm(EvmCondition {
                contract_address,
                chain: params
                    .chain
                    .ok_or_else(|| ConditionError::missing(kind_name, "chain"))?,
                standard_contract_type,
                method,
                parameters: params
                    .parameters
                    .ok_or_else(|| ConditionError::missing(kind_name, "parameters"))?,
                return_value_test,
            }))
        }
    }
}

impl Clause {
    /// Check that the clause's method is one its kind declares
    pub fn validate(&self) -> Result<(), ConditionError> {
        let (method, allowed, context): (&str, &[&str], String) = match self {
            Clause::Timelock(c) => (
                c.method.as_str(),
                &[TIMELOCK_METHOD][..],
                "timelock conditions".to_string(),
            ),
            Clause::Rpc(c) => (c.method.as_str(), RPC_METHODS, "rpc conditions".to_string()),
            Clause::Evm(c) => (
                c.method.as_str(),
                methods_for_contract_type(c.standard_contract_type),
                format!("{} contracts", c.standard_contract_type),
            ),
        };
        if allowed.contains(&method) {
            Ok(())
        } else {
            Err(ConditionError::UnknownMethod {
                method: method.to_string(),
                context,
            })
        }
    }

    pub fn kind(&self) -> ConditionKind {
        match self {
            Clause::Timelock(_) => ConditionKind::Timelock,
            Clause::Rpc(_) => ConditionKind::Rpc,
            Clause::Evm(_) => ConditionKind::Evm,
        }
    }

    pub fn return_value_test(&self) -> &ReturnValueTest {
        match self {
            Clause::Timelock(c) => &c.return_value_test,
            Clause::Rpc(c) => &c.return_value_test,
            Clause::Evm(c) => &c.return_value_test,
        }
    }

    pub fn parameters(&self) -> &[Value] {
        match self {
            Clause::Timelock(_) => &[],
            Clause::Rpc(c) => &c.parameters,
            Clause::Evm(c) => &c.parameters,
        }
    }

    /// Whether evaluating the clause needs the requester's wallet address
    pub fn references_user_address(&self) -> bool {
        let is_user = |v: &Value| v.as_str() == Some(USER_ADDRESS_PARAM);
        self.parameters().iter().any(is_user) || is_user(&self.return_value_test().value)
    }
}

/// Render a JSON value the way the builder shows it: strings unquoted
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn display_parameters(parameters: &[Value]) -> String {
    parameters
        .iter()
        .map(display_value)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let test = self.return_value_test();
        let expected = display_value(&test.value);
        match self {
            Clause::Timelock(_) => write!(f, "Timelock {} {}", test.comparator, expected),
            Clause::Rpc(c) => write!(
                f,
                "RPC Method {}({}) {} {}",
                c.method,
                display_parameters(&c.parameters),
                test.comparator,
                expected
            ),
            Clause::Evm(c) => {
                let names = parameters_for_contract_method(&c.method);
                let args = c
                    .parameters
                    .iter()
                    .enumerate()
                    .map(|(i, v)| match names.get(i) {
                        Some(name) => format!("{}={}", name, display_value(v)),
                        None => display_value(v),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "Contract {}({:?}) {}({}) {} {}",
                    c.standard_contract_type,
                    c.contract_address,
                    c.method,
                    args,
                    test.comparator,
                    expected
                )
            }
        }
    }
}
