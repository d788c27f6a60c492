// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Condition set evaluation as performed by a service node

use ethers::types::{Address, U256};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

use super::chain::ChainReader;
use crate::conditions::clause::{EvmCondition, RpcCondition};
use crate::conditions::taxonomy::OWNER_OF_METHOD;
use crate::conditions::{Clause, ConditionContext, ConditionError, ConditionSet, ReturnValueTest};

/// A value on either side of a return value test
#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Number(U256),
    /// Always below zero; on-chain values never are
    Negative(i128),
    Text(String),
}

impl Operand {
    fn from_value(value: &Value) -> Result<Self, ConditionError> {
        match value {
            Value::Number(n) => {
                if let Some(n) = n.as_u64() {
                    Ok(Operand::Number(U256::from(n)))
                } else if let Some(n) = n.as_i64() {
                    Ok(Operand::Negative(i128::from(n)))
                } else {
                    Err(ConditionError::Evaluation(format!(
                        "unsupported numeric value {}",
                        n
                    )))
                }
            }
            Value::String(s) => Ok(if let Ok(n) = U256::from_dec_str(s) {
                Operand::Number(n)
            } else if let Some(n) = s.trim().parse::<i128>().ok().filter(|n| *n < 0) {
                Operand::Negative(n)
            } else {
                Operand::Text(s.clone())
            }),
            Value::Bool(b) => Ok(Operand::Text(b.to_string())),
            other => Err(ConditionError::Evaluation(format!(
                "cannot compare against {}",
                other
            ))),
        }
    }

    fn address(address: Address) -> Self {
        Operand::Text(format!("{:?}", address))
    }
}

/// Evaluate `set` left to right: `((c0 op1 c1) op2 c2) ...`
///
/// Every clause is evaluated; there is no short-circuiting and no precedence.
pub async fn evaluate_set(
    set: &ConditionSet,
    context: &ConditionContext,
    reader: &dyn ChainReader,
) -> Result<bool, ConditionError> {
    let first = set.first().ok_or(ConditionError::EmptySet)?;
    let mut result = evaluate_clause(first, context, reader).await?;
    for (operator, clause) in set.rest() {
        let next = evaluate_clause(clause, context, reader).await?;
        result = operator.apply(result, next);
    }
    Ok(result)
}

pub async fn evaluate_clause(
    clause: &Clause,
    context: &ConditionContext,
    reader: &dyn ChainReader,
) -> Result<bool, ConditionError> {
    let actual = match clause {
        Clause::Timelock(_) => {
            Operand::Number(U256::from(reader.block_timestamp(context.chain_id).await?))
        }
        Clause::Rpc(rpc) => evaluate_rpc(rpc, context, reader).await?,
        Clause::Evm(evm) => evaluate_evm(evm, context, reader).await?,
    };
    let passed = compare(&actual, clause.return_value_test(), context)?;
    debug!("{} -> {:?} => {}", clause, actual, passed);
    Ok(passed)
}

async fn evaluate_rpc(
    rpc: &RpcCondition,
    context: &ConditionContext,
    reader: &dyn ChainReader,
) -> Result<Operand, ConditionError> {
    // Both RPC methods read the native balance of their single address parameter
    let holder = address_parameter(&rpc.parameters, context)?;
    Ok(Operand::Number(reader.native_balance(rpc.chain, holder).await?))
}

async fn evaluate_evm(
    evm: &EvmCondition,
    context: &ConditionContext,
    reader: &dyn ChainReader,
) -> Result<Operand, ConditionError> {
    if evm.method == OWNER_OF_METHOD {
        let token_id = token_id_parameter(&evm.parameters, context)?;
        let owner = reader
            .token_owner(evm.chain, evm.contract_address, token_id)
            .await?;
        Ok(Operand::address(owner))
    } else {
        let holder = address_parameter(&evm.parameters, context)?;
        let balance = reader
            .token_balance(evm.chain, evm.contract_address, holder)
            .await?;
        Ok(Operand::Number(balance))
    }
}

fn single_parameter(parameters: &[Value], context: &ConditionContext) -> Result<Value, ConditionError> {
    match parameters {
        [value] => context.resolve(value),
        _ => Err(ConditionError::Evaluation(format!(
            "expected exactly one parameter, got {}",
            parameters.len()
        ))),
    }
}

fn address_parameter(parameters: &[Value], context: &ConditionContext) -> Result<Address, ConditionError> {
    let value = single_parameter(parameters, context)?;
    value
        .as_str()
        .and_then(|s| s.trim().parse::<Address>().ok())
        .ok_or_else(|| ConditionError::Evaluation(format!("{} is not an address", value)))
}

fn token_id_parameter(parameters: &[Value], context: &ConditionContext) -> Result<U256, ConditionError> {
    match Operand::from_value(&single_parameter(parameters, context)?)? {
        Operand::Number(id) => Ok(id),
        other => Err(ConditionError::Evaluation(format!(
            "{:?} is not a token id",
            other
        ))),
    }
}

fn compare(
    actual: &Operand,
    test: &ReturnValueTest,
    context: &ConditionContext,
) -> Result<bool, ConditionError> {
    let expected = Operand::from_value(&context.resolve(&test.value)?)?;
    let comparator = test.comparator;
    match (actual, &expected) {
        (Operand::Number(a), Operand::Number(b)) => Ok(comparator.holds(a.cmp(b))),
        (Operand::Number(_), Operand::Negative(_)) => Ok(comparator.holds(Ordering::Greater)),
        (Operand::Negative(_), Operand::Number(_)) => Ok(comparator.holds(Ordering::Less)),
        (Operand::Negative(a), Operand::Negative(b)) => Ok(comparator.holds(a.cmp(b))),
        (Operand::Text(a), Operand::Text(b)) if comparator.is_equality() => {
            let ordering = if a.eq_ignore_ascii_case(b) {
                Ordering::Equal
            } else {
                Ordering::Less
            };
            Ok(comparator.holds(ordering))
        }
        _ => Err(ConditionError::Evaluation(format!(
            "cannot apply {} to {:?} and {:?}",
            comparator, actual, expected
        ))),
    }
}
