// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Condition Builder
//!
//! Form state for composing one clause at a time. Dropdown options come from
//! the taxonomy tables; changing an upstream selector resets every dependent
//! selector to its first valid option via [`apply_change`], a pure function,
//! so the form can never hold a method/parameter pairing that does not exist.
//!
//! Cascade rules:
//!
//! - kind change -> all method, contract type and parameter selectors reset
//! - contract type change -> contract method = first method of the type,
//!   parameter = first parameter of that method
//! - contract/rpc method change -> parameter = first parameter of the method

use serde_json::Value;
use tracing::debug;

use super::clause::{create_clause, Clause, ClauseParams};
use super::error::ConditionError;
use super::set::ConditionSet;
use super::taxonomy::{
    methods_for_contract_type, parameters_for, ConditionKind, Comparator, ContractType,
    LogicalOperator, OWNER_OF_METHOD, RPC_METHODS, STANDARD_CONTRACT_TYPES, TIMELOCK_METHOD,
};

/// Dropdown selections of the builder form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub kind: ConditionKind,
    pub comparator: Comparator,
    pub rpc_method: &'static str,
    pub contract_type: ContractType,
    pub contract_method: &'static str,
    /// `None` for kinds whose method declares no parameters
    pub parameter_name: Option<&'static str>,
}

/// A single dropdown change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Kind(ConditionKind),
    Comparator(Comparator),
    RpcMethod(String),
    ContractType(ContractType),
    ContractMethod(String),
    ParameterName(String),
}

impl Selection {
    /// First valid option of every selector for `kind`
    pub fn defaults_for(kind: ConditionKind, comparator: Comparator) -> Self {
        let contract_type = STANDARD_CONTRACT_TYPES[0];
        let mut selection = Self {
            kind,
            comparator,
            rpc_method: RPC_METHODS[0],
            contract_type,
            contract_method: methods_for_contract_type(contract_type)[0],
            parameter_name: None,
        };
        selection.parameter_name = selection.first_parameter();
        selection
    }

    /// Method of the active kind
    pub fn active_method(&self) -> &'static str {
        match self.kind {
            ConditionKind::Timelock => TIMELOCK_METHOD,
            ConditionKind::Rpc => self.rpc_method,
            ConditionKind::Evm => self.contract_method,
        }
    }

    /// Parameter names offered for the active method
    pub fn available_parameters(&self) -> &'static [&'static str] {
        parameters_for(self.kind, self.active_method())
    }

    fn first_parameter(&self) -> Option<&'static str> {
        self.available_parameters().first().copied()
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::defaults_for(ConditionKind::ALL[0], Comparator::ALL[0])
    }
}

fn lookup(table: &'static [&'static str], name: &str) -> Option<&'static str> {
    table.iter().copied().find(|candidate| *candidate == name)
}

/// Apply one selector change, resetting every downstream selector
///
/// # Errors
///
/// Returns a configuration error when the new value is not declared for its
/// upstream selection (e.g. `ownerOf` on an ERC20 contract).
pub fn apply_change(
    selection: &Selection,
    change: SelectionChange,
) -> Result<Selection, ConditionError> {
    let mut next = *selection;
    match change {
        SelectionChange::Kind(kind) => {
            next = Selection::defaults_for(kind, selection.comparator);
        }
        SelectionChange::Comparator(comparator) => {
            next.comparator = comparator;
        }
        SelectionChange::RpcMethod(method) => {
            next.rpc_method = lookup(RPC_METHODS, &method).ok_or(ConditionError::UnknownMethod {
                method,
                context: "rpc conditions".to_string(),
            })?;
            if next.kind == ConditionKind::Rpc {
                next.parameter_name = next.first_parameter();
            }
        }
        SelectionChange::ContractType(contract_type) => {
            next.contract_type = contract_type;
            next.contract_method = methods_for_contract_type(contract_type)[0];
            if next.kind == ConditionKind::Evm {
                next.parameter_name = next.first_parameter();
            }
        }
        SelectionChange::ContractMethod(method) => {
            next.contract_method = lookup(methods_for_contract_type(next.contract_type), &method)
                .ok_or_else(|| ConditionError::UnknownMethod {
                    method,
                    context: format!("{} contracts", next.contract_type),
                })?;
            if next.kind == ConditionKind::Evm {
                next.parameter_name = next.first_parameter();
            }
        }
        SelectionChange::ParameterName(name) => {
            next.parameter_name = Some(lookup(next.available_parameters(), &name).ok_or_else(
                || ConditionError::UnknownParameter {
                    parameter: name,
                    method: next.active_method().to_string(),
                },
            )?);
        }
    }
    Ok(next)
}

/// Parse the free-text return value: integer literals become numbers
pub fn parse_return_value(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Some(Value::from(n));
    }
    Some(Value::String(trimmed.to_string()))
}

/// Turn the free-text parameter value into the clause parameter list
///
/// `ownerOf` takes a token id, so its value is parsed as a base-10 integer.
/// Every other method receives the raw string.
pub fn coerce_parameter(method: &str, raw: &str) -> Result<Value, ConditionError> {
    if method == OWNER_OF_METHOD {
        let token_id = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConditionError::NotAnInteger {
                parameter: "tokenId".to_string(),
                value: raw.to_string(),
            })?;
        return Ok(Value::from(token_id));
    }
    Ok(Value::String(raw.to_string()))
}

/// The builder form: selectors plus free-text inputs
#[derive(Debug, Clone)]
pub struct ConditionBuilder {
    selection: Selection,
    operator: LogicalOperator,
    return_value: String,
    parameter_value: Option<String>,
    contract_address: String,
    chain: u64,
}

impl ConditionBuilder {
    /// New form targeting `chain` for RPC and EVM clauses
    pub fn new(chain: u64) -> Self {
        Self {
            selection: Selection::default(),
            operator: LogicalOperator::ALL[0],
            return_value: "0".to_string(),
            parameter_value: None,
            contract_address: String::new(),
            chain,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn operator(&self) -> LogicalOperator {
        self.operator
    }

    pub fn chain(&self) -> u64 {
        self.chain
    }

    /// Change one selector, cascading resets downstream
    pub fn select(&mut self, change: SelectionChange) -> Result<&Selection, ConditionError> {
        let next = apply_change(&self.selection, change)?;
        if next != self.selection {
            debug!(from = ?self.selection, to = ?next, "builder selection changed");
        }
        self.selection = next;
        Ok(&self.selection)
    }

    pub fn set_operator(&mut self, operator: LogicalOperator) {
        self.operator = operator;
    }

    pub fn set_return_value(&mut self, value: impl Into<String>) {
        self.return_value = value.into();
    }

    pub fn set_parameter_value(&mut self, value: impl Into<String>) {
        self.parameter_value = Some(value.into());
    }

    pub fn set_contract_address(&mut self, address: impl Into<String>) {
        self.contract_address = address.into();
    }

    /// The operator selector is only offered once the set has a clause
    pub fn operator_enabled(set: Option<&ConditionSet>) -> bool {
        set.map(|s| !s.is_empty()).unwrap_or(false)
    }

    /// Options for the method dropdown of the active kind
    pub fn available_methods(&self) -> &'static [&'static str] {
        match self.selection.kind {
            ConditionKind::Timelock => &[TIMELOCK_METHOD],
            ConditionKind::Rpc => RPC_METHODS,
            ConditionKind::Evm => methods_for_contract_type(self.selection.contract_type),
        }
    }

    /// Build a clause from the current form
    pub fn build_clause(&self) -> Result<Clause, ConditionError> {
        let kind = self.selection.kind;
        let method = self.selection.active_method();
        let parameters = match (kind, self.selection.parameter_name) {
            (ConditionKind::Timelock, _) | (_, None) => None,
            (_, Some(parameter_name)) => {
                let raw = self
                    .parameter_value
                    .as_deref()
                    .ok_or_else(|| ConditionError::missing(kind.as_str(), parameter_name))?;
                Some(vec![coerce_parameter(method, raw)?])
            }
        };

        let params = ClauseParams {
            comparator: Some(self.selection.comparator),
            value: parse_return_value(&self.return_value),
            method: Some(method.to_string()),
            parameters,
            contract_address: Some(self.contract_address.clone()),
            contract_type: Some(self.selection.contract_type),
            chain: Some(self.chain),
        };
        create_clause(kind, params)
    }

    /// Append the built clause to `set`, preceded by the selected operator
    /// when the set already holds a clause
    pub fn add_to(&self, set: Option<&ConditionSet>) -> Result<ConditionSet, ConditionError> {
        let clause = self.build_clause()?;
        let operator = Self::operator_enabled(set).then_some(self.operator);
        let base = set.cloned().unwrap_or_default();
        base.append(operator, clause)
    }

    /// Live one-line summary of the clause being composed
    pub fn summary(&self) -> String {
        match self.build_clause() {
            Ok(clause) => clause.to_string(),
            Err(e) => format!("incomplete condition: {}", e),
        }
    }
}
