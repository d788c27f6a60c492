// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Condition Error Types
//!
//! Configuration errors raised while building clauses and condition sets, and
//! evaluation errors raised by service nodes checking a set against a context.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// A parameter required by the clause kind was not supplied
    #[error("Missing required parameter '{parameter}' for {kind} condition")]
    MissingParameter { kind: String, parameter: String },

    #[error("Unrecognized condition type {0}")]
    UnknownConditionKind(String),

    #[error("Unknown comparator: {0}")]
    UnknownComparator(String),

    #[error("Unknown logical operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown standard contract type: {0}")]
    UnknownContractType(String),

    /// Method is not declared for the clause kind or contract type
    #[error("Method '{method}' is not available for {context}")]
    UnknownMethod { method: String, context: String },

    /// Parameter name is not declared for the selected method
    #[error("Parameter '{parameter}' is not declared for method '{method}'")]
    UnknownParameter { parameter: String, method: String },

    #[error("Invalid contract address '{address}': {reason}")]
    InvalidContractAddress { address: String, reason: String },

    #[error("Parameter '{parameter}' must be an integer, got '{value}'")]
    NotAnInteger { parameter: String, value: String },

    /// An operator was supplied for an empty set
    #[error("A logical operator cannot precede the first condition")]
    UnexpectedOperator,

    /// A non-empty set was extended without an operator
    #[error("A logical operator is required between conditions")]
    MissingOperator,

    #[error("Condition set is empty")]
    EmptySet,

    /// Entries do not alternate clause, operator, clause
    #[error("Malformed condition set: {0}")]
    MalformedSet(String),

    /// A context variable referenced by the set was not provided
    #[error("Context variable {0} is not available")]
    MissingContextVariable(String),

    #[error("Condition evaluation failed: {0}")]
    Evaluation(String),
}

impl ConditionError {
    pub fn missing(kind: impl Into<String>, parameter: impl Into<String>) -> Self {
        ConditionError::MissingParameter {
            kind: kind.into(),
            parameter: parameter.into(),
        }
    }

    /// Get error code for logging
    pub fn error_code(&self) -> &'static str {
        match self {
            ConditionError::MissingParameter { .. } => "MISSING_PARAMETER",
            ConditionError::UnknownConditionKind(_) => "UNKNOWN_CONDITION_KIND",
            ConditionError::UnknownComparator(_) => "UNKNOWN_COMPARATOR",
            ConditionError::UnknownOperator(_) => "UNKNOWN_OPERATOR",
            ConditionError::UnknownContractType(_) => "UNKNOWN_CONTRACT_TYPE",
            ConditionError::UnknownMethod { .. } => "UNKNOWN_METHOD",
            ConditionError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            ConditionError::InvalidContractAddress { .. } => "INVALID_CONTRACT_ADDRESS",
            ConditionError::NotAnInteger { .. } => "NOT_AN_INTEGER",
            ConditionError::UnexpectedOperator => "UNEXPECTED_OPERATOR",
            ConditionError::MissingOperator => "MISSING_OPERATOR",
            ConditionError::EmptySet => "EMPTY_SET",
            ConditionError::MalformedSet(_) => "MALFORMED_SET",
            ConditionError::MissingContextVariable(_) => "MISSING_CONTEXT_VARIABLE",
            ConditionError::Evaluation(_) => "EVALUATION_FAILED",
        }
    }

    /// Configuration errors come from user input, the rest from evaluation
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            ConditionError::MissingContextVariable(_) | ConditionError::Evaluation(_)
        )
    }
}
