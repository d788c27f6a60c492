// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Access Conditions
//!
//! The condition model behind every encrypted message:
//!
//! - **taxonomy**: fixed tables of kinds, comparators, methods and parameters
//! - **clause**: a single predicate (timelock, RPC call, EVM contract call)
//! - **set**: clauses interleaved with `and`/`or` operators
//! - **builder**: form state with cascading selector resets
//! - **context**: runtime values nodes evaluate a set against

pub mod builder;
pub mod clause;
pub mod context;
pub mod error;
pub mod set;
pub mod taxonomy;

pub use builder::{apply_change, ConditionBuilder, Selection, SelectionChange};
pub use clause::{create_clause, Clause, ClauseParams, ReturnValueTest};
pub use context::{ConditionContext, UserAddressProof};
pub use error::ConditionError;
pub use set::{ConditionEntry, ConditionSet};
pub use taxonomy::{Comparator, ConditionKind, ContractType, LogicalOperator, USER_ADDRESS_PARAM};
