// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Condition Sets
//!
//! An ordered sequence `Clause (Operator Clause)*`. Sets are values: appending
//! returns a new set and existing entries are never edited or removed. The
//! alternation invariant is enforced on every construction path, including
//! deserialization.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::clause::Clause;
use super::error::ConditionError;
use super::taxonomy::LogicalOperator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorEntry {
    pub operator: LogicalOperator,
}

/// One element of a condition set on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionEntry {
    Operator(OperatorEntry),
    Clause(Clause),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ConditionEntry>", into = "Vec<ConditionEntry>")]
pub struct ConditionSet {
    entries: Vec<ConditionEntry>,
}

impl ConditionSet {
    /// A set holding a single clause
    pub fn new(first: Clause) -> Self {
        Self {
            entries: vec![ConditionEntry::Clause(first)],
        }
    }

    /// Return a new set with `(operator, clause)` appended
    ///
    /// # Errors
    ///
    /// - [`ConditionError::UnexpectedOperator`] when an operator is given for an empty set
    /// - [`ConditionError::MissingOperator`] when the set is non-empty and no operator is given
    pub fn append(
        &self,
        operator: Option<LogicalOperator>,
        clause: Clause,
    ) -> Result<ConditionSet, ConditionError> {
        let mut entries = self.entries.clone();
        match (self.is_empty(), operator) {
            (true, Some(_)) => return Err(ConditionError::UnexpectedOperator),
            (false, None) => return Err(ConditionError::MissingOperator),
            (true, None) => {}
            (false, Some(operator)) => entries.push(ConditionEntry::Operator(OperatorEntry { operator })),
        }
        entries.push(ConditionEntry::Clause(clause));
        Ok(ConditionSet { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries, operators included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ConditionEntry] {
        &self.entries
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.entries.iter().filter_map(|e| match e {
            ConditionEntry::Clause(c) => Some(c),
            ConditionEntry::Operator(_) => None,
        })
    }

    pub fn first(&self) -> Option<&Clause> {
        self.clauses().next()
    }

    /// The `(operator, clause)` pairs following the first clause, in order
    pub fn rest(&self) -> impl Iterator<Item = (LogicalOperator, &Clause)> {
        self.entries
            .get(1..)
            .unwrap_or(&[])
            .chunks_exact(2)
            .filter_map(|pair| match pair {
                [ConditionEntry::Operator(op), ConditionEntry::Clause(c)] => Some((op.operator, c)),
                _ => None,
            })
    }

    pub fn references_user_address(&self) -> bool {
        self.clauses().any(Clause::references_user_address)
    }

    /// Compact JSON, the form bound to ciphertexts
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.entries).unwrap_or_default()
    }

    /// One pretty-printed JSON block per entry, as shown in the condition preview
    pub fn preview_json(&self) -> String {
        self.entries
            .iter()
            .filter_map(|e| serde_json::to_string_pretty(e).ok())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// SHA-256 of the compact JSON
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.to_json().as_bytes());
        hasher.finalize().into()
    }
}

impl TryFrom<Vec<ConditionEntry>> for ConditionSet {
    type Error = ConditionError;

    fn try_from(entries: Vec<ConditionEntry>) -> Result<Self, Self::Error> {
        let mut set = ConditionSet::default();
        let mut pending: Option<LogicalOperator> = None;
        for entry in entries {
            match entry {
                ConditionEntry::Operator(op) => {
                    if set.is_empty() {
                        return Err(ConditionError::UnexpectedOperator);
                    }
                    if pending.replace(op.operator).is_some() {
                        return Err(ConditionError::MalformedSet(
                            "two logical operators are adjacent".to_string(),
                        ));
                    }
                }
                ConditionEntry::Clause(clause) => {
                    set = set.append(pending.take(), clause)?;
                }
            }
        }
        if pending.is_some() {
            return Err(ConditionError::MalformedSet(
                "condition set ends with a logical operator".to_string(),
            ));
        }
        Ok(set)
    }
}

impl From<ConditionSet> for Vec<ConditionEntry> {
    fn from(set: ConditionSet) -> Self {
        set.entries
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.first() else {
            return f.write_str("(no conditions)");
        };
        write!(f, "{}", first)?;
        for (operator, clause) in self.rest() {
            write!(f, " {} {}", operator.as_str().to_uppercase(), clause)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::clause::{create_clause, ClauseParams};
    use crate::conditions::taxonomy::{Comparator, ConditionKind};
    use serde_json::json;

    fn timelock(value: i64) -> Clause {
        create_clause(
            ConditionKind::Timelock,
            ClauseParams {
                comparator: Some(Comparator::Gt),
                value: Some(json!(value)),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_fresh_set_has_no_operator() {
        let set = ConditionSet::default().append(None, timelock(0)).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set, ConditionSet::new(timelock(0)));
    }

    #[test]
    fn test_append_returns_new_set() {
        let original = ConditionSet::new(timelock(0));
        let extended = original
            .append(Some(LogicalOperator::Or), timelock(1))
            .unwrap();
        assert_eq!(original.len(), 1);
        assert_eq!(extended.len(), 3);
        assert_eq!(extended.rest().count(), 1);
    }

    #[test]
    fn test_deserialize_rejects_broken_alternation() {
        let leading: Result<ConditionSet, _> = serde_json::from_value(json!([
            {"operator": "and"},
            {"method": "timelock", "returnValueTest": {"comparator": ">", "value": 0}}
        ]));
        assert!(leading.is_err());

        let trailing: Result<ConditionSet, _> = serde_json::from_value(json!([
            {"method": "timelock", "returnValueTest": {"comparator": ">", "value": 0}},
            {"operator": "or"}
        ]));
        assert!(trailing.is_err());

        let adjacent: Result<ConditionSet, _> = serde_json::from_value(json!([
            {"method": "timelock", "returnValueTest": {"comparator": ">", "value": 0}},
            {"operator": "or"},
            {"operator": "and"},
            {"method": "timelock", "returnValueTest": {"comparator": ">", "value": 1}}
        ]));
        assert!(adjacent.is_err());
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let set = ConditionSet::new(timelock(0))
            .append(Some(LogicalOperator::And), timelock(5))
            .unwrap();
        let parsed: ConditionSet = serde_json::from_str(&set.to_json()).unwrap();
        assert_eq!(parsed, set);
        assert_eq!(parsed.to_string(), "Timelock > 0 AND Timelock > 5");
    }

    #[test]
    fn test_digest_changes_with_content() {
        let a = ConditionSet::new(timelock(0));
        let b = ConditionSet::new(timelock(1));
        assert_ne!(a.digest(), b.digest());
        assert_eq!(a.digest(), a.clone().digest());
    }
}
