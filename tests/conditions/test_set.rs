//! Condition set composition and wire format

use cbd_demo::conditions::{
    create_clause, Clause, ClauseParams, Comparator, ConditionEntry, ConditionError, ConditionKind,
    ConditionSet, LogicalOperator,
};
use serde_json::json;

fn timelock(comparator: Comparator, value: u64) -> Clause {
    create_clause(
        ConditionKind::Timelock,
        ClauseParams {
            comparator: Some(comparator),
            value: Some(json!(value)),
            ..Default::default()
        },
    )
    .unwrap()
}

fn balance_of_user() -> Clause {
    create_clause(
        ConditionKind::Rpc,
        ClauseParams {
            comparator: Some(Comparator::Gte),
            value: Some(json!(1)),
            method: Some("eth_getBalance".to_string()),
            parameters: Some(vec![json!(":userAddress")]),
            chain: Some(5),
            ..Default::default()
        },
    )
    .unwrap()
}

fn assert_alternates(set: &ConditionSet) {
    for (i, entry) in set.entries().iter().enumerate() {
        let is_operator = matches!(entry, ConditionEntry::Operator(_));
        assert_eq!(is_operator, i % 2 == 1, "entry {} out of place", i);
    }
    assert!(set.is_empty() || set.len() % 2 == 1, "set must end with a clause");
}

#[test]
fn test_sets_built_by_append_alternate() {
    let mut set = ConditionSet::default();
    for (i, operator) in [None, Some(LogicalOperator::And), Some(LogicalOperator::Or), Some(LogicalOperator::And)]
        .into_iter()
        .enumerate()
    {
        set = set.append(operator, timelock(Comparator::Gt, i as u64)).unwrap();
        assert_alternates(&set);
    }
    assert_eq!(set.len(), 7);
    assert_eq!(set.clauses().count(), 4);
}

#[test]
fn test_append_to_empty_rejects_operator() {
    let err = ConditionSet::default()
        .append(Some(LogicalOperator::Or), timelock(Comparator::Gt, 0))
        .unwrap_err();
    assert_eq!(err, ConditionError::UnexpectedOperator);
}

#[test]
fn test_append_to_non_empty_requires_operator() {
    let set = ConditionSet::new(timelock(Comparator::Gt, 0));
    let err = set.append(None, timelock(Comparator::Lt, 10)).unwrap_err();
    assert_eq!(err, ConditionError::MissingOperator);
    // The original set is untouched
    assert_eq!(set.len(), 1);
}

#[test]
fn test_wire_format() {
    let set = ConditionSet::new(timelock(Comparator::Gt, 0))
        .append(Some(LogicalOperator::And), balance_of_user())
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&set.to_json()).unwrap();
    assert_eq!(
        value,
        json!([
            {"method": "timelock", "returnValueTest": {"comparator": ">", "value": 0}},
            {"operator": "and"},
            {
                "chain": 5,
                "method": "eth_getBalance",
                "parameters": [":userAddress"],
                "returnValueTest": {"comparator": ">=", "value": 1}
            }
        ])
    );
    assert!(set.references_user_address());
    assert_eq!(
        set.to_string(),
        "Timelock > 0 AND RPC Method eth_getBalance(:userAddress) >= 1"
    );
}

#[test]
fn test_deserialize_round_trips_and_rejects_malformed_sets() {
    let set = ConditionSet::new(timelock(Comparator::Gt, 0))
        .append(Some(LogicalOperator::Or), timelock(Comparator::Lt, 5))
        .unwrap();
    let parsed: ConditionSet = serde_json::from_str(&set.to_json()).unwrap();
    assert_eq!(parsed, set);

    let leading = json!([{"operator": "and"}, {"method": "timelock", "returnValueTest": {"comparator": ">", "value": 0}}]);
    assert!(serde_json::from_value::<ConditionSet>(leading).is_err());

    let trailing = json!([{"method": "timelock", "returnValueTest": {"comparator": ">", "value": 0}}, {"operator": "or"}]);
    assert!(serde_json::from_value::<ConditionSet>(trailing).is_err());

    let adjacent = json!([
        {"method": "timelock", "returnValueTest": {"comparator": ">", "value": 0}},
        {"operator": "or"},
        {"operator": "and"},
        {"method": "timelock", "returnValueTest": {"comparator": ">", "value": 0}}
    ]);
    assert!(serde_json::from_value::<ConditionSet>(adjacent).is_err());
}

#[test]
fn test_deserialize_rejects_clause_whose_method_belongs_to_another_kind() {
    // Shaped like a timelock but naming an RPC method
    let disguised = json!([
        {"method": "timelock", "returnValueTest": {"comparator": ">", "value": 0}},
        {"operator": "or"},
        {"method": "eth_getBalance", "returnValueTest": {"comparator": ">", "value": 0}}
    ]);
    assert!(serde_json::from_value::<ConditionSet>(disguised).is_err());
}

#[test]
fn test_digest_tracks_content() {
    let a = ConditionSet::new(timelock(Comparator::Gt, 0));
    let b = ConditionSet::new(timelock(Comparator::Gt, 1));
    assert_ne!(a.digest(), b.digest());
    assert_eq!(a.digest(), a.clone().digest());
}
