//! Builder cascade and clause construction

use cbd_demo::conditions::{
    apply_change, Comparator, ConditionBuilder, ConditionError, ConditionKind, ContractType,
    LogicalOperator, Selection, SelectionChange,
};
use serde_json::json;

const CONTRACT: &str = "0x1e988ba4692e52Bc50b375bcC8585b95c48AaD77";

#[test]
fn test_contract_type_change_resets_method_to_first() {
    let evm = apply_change(
        &Selection::default(),
        SelectionChange::Kind(ConditionKind::Evm),
    )
    .unwrap();
    let erc721 = apply_change(&evm, SelectionChange::ContractType(ContractType::Erc721)).unwrap();
    let owner_of = apply_change(&erc721, SelectionChange::ContractMethod("ownerOf".to_string())).unwrap();
    assert_eq!(owner_of.parameter_name, Some("tokenId"));

    let back = apply_change(&owner_of, SelectionChange::ContractType(ContractType::Erc20)).unwrap();
    assert_eq!(back.contract_method, "balanceOf");
    assert_eq!(back.parameter_name, Some("address"));
}

#[test]
fn test_method_change_resets_parameter_to_first() {
    let rpc = apply_change(
        &Selection::default(),
        SelectionChange::Kind(ConditionKind::Rpc),
    )
    .unwrap();
    let switched = apply_change(&rpc, SelectionChange::RpcMethod("balanceOf".to_string())).unwrap();
    assert_eq!(switched.rpc_method, "balanceOf");
    assert_eq!(switched.parameter_name, Some("address"));
}

#[test]
fn test_cascade_is_pure() {
    let before = Selection::default();
    let _ = apply_change(&before, SelectionChange::Kind(ConditionKind::Evm)).unwrap();
    assert_eq!(before, Selection::default());
}

#[test]
fn test_unknown_parameter_rejected() {
    let err = apply_change(
        &Selection::default(),
        SelectionChange::ParameterName("tokenId".to_string()),
    )
    .unwrap_err();
    assert!(matches!(err, ConditionError::UnknownParameter { .. }));
}

#[test]
fn test_owner_of_condition_from_form() {
    let mut builder = ConditionBuilder::new(5);
    builder.select(SelectionChange::Kind(ConditionKind::Evm)).unwrap();
    builder
        .select(SelectionChange::ContractType(ContractType::Erc721))
        .unwrap();
    builder
        .select(SelectionChange::ContractMethod("ownerOf".to_string()))
        .unwrap();
    builder.select(SelectionChange::Comparator(Comparator::Eq)).unwrap();
    builder.set_contract_address(CONTRACT);
    builder.set_parameter_value("5954");
    builder.set_return_value(":userAddress");

    let set = builder.add_to(None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&set.to_json()).unwrap();
    assert_eq!(value[0]["parameters"], json!([5954]));
    assert_eq!(value[0]["standardContractType"], json!("ERC721"));
    assert_eq!(value[0]["returnValueTest"]["value"], json!(":userAddress"));
}

#[test]
fn test_non_integer_token_id_is_rejected() {
    let mut builder = ConditionBuilder::new(5);
    builder.select(SelectionChange::Kind(ConditionKind::Evm)).unwrap();
    builder
        .select(SelectionChange::ContractType(ContractType::Erc721))
        .unwrap();
    builder
        .select(SelectionChange::ContractMethod("ownerOf".to_string()))
        .unwrap();
    builder.set_contract_address(CONTRACT);
    builder.set_parameter_value("abc");
    assert!(matches!(
        builder.build_clause(),
        Err(ConditionError::NotAnInteger { .. })
    ));
}

#[test]
fn test_evm_without_contract_address_is_configuration_error() {
    let mut builder = ConditionBuilder::new(5);
    builder.select(SelectionChange::Kind(ConditionKind::Evm)).unwrap();
    builder.set_parameter_value(":userAddress");
    let err = builder.build_clause().unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_operator_only_used_once_set_is_non_empty() {
    let mut builder = ConditionBuilder::new(5);
    builder.select(SelectionChange::Comparator(Comparator::Gt)).unwrap();
    builder.set_operator(LogicalOperator::Or);

    assert!(!ConditionBuilder::operator_enabled(None));
    let first = builder.add_to(None).unwrap();
    assert!(ConditionBuilder::operator_enabled(Some(&first)));

    let second = builder.add_to(Some(&first)).unwrap();
    assert_eq!(second.to_string(), "Timelock > 0 OR Timelock > 0");
}

#[test]
fn test_method_dropdown_follows_kind_and_contract_type() {
    let mut builder = ConditionBuilder::new(5);
    assert_eq!(builder.available_methods(), &["timelock"]);

    builder.select(SelectionChange::Kind(ConditionKind::Rpc)).unwrap();
    assert_eq!(builder.available_methods(), &["eth_getBalance", "balanceOf"]);

    builder.select(SelectionChange::Kind(ConditionKind::Evm)).unwrap();
    builder
        .select(SelectionChange::ContractType(ContractType::Erc721))
        .unwrap();
    assert_eq!(builder.available_methods(), &["balanceOf", "ownerOf"]);
}
