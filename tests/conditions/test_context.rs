//! Condition context construction and `:userAddress` proofs

use cbd_demo::conditions::{
    create_clause, ClauseParams, Comparator, ConditionContext, ConditionError, ConditionKind,
    ConditionSet,
};
use cbd_demo::wallet::{LocalWalletSession, WalletProvider};
use serde_json::json;

fn set(parameter: &str) -> ConditionSet {
    ConditionSet::new(
        create_clause(
            ConditionKind::Rpc,
            ClauseParams {
                comparator: Some(Comparator::Gte),
                value: Some(json!(0)),
                method: Some("eth_getBalance".to_string()),
                parameters: Some(vec![json!(parameter)]),
                chain: Some(5),
                ..Default::default()
            },
        )
        .unwrap(),
    )
}

#[test]
fn test_user_address_resolves_to_signer() {
    let wallet = LocalWalletSession::random(5, vec![5]);
    let context = tokio_test::block_on(async {
        wallet.activate().await.unwrap();
        ConditionContext::build(&set(":userAddress"), &wallet).await.unwrap()
    });

    assert_eq!(context.chain_id, 5);
    assert_eq!(context.requester, Some(wallet.address()));
    assert_eq!(context.verified_user_address().unwrap(), wallet.address());
    assert_eq!(
        context.resolve(&json!(":userAddress")).unwrap(),
        json!(format!("{:?}", wallet.address()))
    );
}

#[test]
fn test_no_proof_without_user_address_reference() {
    let wallet = LocalWalletSession::random(5, vec![5]);
    let context = tokio_test::block_on(async {
        wallet.activate().await.unwrap();
        ConditionContext::build(&set("0x0000000000000000000000000000000000000001"), &wallet)
            .await
            .unwrap()
    });
    assert!(context.user_address.is_none());
    assert!(matches!(
        context.verified_user_address(),
        Err(ConditionError::MissingContextVariable(_))
    ));
}

#[test]
fn test_forged_proof_rejected() {
    let wallet = LocalWalletSession::random(5, vec![5]);
    let other = LocalWalletSession::random(5, vec![5]);
    let mut context = tokio_test::block_on(async {
        wallet.activate().await.unwrap();
        ConditionContext::build(&set(":userAddress"), &wallet).await.unwrap()
    });
    if let Some(proof) = context.user_address.as_mut() {
        proof.address = other.address();
    }
    assert!(context.verified_user_address().is_err());
}

#[tokio::test]
async fn test_disconnected_wallet_cannot_build_context() {
    let wallet = LocalWalletSession::random(5, vec![5]);
    assert!(ConditionContext::build(&set(":userAddress"), &wallet)
        .await
        .is_err());
}
