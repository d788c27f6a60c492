//! Encrypt then decrypt with satisfied conditions

use super::common::{add_timelock, config, direct_shell, network, wallet, RecordingWallet, BLOCK_TIME};
use cbd_demo::app::{AppShell, DecryptPhase, DecryptionOutcome, Provisioning, View};
use cbd_demo::conditions::{ConditionKind, SelectionChange};
use ethers::types::U256;
use std::sync::Arc;

#[tokio::test]
async fn test_hello_world_round_trip() {
    let network = network(3);
    let shell = direct_shell(&network, config(2, 3)).await;
    shell.connect().await.unwrap();
    add_timelock(&shell, 0).await;

    let kit = shell.encrypt("hello-world").await.unwrap();
    assert!(kit.ciphertext_hex().starts_with("0x"));

    let outcome = shell.decrypt().await.unwrap();
    assert_eq!(outcome, DecryptionOutcome::Decrypted(b"hello-world".to_vec()));

    let View::Ready(view) = shell.view().await else {
        panic!("expected ready view");
    };
    assert_eq!(view.decrypted_text.as_deref(), Some("hello-world"));
    assert!(view.error_lines.is_empty());
    assert_eq!(view.decrypt_phase, DecryptPhase::Decrypted);
    assert_eq!(view.ciphertext, Some(kit.ciphertext_hex()));
}

#[tokio::test]
async fn test_round_trip_after_strategy_deployment() {
    let network = network(5);
    let config = config(2, 3);
    let shell = AppShell::new(
        config.clone(),
        Arc::new(RecordingWallet::new(wallet(&config))),
        Provisioning::Strategy {
            directory: Arc::new(network.clone()),
            deployer: Arc::new(network.clone()),
        },
    );
    shell.connect().await.unwrap();

    let View::Ready(before) = shell.view().await else {
        panic!("expected ready view");
    };
    assert!(before.can_deploy);
    assert!(!before.can_encrypt);

    let deployed = shell.deploy_strategy().await.unwrap();
    assert_eq!(deployed.label, "test");
    assert_eq!(deployed.strategy.cohort.ursulas.len(), 3);

    add_timelock(&shell, 0).await;
    shell.encrypt("hello-world").await.unwrap();
    let outcome = shell.decrypt().await.unwrap();
    assert_eq!(outcome.plaintext().as_deref(), Some("hello-world"));

    let View::Ready(after) = shell.view().await else {
        panic!("expected ready view");
    };
    assert_eq!(after.strategy_label.as_deref(), Some("test"));
    assert!(!after.can_deploy);
}

#[tokio::test]
async fn test_user_balance_condition_round_trip() {
    let config = config(2, 3);
    let session = wallet(&config);
    let reader = cbd_demo::StaticChainReader::new()
        .with_timestamp(BLOCK_TIME)
        .with_balance(session.address(), U256::from(10u64));
    let network = cbd_demo::LocalNetwork::new(3, Arc::new(reader));
    let (encrypter, decrypter) = network.provision_direct(2, 3).await.unwrap();
    let shell = AppShell::new(
        config,
        Arc::new(session),
        Provisioning::Direct {
            encrypter,
            decrypter,
        },
    );
    shell.connect().await.unwrap();

    shell
        .edit_builder(|b| {
            b.select(SelectionChange::Kind(ConditionKind::Rpc)).unwrap();
            b.select(SelectionChange::Comparator(
                cbd_demo::conditions::Comparator::Gte,
            ))
            .unwrap();
            b.set_parameter_value(":userAddress");
            b.set_return_value("10");
        })
        .await;
    shell.add_condition().await.unwrap();

    shell.encrypt("only for holders").await.unwrap();
    let outcome = shell.decrypt().await.unwrap();
    assert_eq!(outcome.plaintext().as_deref(), Some("only for holders"));
}
