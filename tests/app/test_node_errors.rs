//! Outcomes when nodes refuse, fail or stay silent

use super::common::{add_timelock, config, direct_shell, network, BLOCK_TIME};
use cbd_demo::app::{DecryptPhase, DecryptionOutcome};
use cbd_demo::sdk::local::{NodeBehavior, CONDITIONS_NOT_SATISFIED};

#[tokio::test]
async fn test_every_failing_node_is_listed() {
    let network = network(5);
    let shell = direct_shell(&network, config(3, 5)).await;
    shell.connect().await.unwrap();
    add_timelock(&shell, 0).await;
    shell.encrypt("hello-world").await.unwrap();

    network
        .set_all_behaviors(NodeBehavior::Faulty("node unavailable".to_string()))
        .await;
    let outcome = shell.decrypt().await.unwrap();
    assert!(matches!(outcome, DecryptionOutcome::NodeErrors(_)));

    let state = shell.state().await;
    assert_eq!(state.errors.len(), 5);
    assert!(state.decrypted_text.is_none());
    assert_eq!(state.phase, DecryptPhase::FailedWithNodeErrors);

    let ursulas = network.ursulas().await;
    for line in &state.errors {
        let (address, error) = line.split_once(" - ").unwrap();
        assert!(ursulas
            .iter()
            .any(|u| format!("{:?}", u.checksum_address) == address));
        assert_eq!(error, "node unavailable");
    }
}

#[tokio::test]
async fn test_unsatisfied_conditions_reported_by_each_node() {
    let network = network(3);
    let shell = direct_shell(&network, config(2, 3)).await;
    shell.connect().await.unwrap();
    add_timelock(&shell, BLOCK_TIME + 3600).await;
    shell.encrypt("too early").await.unwrap();

    let outcome = shell.decrypt().await.unwrap();
    let lines = outcome.error_lines();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.ends_with(CONDITIONS_NOT_SATISFIED)));
}

#[tokio::test]
async fn test_silent_cohort_is_inconclusive() {
    let network = network(3);
    let shell = direct_shell(&network, config(2, 3)).await;
    shell.connect().await.unwrap();
    add_timelock(&shell, 0).await;
    shell.encrypt("hello-world").await.unwrap();

    network.set_all_behaviors(NodeBehavior::Offline).await;
    let outcome = shell.decrypt().await.unwrap();
    assert_eq!(outcome, DecryptionOutcome::Inconclusive);

    let state = shell.state().await;
    assert_eq!(state.phase, DecryptPhase::Inconclusive);
    assert!(state.errors.is_empty());
    assert!(state.decrypted_text.is_none());
}

#[tokio::test]
async fn test_threshold_met_despite_one_failing_node() {
    let network = network(3);
    let shell = direct_shell(&network, config(2, 3)).await;
    shell.connect().await.unwrap();
    add_timelock(&shell, 0).await;
    shell.encrypt("hello-world").await.unwrap();

    let first = network.ursulas().await[0].checksum_address;
    network
        .set_behavior(first, NodeBehavior::Faulty("timeout".to_string()))
        .await
        .unwrap();
    let outcome = shell.decrypt().await.unwrap();
    assert_eq!(outcome.plaintext().as_deref(), Some("hello-world"));
}
