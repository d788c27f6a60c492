//! Chain-switch bracket around strategy deployment

use super::common::{config, network, wallet, RecordingWallet};
use async_trait::async_trait;
use cbd_demo::app::{AppShell, Provisioning};
use cbd_demo::config::{GOERLI_CHAIN_ID, MUMBAI_CHAIN_ID};
use cbd_demo::sdk::local::LocalNetwork;
use cbd_demo::sdk::{DeployedStrategy, SdkError, Strategy, StrategyDeployer};
use cbd_demo::wallet::WalletProvider;
use std::sync::Arc;

/// Logs the wallet chain at deployment time, then delegates or fails
struct ObservedDeployer {
    network: LocalNetwork,
    wallet: RecordingWallet,
    fail: bool,
}

#[async_trait]
impl StrategyDeployer for ObservedDeployer {
    async fn deploy(
        &self,
        strategy: &Strategy,
        label: &str,
        wallet: &dyn WalletProvider,
    ) -> Result<DeployedStrategy, SdkError> {
        let chain = wallet.chain_id().await?;
        tokio::task::yield_now().await;
        self.wallet
            .events
            .lock()
            .unwrap()
            .push(format!("deploy@{}", chain));
        if self.fail {
            return Err(SdkError::Deployment("publisher rejected".to_string()));
        }
        self.network.deploy(strategy, label, wallet).await
    }
}

fn strategy_shell(fail: bool) -> (AppShell, RecordingWallet) {
    let network = network(5);
    let config = config(2, 3);
    let recording = RecordingWallet::new(wallet(&config));
    let deployer = ObservedDeployer {
        network: network.clone(),
        wallet: recording.clone(),
        fail,
    };
    let shell = AppShell::new(
        config,
        Arc::new(recording.clone()),
        Provisioning::Strategy {
            directory: Arc::new(network),
            deployer: Arc::new(deployer),
        },
    );
    (shell, recording)
}

#[tokio::test]
async fn test_deploy_switches_chain_and_restores_in_order() {
    let (shell, recording) = strategy_shell(false);
    shell.connect().await.unwrap();
    shell.deploy_strategy().await.unwrap();

    assert_eq!(
        recording.events(),
        vec![
            format!("switch:{}", MUMBAI_CHAIN_ID),
            format!("deploy@{}", MUMBAI_CHAIN_ID),
            format!("switch:{}", GOERLI_CHAIN_ID),
        ]
    );
    assert_eq!(recording.chain_id().await.unwrap(), GOERLI_CHAIN_ID);
}

#[tokio::test]
async fn test_failed_deploy_still_restores_chain_and_clears_loading() {
    let (shell, recording) = strategy_shell(true);
    shell.connect().await.unwrap();

    let err = shell.deploy_strategy().await.unwrap_err();
    assert_eq!(err.error_code(), "DEPLOYMENT_FAILED");
    assert_eq!(
        recording.events().last().cloned(),
        Some(format!("switch:{}", GOERLI_CHAIN_ID))
    );
    assert_eq!(recording.chain_id().await.unwrap(), GOERLI_CHAIN_ID);
    assert!(!shell.is_loading());
    assert_eq!(
        shell.state().await.last_error.map(|e| e.code),
        Some("DEPLOYMENT_FAILED")
    );
}

#[tokio::test]
async fn test_second_deploy_rejected() {
    let (shell, _recording) = strategy_shell(false);
    shell.connect().await.unwrap();
    shell.deploy_strategy().await.unwrap();
    assert_eq!(
        shell.deploy_strategy().await.unwrap_err().error_code(),
        "PRECONDITION_FAILED"
    );
}

#[tokio::test]
async fn test_deploy_requires_connected_wallet() {
    let (shell, recording) = strategy_shell(false);
    assert!(shell.deploy_strategy().await.is_err());
    assert!(recording.events().is_empty());
}

#[tokio::test]
async fn test_overlapping_deploys_create_one_strategy() {
    let (shell, recording) = strategy_shell(false);
    shell.connect().await.unwrap();

    let (a, b) = tokio::join!(shell.deploy_strategy(), shell.deploy_strategy());
    let (deployed, rejected) = match (a, b) {
        (Ok(deployed), Err(rejected)) | (Err(rejected), Ok(deployed)) => (deployed, rejected),
        (a, b) => panic!("expected exactly one deployment, got {:?} and {:?}", a.is_ok(), b.is_ok()),
    };
    assert_eq!(rejected.error_code(), "PRECONDITION_FAILED");

    let deploys = recording
        .events()
        .into_iter()
        .filter(|e| e.starts_with("deploy@"))
        .count();
    assert_eq!(deploys, 1);

    let cbd_demo::app::View::Ready(ready) = shell.view().await else {
        panic!("expected ready view");
    };
    assert_eq!(ready.strategy_label, Some(deployed.label));
    assert!(!ready.can_deploy);
}
