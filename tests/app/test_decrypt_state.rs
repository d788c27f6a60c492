//! Decrypt state resets and the per-kit in-flight marker

use super::common::{add_timelock, config, network, wallet};
use async_trait::async_trait;
use cbd_demo::app::{AppError, AppShell, DecryptPhase, Provisioning, View};
use cbd_demo::conditions::ConditionContext;
use cbd_demo::sdk::{Decrypter, MessageKit, PolicyMessageKit, SdkError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Holds `retrieve` until released once armed
struct GatedDecrypter {
    inner: Arc<dyn Decrypter>,
    armed: AtomicBool,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl Decrypter for GatedDecrypter {
    async fn retrieve(
        &self,
        message_kits: &[MessageKit],
        context: &ConditionContext,
    ) -> Result<Vec<PolicyMessageKit>, SdkError> {
        if self.armed.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.retrieve(message_kits, context).await
    }

    fn decrypt(&self, policy_message_kit: &PolicyMessageKit) -> Result<Vec<u8>, SdkError> {
        self.inner.decrypt(policy_message_kit)
    }
}

async fn gated_shell() -> (AppShell, Arc<GatedDecrypter>) {
    let network = network(3);
    let config = config(2, 3);
    let (encrypter, decrypter) = network.provision_direct(2, 3).await.unwrap();
    let gated = Arc::new(GatedDecrypter {
        inner: decrypter,
        armed: AtomicBool::new(false),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let shell = AppShell::new(
        config.clone(),
        Arc::new(wallet(&config)),
        Provisioning::Direct {
            encrypter,
            decrypter: gated.clone(),
        },
    );
    shell.connect().await.unwrap();
    add_timelock(&shell, 0).await;
    shell.encrypt("hello-world").await.unwrap();
    (shell, gated)
}

#[tokio::test]
async fn test_second_decrypt_clears_previous_result_before_resolving() {
    let (shell, gated) = gated_shell().await;
    shell.decrypt().await.unwrap();
    assert_eq!(
        shell.state().await.decrypted_text.as_deref(),
        Some("hello-world")
    );

    gated.armed.store(true, Ordering::SeqCst);
    let pending = tokio::spawn({
        let shell = shell.clone();
        async move { shell.decrypt().await }
    });
    gated.entered.notified().await;

    let state = shell.state().await;
    assert!(state.decrypted_text.is_none());
    assert!(state.errors.is_empty());
    assert_eq!(state.phase, DecryptPhase::Retrieving);
    assert_eq!(shell.view().await, View::Loading);

    gated.release.notify_one();
    let outcome = pending.await.unwrap().unwrap();
    assert_eq!(outcome.plaintext().as_deref(), Some("hello-world"));
    assert!(!shell.is_loading());
}

#[tokio::test]
async fn test_concurrent_decrypt_of_same_kit_rejected() {
    let (shell, gated) = gated_shell().await;
    gated.armed.store(true, Ordering::SeqCst);

    let pending = tokio::spawn({
        let shell = shell.clone();
        async move { shell.decrypt().await }
    });
    gated.entered.notified().await;

    let err = shell.decrypt().await.unwrap_err();
    assert!(matches!(err, AppError::DecryptInFlight(_)));
    assert_eq!(err.error_code(), "DECRYPT_IN_FLIGHT");

    gated.release.notify_one();
    assert!(pending.await.unwrap().is_ok());

    // The marker is gone once the first run finishes
    gated.armed.store(false, Ordering::SeqCst);
    assert!(shell.decrypt().await.is_ok());
}
