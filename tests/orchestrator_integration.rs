mod common;

use common::{InstrumentedCustodian, StaticGate, alias, expired_window};
use seal_custody::{
    AuthOutcome, ChannelGate, CryptoConfig, CryptoManager, EncryptedEnvelope, Error, KeyCustodian,
    RotationConfig,
};
use std::sync::Arc;
use std::time::Duration;

fn manager_with<G: seal_custody::AuthenticationGate>(
    gate: G,
) -> (Arc<InstrumentedCustodian>, CryptoManager<InstrumentedCustodian, G>) {
    let custodian = Arc::new(InstrumentedCustodian::new());
    let manager = CryptoManager::new(custodian.clone(), Arc::new(gate), RotationConfig::default());
    (custodian, manager)
}

fn locked_config() -> CryptoConfig {
    CryptoConfig::builder("locked-key")
        .require_user_authentication(true)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_encrypt_decrypt_roundtrip() {
    let (custodian, manager) = manager_with(StaticGate(AuthOutcome::Success));
    let config = CryptoConfig::new("acct-key").unwrap();

    for plaintext in [
        &b""[..],
        &b"a"[..],
        &b"Hello, Seal-Custody!"[..],
        &[0u8; 4096][..],
    ] {
        let encoded = manager.encrypt_data(&config, plaintext).await.unwrap();
        let decrypted = manager.decrypt_data(&config, &encoded).await.unwrap();
        assert_eq!(decrypted, plaintext);
    }
    // 只在首次使用时生成
    assert_eq!(custodian.generations(), 1);
}

#[tokio::test]
async fn test_same_plaintext_yields_distinct_envelopes() {
    let (_, manager) = manager_with(StaticGate(AuthOutcome::Success));
    let config = CryptoConfig::new("acct-key").unwrap();

    let first = manager.encrypt_envelope(&config, b"same").await.unwrap();
    let second = manager.encrypt_envelope(&config, b"same").await.unwrap();
    assert_ne!(first.iv(), second.iv());
    assert_ne!(first.to_base64(), second.to_base64());
}

#[tokio::test]
async fn test_cancelled_authentication_produces_no_envelope() {
    let (custodian, manager) = manager_with(StaticGate(AuthOutcome::Failure("cancelled".into())));
    let config = locked_config();

    let result = manager.encrypt_data(&config, b"secret").await;
    assert!(matches!(result, Err(Error::Authentication(ref reason)) if reason == "cancelled"));

    // 密钥已解析，但没有执行加密
    assert!(custodian.contains_alias(config.key_alias()));
    assert_eq!(custodian.inner().requires_authentication(config.key_alias()), Some(true));
}

#[tokio::test]
async fn test_channel_gate_flow() {
    let (gate, mut prompts) = ChannelGate::new(4);
    let (_, manager) = manager_with(gate);
    let config = locked_config();

    let ui = tokio::spawn(async move {
        let mut titles = Vec::new();
        while let Some(prompt) = prompts.recv().await {
            titles.push(prompt.request().title.clone());
            if titles.len() == 3 {
                prompt.cancel();
            } else {
                prompt.respond(AuthOutcome::Success);
            }
        }
        titles
    });

    let encoded = manager.encrypt_data(&config, b"guarded").await.unwrap();
    assert_eq!(manager.decrypt_data(&config, &encoded).await.unwrap(), b"guarded");
    assert!(matches!(
        manager.decrypt_data(&config, &encoded).await,
        Err(Error::Authentication(_))
    ));

    drop(manager);
    let titles = ui.await.unwrap();
    assert_eq!(titles, vec!["Encrypt Data", "Decrypt Data", "Decrypt Data"]);
}

#[tokio::test]
async fn test_channel_gate_timeout_is_authentication_failure() {
    let (gate, _prompts) = ChannelGate::new(1);
    let (_, manager) = manager_with(gate.with_timeout(Duration::from_millis(20)));

    let result = manager.encrypt_data(&locked_config(), b"secret").await;
    assert!(matches!(result, Err(Error::Authentication(ref reason)) if reason == "timed out"));
}

#[tokio::test]
async fn test_rotation_runs_after_use() {
    let (custodian, manager) = manager_with(StaticGate(AuthOutcome::Success));
    let config = CryptoConfig::new("acct-key").unwrap();
    custodian
        .generate_symmetric_key(config.key_alias(), 256, expired_window(1), false)
        .unwrap();
    let before = custodian.fetch_symmetric_key(config.key_alias()).unwrap();

    // 本次操作使用旧密钥，随后轮换
    let encoded = manager.encrypt_data(&config, b"payload").await.unwrap();
    let after = custodian.fetch_symmetric_key(config.key_alias()).unwrap();
    assert_ne!(before.as_bytes(), after.as_bytes());
    assert_eq!(custodian.generations(), 2);

    // 旧密钥产生的信封在轮换后不可再解密
    assert!(matches!(
        manager.decrypt_data(&config, &encoded).await,
        Err(Error::CryptoOperation { .. })
    ));
}

#[tokio::test]
async fn test_encryption_succeeds_when_rotation_fails() {
    let (custodian, manager) = manager_with(StaticGate(AuthOutcome::Success));
    let config = CryptoConfig::new("acct-key").unwrap();
    custodian
        .generate_symmetric_key(config.key_alias(), 256, expired_window(1), false)
        .unwrap();
    custodian.set_fail_generation(true);

    let encoded = manager.encrypt_data(&config, b"payload").await.unwrap();
    let decrypted = manager.decrypt_data(&config, &encoded).await.unwrap();
    assert_eq!(decrypted, b"payload");
    assert!(manager.lifecycle().is_rotation_needed(config.key_alias()));
}

#[tokio::test]
async fn test_key_generation_failure_propagates() {
    let (custodian, manager) = manager_with(StaticGate(AuthOutcome::Success));
    custodian.set_fail_generation(true);

    let result = manager
        .encrypt_data(&CryptoConfig::new("acct-key").unwrap(), b"x")
        .await;
    assert!(matches!(result, Err(Error::KeyGeneration { .. })));
}

#[tokio::test]
async fn test_malformed_envelopes_are_crypto_failures() {
    let (_, manager) = manager_with(StaticGate(AuthOutcome::Success));
    let config = CryptoConfig::new("acct-key").unwrap();

    for encoded in ["", "not base64!", "AAAA"] {
        assert!(matches!(
            manager.decrypt_data(&config, encoded).await,
            Err(Error::CryptoOperation { .. })
        ));
    }

    let envelope = manager.encrypt_envelope(&config, b"hello").await.unwrap();
    let mut bytes = envelope.to_bytes();
    bytes[0] ^= 0x80;
    let tampered = EncryptedEnvelope::from_bytes(&bytes).unwrap();
    assert!(matches!(
        manager.decrypt_envelope(&config, &tampered).await,
        Err(Error::CryptoOperation { .. })
    ));
}

#[tokio::test]
async fn test_independent_managers_do_not_share_keys() {
    let (_, first) = manager_with(StaticGate(AuthOutcome::Success));
    let (_, second) = manager_with(StaticGate(AuthOutcome::Success));
    let config = CryptoConfig::new("acct-key").unwrap();

    let encoded = first.encrypt_data(&config, b"isolated").await.unwrap();
    assert!(second.decrypt_data(&config, &encoded).await.is_err());
    assert!(second.lifecycle().custodian().contains_alias(&alias("acct-key")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_use_generates_once() {
    let (custodian, manager) = manager_with(StaticGate(AuthOutcome::Success));
    let manager = Arc::new(manager);
    let config = CryptoConfig::new("shared-key").unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let manager = Arc::clone(&manager);
            let config = config.clone();
            tokio::spawn(async move {
                let plaintext = format!("message {i}");
                let encoded = manager.encrypt_data(&config, plaintext.as_bytes()).await.unwrap();
                manager.decrypt_data(&config, &encoded).await.unwrap() == plaintext.as_bytes()
            })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap());
    }
    assert_eq!(custodian.generations(), 1);
}
