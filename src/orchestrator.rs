//! Top-level entry point composing the lifecycle manager, the authentication gate
//! and the ciphers.
//!
//! Every symmetric call runs the same linear state machine once:
//! resolve the key (generating it on first use), pass the gate when the config
//! requires it, run the cipher, then check rotation as a side effect. Nothing is
//! retried automatically and no partial result is ever returned.
//!
//! ---
//!
//! 顶层入口，组合生命周期管理器、认证闸门与加解密组件。
//! 每次对称调用都只执行一遍线性状态机：解析密钥（首次使用时生成）、按配置通过认证闸门、
//! 执行密码学操作、最后以副作用方式检查轮换。不做任何自动重试，也从不返回部分结果。

use crate::asymmetric::AsymmetricCipher;
use crate::auth::{AuthRequest, AuthenticationGate};
use crate::common::config::{CryptoConfig, RotationConfig};
use crate::common::key::{KeyAlias, KeyMaterial};
use crate::custodian::KeyCustodian;
use crate::error::{Error, Result};
use crate::rotation::manager::{KeyLifecycleManager, RotationOutcome};
use crate::symmetric::{EncryptedEnvelope, EnvelopeCipher};
use std::sync::Arc;
use tracing::{debug, warn};

/// 带认证与轮换策略的加解密管理器。
///
/// 托管方和认证闸门都是注入的依赖，可以同时存在多个互不相关的实例。
pub struct CryptoManager<C, G>
where
    C: KeyCustodian + ?Sized,
    G: AuthenticationGate + ?Sized,
{
    lifecycle: KeyLifecycleManager<C>,
    gate: Arc<G>,
}

impl<C, G> CryptoManager<C, G>
where
    C: KeyCustodian + ?Sized,
    G: AuthenticationGate + ?Sized,
{
    pub fn new(custodian: Arc<C>, gate: Arc<G>, rotation: RotationConfig) -> Self {
        Self {
            lifecycle: KeyLifecycleManager::new(custodian, rotation),
            gate,
        }
    }

    pub fn lifecycle(&self) -> &KeyLifecycleManager<C> {
        &self.lifecycle
    }

    /// 加密并返回 Base64 编码的信封（IV ‖ 密文 ‖ 认证标签）。
    pub async fn encrypt_data(&self, config: &CryptoConfig, plaintext: &[u8]) -> Result<String> {
        let envelope = self.encrypt_envelope(config, plaintext).await?;
        Ok(envelope.to_base64())
    }

    /// 解密 `encrypt_data` 产生的 Base64 信封。
    pub async fn decrypt_data(&self, config: &CryptoConfig, encoded: &str) -> Result<Vec<u8>> {
        let key = self.resolve_key(config)?;
        self.pass_gate(config, AuthRequest::decrypt_prompt()).await?;

        let plaintext = EnvelopeCipher::decrypt_from_base64(encoded, &key)?;
        self.rotate_after_use(config);
        Ok(plaintext)
    }

    pub async fn encrypt_envelope(
        &self,
        config: &CryptoConfig,
        plaintext: &[u8],
    ) -> Result<EncryptedEnvelope> {
        let key = self.resolve_key(config)?;
        self.pass_gate(config, AuthRequest::encrypt_prompt()).await?;

        let envelope = EnvelopeCipher::encrypt(plaintext, &key)?;
        self.rotate_after_use(config);
        Ok(envelope)
    }

    pub async fn decrypt_envelope(
        &self,
        config: &CryptoConfig,
        envelope: &EncryptedEnvelope,
    ) -> Result<Vec<u8>> {
        let key = self.resolve_key(config)?;
        self.pass_gate(config, AuthRequest::decrypt_prompt()).await?;

        let plaintext = EnvelopeCipher::decrypt(envelope, &key)?;
        self.rotate_after_use(config);
        Ok(plaintext)
    }

    /// 用别名下的私钥签名，返回 Base64 签名。
    pub fn sign_data(&self, alias: &KeyAlias, data: &[u8]) -> Result<String> {
        let private_key = self.private_key(alias)?;
        AsymmetricCipher::sign(data, &private_key)
    }

    pub fn verify_data(&self, alias: &KeyAlias, data: &[u8], signature: &str) -> Result<bool> {
        let public_key = self.public_key(alias)?;
        AsymmetricCipher::verify(data, signature, &public_key)
    }

    /// 用别名下的 RSA 公钥加密，返回 Base64 密文。
    pub fn encrypt_for(&self, alias: &KeyAlias, plaintext: &[u8]) -> Result<String> {
        let public_key = self.public_key(alias)?;
        AsymmetricCipher::encrypt(plaintext, &public_key)
    }

    pub fn decrypt_from(&self, alias: &KeyAlias, ciphertext: &str) -> Result<Vec<u8>> {
        let private_key = self.private_key(alias)?;
        AsymmetricCipher::decrypt(ciphertext, &private_key)
    }

    fn resolve_key(&self, config: &CryptoConfig) -> Result<KeyMaterial> {
        let alias = config.key_alias();
        self.lifecycle.ensure_key_exists(config)?;
        let key = self.lifecycle.custodian().fetch_symmetric_key(alias)?;
        debug!(alias = %alias, "key resolved");
        Ok(key)
    }

    async fn pass_gate(&self, config: &CryptoConfig, request: AuthRequest) -> Result<()> {
        let alias = config.key_alias();
        if !config.require_user_authentication() {
            return Ok(());
        }

        debug!(alias = %alias, title = %request.title, "waiting for user authentication");
        let outcome = self.gate.request_authentication(request).await;
        if let Err(e) = outcome.into_result() {
            warn!(alias = %alias, error = %e, "authentication denied");
            return Err(e);
        }
        debug!(alias = %alias, "authentication passed");
        Ok(())
    }

    // 轮换结果不影响本次调用的返回值
    fn rotate_after_use(&self, config: &CryptoConfig) {
        let outcome = self.lifecycle.rotate_if_needed_with(config);
        if let RotationOutcome::Rotated(trigger) = outcome {
            debug!(alias = %config.key_alias(), ?trigger, "key rotated after use");
        }
    }

    fn private_key(&self, alias: &KeyAlias) -> Result<KeyMaterial> {
        self.lifecycle
            .custodian()
            .fetch_private_key(alias)
            .ok_or_else(|| Error::KeyNotFound(alias.clone()))
    }

    fn public_key(&self, alias: &KeyAlias) -> Result<KeyMaterial> {
        self.lifecycle
            .custodian()
            .fetch_public_key(alias)
            .ok_or_else(|| Error::KeyNotFound(alias.clone()))
    }
}
