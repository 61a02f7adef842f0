//!
//! 集成测试的通用辅助类型
//!
#![allow(dead_code)]

use async_trait::async_trait;
use seal_custody::{
    AuthOutcome, AuthRequest, AuthenticationGate, Error, KeyAlias, KeyCustodian, KeyMaterial,
    KeyPairSpec, MemoryCustodian, Result, ValidityWindow,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// 包装 `MemoryCustodian`，统计生成次数并可切换为生成失败。
#[derive(Default)]
pub struct InstrumentedCustodian {
    inner: MemoryCustodian,
    generations: AtomicUsize,
    fail_generation: AtomicBool,
}

impl InstrumentedCustodian {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryCustodian {
        &self.inner
    }

    /// 对称密钥与密钥对的成功生成次数之和
    pub fn generations(&self) -> usize {
        self.generations.load(Ordering::SeqCst)
    }

    pub fn set_fail_generation(&self, fail: bool) {
        self.fail_generation.store(fail, Ordering::SeqCst);
    }

    fn check_generation(&self, alias: &KeyAlias) -> Result<()> {
        if self.fail_generation.load(Ordering::SeqCst) {
            return Err(Error::key_generation(alias, "custodian busy"));
        }
        Ok(())
    }
}

impl KeyCustodian for InstrumentedCustodian {
    fn generate_symmetric_key(
        &self,
        alias: &KeyAlias,
        key_size_bits: usize,
        validity: ValidityWindow,
        require_authentication: bool,
    ) -> Result<()> {
        self.check_generation(alias)?;
        self.inner
            .generate_symmetric_key(alias, key_size_bits, validity, require_authentication)?;
        self.generations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn generate_key_pair(&self, alias: &KeyAlias, spec: KeyPairSpec) -> Result<()> {
        self.check_generation(alias)?;
        self.inner.generate_key_pair(alias, spec)?;
        self.generations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn fetch_symmetric_key(&self, alias: &KeyAlias) -> Result<KeyMaterial> {
        self.inner.fetch_symmetric_key(alias)
    }

    fn fetch_private_key(&self, alias: &KeyAlias) -> Option<KeyMaterial> {
        self.inner.fetch_private_key(alias)
    }

    fn fetch_public_key(&self, alias: &KeyAlias) -> Option<KeyMaterial> {
        self.inner.fetch_public_key(alias)
    }

    fn list_aliases(&self) -> BTreeSet<KeyAlias> {
        self.inner.list_aliases()
    }

    fn delete_key(&self, alias: &KeyAlias) -> Result<()> {
        self.inner.delete_key(alias)
    }

    fn fetch_validity_window(&self, alias: &KeyAlias) -> Option<ValidityWindow> {
        self.inner.fetch_validity_window(alias)
    }

    fn requires_authentication(&self, alias: &KeyAlias) -> Option<bool> {
        self.inner.requires_authentication(alias)
    }
}

/// 总是返回固定结果的认证闸门
pub struct StaticGate(pub AuthOutcome);

#[async_trait]
impl AuthenticationGate for StaticGate {
    async fn request_authentication(&self, _request: AuthRequest) -> AuthOutcome {
        self.0.clone()
    }
}

pub fn alias(name: &str) -> KeyAlias {
    KeyAlias::new(name).unwrap()
}

/// 一个在 `days_ago` 天前就已过期的窗口
pub fn expired_window(days_ago: i64) -> ValidityWindow {
    let not_after = chrono::Utc::now() - chrono::Duration::days(days_ago);
    ValidityWindow::new(not_after - chrono::Duration::days(365), not_after).unwrap()
}
