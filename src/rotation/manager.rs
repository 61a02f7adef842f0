//! 密钥生命周期管理器
use crate::asymmetric::KeyPairSpec;
use crate::common::config::{CryptoConfig, RotationConfig};
use crate::common::key::{AES_KEY_SIZE_BITS, KeyAlias};
use crate::common::validity::ValidityWindow;
use crate::custodian::KeyCustodian;
use crate::error::Result;
use crate::rotation::{RotationPolicy, RotationTrigger};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info};

/// 一次轮换检查的结果。
///
/// 轮换是尽力而为的：失败只通过日志和 `Failed` 体现，从不向上传播为错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// 托管方没有为该别名记录有效期窗口
    NotApplicable,
    NotDue,
    Rotated(RotationTrigger),
    Failed(String),
}

impl RotationOutcome {
    pub fn is_rotated(&self) -> bool {
        matches!(self, RotationOutcome::Rotated(_))
    }
}

/// 重新生成时使用的参数
#[derive(Debug, Clone, Copy)]
struct Regeneration {
    rotation_interval_days: u32,
    validity_days: u32,
    /// `None` 表示沿用托管方登记的认证要求
    require_authentication: Option<bool>,
}

/// `KeyLifecycleManager` 负责带策略的密钥生成、轮换执行和删除。
///
/// 它持有注入的托管方和进程级 `RotationConfig`，没有全局状态，可以并存多个实例。
/// 同一别名上的 ensure / rotate / generate / delete 由按别名划分的互斥锁串行化，
/// 因此两个同时观察到过期窗口的调用方只会轮换一次。
pub struct KeyLifecycleManager<C: KeyCustodian + ?Sized> {
    custodian: Arc<C>,
    rotation: RotationConfig,
    locks: DashMap<KeyAlias, Arc<Mutex<()>>>,
}

impl<C: KeyCustodian + ?Sized> KeyLifecycleManager<C> {
    pub fn new(custodian: Arc<C>, rotation: RotationConfig) -> Self {
        Self {
            custodian,
            rotation,
            locks: DashMap::new(),
        }
    }

    pub fn custodian(&self) -> &Arc<C> {
        &self.custodian
    }

    pub fn rotation_config(&self) -> &RotationConfig {
        &self.rotation
    }

    /// 别名不存在时按配置生成对称密钥，否则什么也不做。
    pub fn ensure_key_exists(&self, config: &CryptoConfig) -> Result<()> {
        let alias = config.key_alias();
        let lock = self.alias_lock(alias);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.custodian.contains_alias(alias) {
            return Ok(());
        }
        self.generate_locked(
            alias,
            config.key_validity_days(),
            config.require_user_authentication(),
            Utc::now(),
        )
    }

    /// 无条件地在该别名下生成新的对称密钥，替换已有条目。
    pub fn generate_symmetric_key(&self, config: &CryptoConfig) -> Result<()> {
        let alias = config.key_alias();
        let lock = self.alias_lock(alias);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.generate_locked(
            alias,
            config.key_validity_days(),
            config.require_user_authentication(),
            Utc::now(),
        )
    }

    pub fn generate_key_pair(&self, alias: &KeyAlias, spec: KeyPairSpec) -> Result<()> {
        let lock = self.alias_lock(alias);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.custodian.generate_key_pair(alias, spec)?;
        info!(alias = %alias, ?spec, "generated key pair");
        Ok(())
    }

    /// 签名密钥的按需生成；别名已被占用时什么也不做。
    pub fn ensure_key_pair_exists(&self, alias: &KeyAlias, spec: KeyPairSpec) -> Result<()> {
        let lock = self.alias_lock(alias);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.custodian.contains_alias(alias) {
            return Ok(());
        }
        self.custodian.generate_key_pair(alias, spec)?;
        info!(alias = %alias, ?spec, "generated key pair");
        Ok(())
    }

    /// 按进程级轮换间隔判断该别名是否需要轮换。没有有效期窗口时为 `false`。
    pub fn is_rotation_needed(&self, alias: &KeyAlias) -> bool {
        let window = self.custodian.fetch_validity_window(alias);
        RotationPolicy::new(self.rotation.rotation_interval_days()).is_due(window.as_ref(), Utc::now())
    }

    /// 到期时以默认有效期重新生成，认证要求沿用托管方登记的值。
    pub fn rotate_if_needed(&self, alias: &KeyAlias, rotation_interval_days: u32) -> RotationOutcome {
        self.rotate_if_needed_at(alias, rotation_interval_days, Utc::now())
    }

    /// 与 `rotate_if_needed` 相同，但以给定时刻作为“现在”。
    pub fn rotate_if_needed_at(
        &self,
        alias: &KeyAlias,
        rotation_interval_days: u32,
        now: DateTime<Utc>,
    ) -> RotationOutcome {
        let params = Regeneration {
            rotation_interval_days,
            validity_days: self.rotation.default_validity_days(),
            require_authentication: None,
        };
        self.rotate(alias, params, now)
    }

    /// 按别名自身的配置轮换，新密钥沿用配置中的有效期和认证要求。
    pub fn rotate_if_needed_with(&self, config: &CryptoConfig) -> RotationOutcome {
        let params = Regeneration {
            rotation_interval_days: config.key_rotation_interval_days(),
            validity_days: config.key_validity_days(),
            require_authentication: Some(config.require_user_authentication()),
        };
        self.rotate(config.key_alias(), params, Utc::now())
    }

    /// 对所有带有效期窗口的别名执行一次轮换检查。
    ///
    /// 这是周期性调度器每次应当调用的工作单元。
    pub fn rotate_all(&self) -> Vec<(KeyAlias, RotationOutcome)> {
        let interval = self.rotation.rotation_interval_days();
        self.custodian
            .list_aliases()
            .into_iter()
            .filter(|alias| self.custodian.fetch_validity_window(alias).is_some())
            .map(|alias| {
                let outcome = self.rotate_if_needed(&alias, interval);
                (alias, outcome)
            })
            .collect()
    }

    /// 删除别名；这是密钥生命周期的终态。
    pub fn delete_key(&self, alias: &KeyAlias) -> Result<()> {
        let result = {
            let lock = self.alias_lock(alias);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.custodian.delete_key(alias)
        };
        self.release_lock(alias);

        result?;
        info!(alias = %alias, "deleted key");
        Ok(())
    }

    fn rotate(&self, alias: &KeyAlias, params: Regeneration, now: DateTime<Utc>) -> RotationOutcome {
        let outcome = {
            let lock = self.alias_lock(alias);
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.rotate_locked(alias, params, now)
        };
        if outcome == RotationOutcome::NotApplicable && !self.custodian.contains_alias(alias) {
            self.release_lock(alias);
        }
        outcome
    }

    fn rotate_locked(
        &self,
        alias: &KeyAlias,
        params: Regeneration,
        now: DateTime<Utc>,
    ) -> RotationOutcome {
        // 持锁读取窗口，后到的调用方看到的是已经替换过的新窗口
        let window = self.custodian.fetch_validity_window(alias);
        if window.is_none() {
            return RotationOutcome::NotApplicable;
        }
        let Some(trigger) =
            RotationPolicy::new(params.rotation_interval_days).evaluate(window.as_ref(), now)
        else {
            debug!(alias = %alias, "rotation not due");
            return RotationOutcome::NotDue;
        };

        let require_authentication = params
            .require_authentication
            .or_else(|| self.custodian.requires_authentication(alias))
            .unwrap_or(false);
        match self.generate_locked(alias, params.validity_days, require_authentication, now) {
            Ok(()) => {
                info!(alias = %alias, ?trigger, "Key '{alias}' rotated successfully");
                RotationOutcome::Rotated(trigger)
            }
            Err(e) => {
                error!(alias = %alias, error = %e, "Key rotation failed");
                RotationOutcome::Failed(e.to_string())
            }
        }
    }

    fn generate_locked(
        &self,
        alias: &KeyAlias,
        validity_days: u32,
        require_authentication: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let window = ValidityWindow::starting_at(now, validity_days)?;
        self.custodian
            .generate_symmetric_key(alias, AES_KEY_SIZE_BITS, window, require_authentication)?;
        info!(
            alias = %alias,
            not_after = %window.not_after(),
            require_authentication,
            "generated symmetric key"
        );
        Ok(())
    }

    fn alias_lock(&self, alias: &KeyAlias) -> Arc<Mutex<()>> {
        self.locks.entry(alias.clone()).or_default().clone()
    }

    // 只有没有其他调用方持有该锁时才移除
    fn release_lock(&self, alias: &KeyAlias) {
        self.locks
            .remove_if(alias, |_, lock| Arc::strong_count(lock) == 1);
    }
}
