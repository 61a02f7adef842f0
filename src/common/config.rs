//!
//! # 通用配置模块
//!
//! 包含每个别名的 `CryptoConfig` 以及进程级的 `RotationConfig`。
//! 两者都是构建后不可变的值对象，反序列化时与构建器走同一套校验。
//!
use crate::common::key::KeyAlias;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_KEY_VALIDITY_DAYS: u32 = 365;
pub const DEFAULT_ROTATION_INTERVAL_DAYS: u32 = 90;
/// 天数上限，保证 `now + 有效期 + 轮换间隔` 仍在可表示的时间范围内
pub const MAX_DAY_COUNT: u32 = 1_000_000;

/// 配置校验失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("key alias must not be empty")]
    EmptyAlias,

    #[error("{field} must be a positive number of days")]
    NonPositiveDays { field: &'static str },

    #[error("{0} days is out of the representable time range")]
    DayCountOutOfRange(u32),

    #[error("validity window is inverted: not_before {not_before} is after not_after {not_after}")]
    InvalidValidityWindow {
        not_before: DateTime<Utc>,
        not_after: DateTime<Utc>,
    },
}

fn ensure_day_count(days: u32, field: &'static str) -> Result<u32, ConfigError> {
    if days == 0 {
        return Err(ConfigError::NonPositiveDays { field });
    }
    if days > MAX_DAY_COUNT {
        return Err(ConfigError::DayCountOutOfRange(days));
    }
    Ok(days)
}

fn default_validity_days() -> u32 {
    DEFAULT_KEY_VALIDITY_DAYS
}

fn default_rotation_interval_days() -> u32 {
    DEFAULT_ROTATION_INTERVAL_DAYS
}

/// 单个别名的加密配置。
///
/// ```
/// use seal_custody::CryptoConfig;
///
/// let config = CryptoConfig::builder("acct-key")
///     .require_user_authentication(true)
///     .key_validity_days(30)
///     .build()
///     .unwrap();
/// assert_eq!(config.key_rotation_interval_days(), 90);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CryptoConfigBuilder")]
pub struct CryptoConfig {
    key_alias: KeyAlias,
    require_user_authentication: bool,
    key_validity_days: u32,
    key_rotation_interval_days: u32,
}

impl CryptoConfig {
    pub fn builder(key_alias: impl Into<String>) -> CryptoConfigBuilder {
        CryptoConfigBuilder::new(key_alias)
    }

    /// 全部使用默认值
    pub fn new(key_alias: impl Into<String>) -> Result<Self, ConfigError> {
        Self::builder(key_alias).build()
    }

    pub fn key_alias(&self) -> &KeyAlias {
        &self.key_alias
    }

    pub fn require_user_authentication(&self) -> bool {
        self.require_user_authentication
    }

    pub fn key_validity_days(&self) -> u32 {
        self.key_validity_days
    }

    pub fn key_rotation_interval_days(&self) -> u32 {
        self.key_rotation_interval_days
    }
}

/// `CryptoConfig` 的构建器，只负责填充默认值并在 `build` 时统一校验。
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoConfigBuilder {
    key_alias: String,
    #[serde(default)]
    require_user_authentication: bool,
    #[serde(default = "default_validity_days")]
    key_validity_days: u32,
    #[serde(default = "default_rotation_interval_days")]
    key_rotation_interval_days: u32,
}

impl CryptoConfigBuilder {
    pub fn new(key_alias: impl Into<String>) -> Self {
        Self {
            key_alias: key_alias.into(),
            require_user_authentication: false,
            key_validity_days: DEFAULT_KEY_VALIDITY_DAYS,
            key_rotation_interval_days: DEFAULT_ROTATION_INTERVAL_DAYS,
        }
    }

    pub fn require_user_authentication(mut self, required: bool) -> Self {
        self.require_user_authentication = required;
        self
    }

    pub fn key_validity_days(mut self, days: u32) -> Self {
        self.key_validity_days = days;
        self
    }

    pub fn key_rotation_interval_days(mut self, days: u32) -> Self {
        self.key_rotation_interval_days = days;
        self
    }

    pub fn build(self) -> Result<CryptoConfig, ConfigError> {
        Ok(CryptoConfig {
            key_alias: KeyAlias::new(self.key_alias)?,
            require_user_authentication: self.require_user_authentication,
            key_validity_days: ensure_day_count(self.key_validity_days, "key_validity_days")?,
            key_rotation_interval_days: ensure_day_count(
                self.key_rotation_interval_days,
                "key_rotation_interval_days",
            )?,
        })
    }
}

impl TryFrom<CryptoConfigBuilder> for CryptoConfig {
    type Error = ConfigError;

    fn try_from(builder: CryptoConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

/// 进程级轮换配置，可被单次调用覆盖。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRotationConfig")]
pub struct RotationConfig {
    rotation_interval_days: u32,
    default_validity_days: u32,
}

#[derive(Deserialize)]
struct RawRotationConfig {
    #[serde(default = "default_rotation_interval_days")]
    rotation_interval_days: u32,
    #[serde(default = "default_validity_days")]
    default_validity_days: u32,
}

impl TryFrom<RawRotationConfig> for RotationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawRotationConfig) -> Result<Self, Self::Error> {
        RotationConfig::new(raw.rotation_interval_days, raw.default_validity_days)
    }
}

impl RotationConfig {
    pub fn new(rotation_interval_days: u32, default_validity_days: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            rotation_interval_days: ensure_day_count(
                rotation_interval_days,
                "rotation_interval_days",
            )?,
            default_validity_days: ensure_day_count(default_validity_days, "default_validity_days")?,
        })
    }

    pub fn rotation_interval_days(&self) -> u32 {
        self.rotation_interval_days
    }

    pub fn default_validity_days(&self) -> u32 {
        self.default_validity_days
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            rotation_interval_days: DEFAULT_ROTATION_INTERVAL_DAYS,
            default_validity_days: DEFAULT_KEY_VALIDITY_DAYS,
        }
    }
}
