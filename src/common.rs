//! 通用模块，包含配置、密钥句柄、有效期窗口以及共享的工具函数

pub mod config;
pub mod key;
pub mod utils;
pub mod validity;

pub use self::config::{ConfigError, CryptoConfig, CryptoConfigBuilder, RotationConfig};
pub use self::key::{KeyAlgorithm, KeyAlias, KeyKind, KeyMaterial, KeyPurposes};
pub use self::utils::ZeroizingVec;
pub use self::validity::ValidityWindow;
