//! 密钥别名与密钥句柄。
//!
//! `KeyMaterial` 只是一次操作期间持有的临时句柄，真正的密钥材料由托管方（custodian）独占。
//! 因此它刻意不实现 `Serialize`，也不提供任何持久化手段。

use crate::common::config::ConfigError;
use crate::common::utils::ZeroizingVec;
use crate::error::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// AES 密钥长度（位）
pub const AES_KEY_SIZE_BITS: usize = 256;
/// RSA 默认模数长度（位）
pub const RSA_KEY_SIZE_BITS: usize = 2048;
/// EC 默认曲线长度（位），即 P-256
pub const EC_KEY_SIZE_BITS: usize = 256;

/// 托管方命名空间内唯一标识一个密钥槽位的别名。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyAlias(String);

impl KeyAlias {
    /// 创建别名，空白别名会被拒绝。
    pub fn new(alias: impl Into<String>) -> Result<Self, ConfigError> {
        let alias = alias.into();
        if alias.trim().is_empty() {
            return Err(ConfigError::EmptyAlias);
        }
        Ok(KeyAlias(alias))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for KeyAlias {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for KeyAlias {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyAlias::new(s)
    }
}

impl TryFrom<String> for KeyAlias {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        KeyAlias::new(value)
    }
}

impl From<KeyAlias> for String {
    fn from(alias: KeyAlias) -> Self {
        alias.0
    }
}

/// 密钥的算法标签。
///
/// 未识别的标签会以 `Other` 保留下来，由具体的密码组件决定是否以
/// `UnsupportedAlgorithm` 拒绝。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Aes,
    Rsa,
    Ec,
    Other(String),
}

impl KeyAlgorithm {
    /// 从平台风格的标签（"AES"、"RSA"、"EC"）解析。
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "AES" => KeyAlgorithm::Aes,
            "RSA" => KeyAlgorithm::Rsa,
            "EC" | "ECDSA" => KeyAlgorithm::Ec,
            _ => KeyAlgorithm::Other(tag.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            KeyAlgorithm::Aes => "AES",
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::Ec => "EC",
            KeyAlgorithm::Other(tag) => tag,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// 句柄中保存的是哪一部分密钥材料
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// 对称密钥
    Secret,
    /// 非对称私钥
    Private,
    /// 非对称公钥
    Public,
}

/// 密钥允许的用途集合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPurposes {
    pub encrypt_decrypt: bool,
    pub sign_verify: bool,
}

impl KeyPurposes {
    pub const ENCRYPT_DECRYPT: KeyPurposes = KeyPurposes {
        encrypt_decrypt: true,
        sign_verify: false,
    };
    pub const SIGN_VERIFY: KeyPurposes = KeyPurposes {
        encrypt_decrypt: false,
        sign_verify: true,
    };
    pub const ALL: KeyPurposes = KeyPurposes {
        encrypt_decrypt: true,
        sign_verify: true,
    };

    /// 该用途集合是否允许执行 `operation`
    pub fn allows(&self, operation: Operation) -> bool {
        match operation {
            Operation::Encrypt | Operation::Decrypt => self.encrypt_decrypt,
            Operation::Sign | Operation::Verify => self.sign_verify,
        }
    }
}

/// 一次操作期间使用的密钥句柄。
///
/// 编码约定：
/// - AES：原始密钥字节
/// - RSA：私钥为 PKCS#8 DER，公钥为 SPKI DER
/// - EC：私钥为 32 字节标量，公钥为未压缩的 SEC1 点
#[derive(Clone)]
pub struct KeyMaterial {
    algorithm: KeyAlgorithm,
    kind: KeyKind,
    purposes: KeyPurposes,
    bytes: ZeroizingVec,
}

impl KeyMaterial {
    pub fn new(
        algorithm: KeyAlgorithm,
        kind: KeyKind,
        purposes: KeyPurposes,
        bytes: impl Into<ZeroizingVec>,
    ) -> Self {
        Self {
            algorithm,
            kind,
            purposes,
            bytes: bytes.into(),
        }
    }

    /// AES 对称密钥句柄
    pub fn aes(bytes: impl Into<ZeroizingVec>) -> Self {
        Self::new(
            KeyAlgorithm::Aes,
            KeyKind::Secret,
            KeyPurposes::ENCRYPT_DECRYPT,
            bytes,
        )
    }

    pub fn algorithm(&self) -> &KeyAlgorithm {
        &self.algorithm
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn purposes(&self) -> KeyPurposes {
        self.purposes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("kind", &self.kind)
            .field("purposes", &self.purposes)
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purposes_gate_operations() {
        let encrypt_only = KeyPurposes::ENCRYPT_DECRYPT;
        assert!(encrypt_only.allows(Operation::Encrypt));
        assert!(encrypt_only.allows(Operation::Decrypt));
        assert!(!encrypt_only.allows(Operation::Sign));
        assert!(!encrypt_only.allows(Operation::Verify));

        let sign_only = KeyPurposes::SIGN_VERIFY;
        assert!(sign_only.allows(Operation::Sign));
        assert!(!sign_only.allows(Operation::Encrypt));

        assert!(KeyPurposes::ALL.allows(Operation::Decrypt));
        assert!(KeyPurposes::ALL.allows(Operation::Verify));
    }

    #[test]
    fn test_alias_rejects_blank() {
        assert!(matches!(KeyAlias::new(""), Err(ConfigError::EmptyAlias)));
        assert!(matches!(KeyAlias::new("   "), Err(ConfigError::EmptyAlias)));
        assert_eq!(KeyAlias::new("acct-key").unwrap().as_str(), "acct-key");
    }

    #[test]
    fn test_alias_serde_is_validated() {
        let alias: KeyAlias = serde_json::from_str("\"acct-key\"").unwrap();
        assert_eq!(alias.to_string(), "acct-key");
        assert!(serde_json::from_str::<KeyAlias>("\"\"").is_err());
    }

    #[test]
    fn test_algorithm_tags() {
        assert_eq!(KeyAlgorithm::from_tag("RSA"), KeyAlgorithm::Rsa);
        assert_eq!(KeyAlgorithm::from_tag("ec"), KeyAlgorithm::Ec);
        assert_eq!(KeyAlgorithm::from_tag("AES"), KeyAlgorithm::Aes);
        let dsa = KeyAlgorithm::from_tag("DSA");
        assert_eq!(dsa, KeyAlgorithm::Other("DSA".to_string()));
        assert_eq!(dsa.tag(), "DSA");
    }

    #[test]
    fn test_key_material_debug_hides_bytes() {
        let key = KeyMaterial::aes(vec![0xAB; 32]);
        let printed = format!("{:?}", key);
        assert!(printed.contains("[REDACTED]"));
        assert_eq!(key.kind(), KeyKind::Secret);
        assert_eq!(key.as_bytes().len(), 32);
    }
}
