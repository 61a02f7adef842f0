//! Defines the custom error type for the `seal-custody` crate.

use crate::common::config::ConfigError;
use crate::common::key::KeyAlias;
use std::fmt;
use thiserror::Error;

/// 被包装的底层错误。
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// `seal-custody` 中所有操作的结果类型。
pub type Result<T> = std::result::Result<T, Error>;

/// 失败的密码学操作种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
    Sign,
    Verify,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Encrypt => "encryption",
            Operation::Decrypt => "decryption",
            Operation::Sign => "signing",
            Operation::Verify => "verification",
        };
        f.write_str(name)
    }
}

/// The main error type for the `seal-custody` crate.
///
/// 每个变体对应一种错误类别，而不是某个具体的底层错误类型。
/// 解密失败刻意不区分“密钥错误”与“密文被篡改”，避免形成解密预言机。
#[derive(Debug, Error)]
pub enum Error {
    #[error("key with alias '{0}' not found in the custodian")]
    KeyNotFound(KeyAlias),

    #[error("failed to generate key with alias '{alias}'")]
    KeyGeneration {
        alias: KeyAlias,
        #[source]
        source: BoxError,
    },

    #[error("{operation} operation failed")]
    CryptoOperation {
        operation: Operation,
        #[source]
        source: Option<BoxError>,
    },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("unsupported key algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigError),
}

impl Error {
    /// 构造一个携带底层原因的 `KeyGeneration` 错误。
    pub fn key_generation(alias: &KeyAlias, source: impl Into<BoxError>) -> Self {
        Error::KeyGeneration {
            alias: alias.clone(),
            source: source.into(),
        }
    }

    /// 构造一个携带底层原因的 `CryptoOperation` 错误。
    pub fn crypto(operation: Operation, source: impl Into<BoxError>) -> Self {
        Error::CryptoOperation {
            operation,
            source: Some(source.into()),
        }
    }

    /// 构造一个不暴露任何原因的 `CryptoOperation` 错误。
    pub fn opaque(operation: Operation) -> Self {
        Error::CryptoOperation {
            operation,
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_opaque_error_has_no_source() {
        let err = Error::opaque(Operation::Decrypt);
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "decryption operation failed");
    }

    #[test]
    fn test_key_generation_keeps_source() {
        let alias = KeyAlias::new("acct-key").unwrap();
        let err = Error::key_generation(&alias, "custodian busy");
        assert_eq!(
            err.to_string(),
            "failed to generate key with alias 'acct-key'"
        );
        assert_eq!(err.source().unwrap().to_string(), "custodian busy");
    }
}
