//! 非对称加密与签名的统一入口。
//!
//! 根据 `KeyMaterial` 的算法标签选择具体实现：RSA 走 OAEP / PSS，EC 走 ECDSA。
//! 密文与签名在此边界统一做 Base64 编码。
use crate::asymmetric::ecdsa::EcdsaSystem;
use crate::asymmetric::rsa::RsaSystem;
use crate::common::key::{EC_KEY_SIZE_BITS, KeyAlgorithm, KeyKind, KeyMaterial, RSA_KEY_SIZE_BITS};
use crate::common::utils::{decode_base64, encode_base64};
use crate::error::{Error, Operation, Result};

/// 支持的椭圆曲线
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcCurve {
    /// secp256r1
    P256,
}

impl EcCurve {
    pub fn size_bits(&self) -> usize {
        match self {
            EcCurve::P256 => EC_KEY_SIZE_BITS,
        }
    }
}

/// 非对称密钥对的生成参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPairSpec {
    Rsa { bits: usize },
    Ec(EcCurve),
}

impl KeyPairSpec {
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            KeyPairSpec::Rsa { .. } => KeyAlgorithm::Rsa,
            KeyPairSpec::Ec(_) => KeyAlgorithm::Ec,
        }
    }
}

impl Default for KeyPairSpec {
    fn default() -> Self {
        KeyPairSpec::Rsa {
            bits: RSA_KEY_SIZE_BITS,
        }
    }
}

/// 无状态的非对称密码组件
#[derive(Debug)]
pub struct AsymmetricCipher;

impl AsymmetricCipher {
    /// 生成一对临时密钥，返回 `(公钥, 私钥)`。
    pub fn generate_key_pair(spec: KeyPairSpec) -> Result<(KeyMaterial, KeyMaterial)> {
        match spec {
            // 生成失败只可能源于不被接受的模数长度
            KeyPairSpec::Rsa { bits } => RsaSystem::generate_keypair(bits)
                .map_err(|e| Error::UnsupportedAlgorithm(format!("RSA-{bits}: {e}"))),
            KeyPairSpec::Ec(EcCurve::P256) => Ok(EcdsaSystem::generate_keypair()),
        }
    }

    /// RSA-OAEP(SHA-256) 加密，返回 Base64 密文。
    pub fn encrypt(plaintext: &[u8], public_key: &KeyMaterial) -> Result<String> {
        Self::require_rsa(public_key)?;
        Self::require_kind(public_key, KeyKind::Public, Operation::Encrypt)?;
        Self::require_purpose(public_key, Operation::Encrypt)?;
        let ciphertext = RsaSystem::encrypt(public_key.as_bytes(), plaintext)
            .map_err(|e| Error::crypto(Operation::Encrypt, e))?;
        Ok(encode_base64(&ciphertext))
    }

    pub fn decrypt(ciphertext: &str, private_key: &KeyMaterial) -> Result<Vec<u8>> {
        Self::require_rsa(private_key)?;
        Self::require_kind(private_key, KeyKind::Private, Operation::Decrypt)?;
        if !private_key.purposes().allows(Operation::Decrypt) {
            return Err(Error::opaque(Operation::Decrypt));
        }
        let ciphertext = decode_base64(ciphertext).map_err(|_| Error::opaque(Operation::Decrypt))?;
        RsaSystem::decrypt(private_key.as_bytes(), &ciphertext)
            .map_err(|_| Error::opaque(Operation::Decrypt))
    }

    /// RSA 私钥使用 PSS，EC 私钥使用 ECDSA，返回 Base64 签名。
    pub fn sign(data: &[u8], private_key: &KeyMaterial) -> Result<String> {
        let signature = match private_key.algorithm() {
            KeyAlgorithm::Rsa => {
                Self::require_kind(private_key, KeyKind::Private, Operation::Sign)?;
                Self::require_purpose(private_key, Operation::Sign)?;
                RsaSystem::sign(private_key.as_bytes(), data)
                    .map_err(|e| Error::crypto(Operation::Sign, e))?
            }
            KeyAlgorithm::Ec => {
                Self::require_kind(private_key, KeyKind::Private, Operation::Sign)?;
                Self::require_purpose(private_key, Operation::Sign)?;
                EcdsaSystem::sign(private_key.as_bytes(), data)
                    .map_err(|e| Error::crypto(Operation::Sign, e))?
            }
            other => return Err(Error::UnsupportedAlgorithm(other.to_string())),
        };
        Ok(encode_base64(&signature))
    }

    /// 纯布尔谓词：签名不匹配返回 `false`，未知算法标签返回 `UnsupportedAlgorithm`。
    pub fn verify(data: &[u8], signature: &str, public_key: &KeyMaterial) -> Result<bool> {
        let algorithm = public_key.algorithm();
        if !matches!(algorithm, KeyAlgorithm::Rsa | KeyAlgorithm::Ec) {
            return Err(Error::UnsupportedAlgorithm(algorithm.to_string()));
        }
        Self::require_kind(public_key, KeyKind::Public, Operation::Verify)?;
        Self::require_purpose(public_key, Operation::Verify)?;

        let Ok(signature) = decode_base64(signature) else {
            return Ok(false);
        };
        match algorithm {
            KeyAlgorithm::Rsa => RsaSystem::verify(public_key.as_bytes(), data, &signature)
                .map_err(|e| Error::crypto(Operation::Verify, e)),
            _ => EcdsaSystem::verify(public_key.as_bytes(), data, &signature)
                .map_err(|e| Error::crypto(Operation::Verify, e)),
        }
    }

    fn require_rsa(key: &KeyMaterial) -> Result<()> {
        match key.algorithm() {
            KeyAlgorithm::Rsa => Ok(()),
            other => Err(Error::UnsupportedAlgorithm(other.to_string())),
        }
    }

    fn require_kind(key: &KeyMaterial, expected: KeyKind, operation: Operation) -> Result<()> {
        if key.kind() != expected {
            return Err(Error::crypto(
                operation,
                format!("expected a {:?} key, got {:?}", expected, key.kind()),
            ));
        }
        Ok(())
    }

    fn require_purpose(key: &KeyMaterial, operation: Operation) -> Result<()> {
        if !key.purposes().allows(operation) {
            return Err(Error::crypto(
                operation,
                format!("key purposes {:?} exclude {operation}", key.purposes()),
            ));
        }
        Ok(())
    }
}
