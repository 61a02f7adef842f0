//! `RsaSystem` 提供基于 RSA-OAEP(SHA-256) 的加解密以及 RSA-PSS(SHA-256) 签名。
//!
//! 私钥以 PKCS#8 DER、公钥以 SPKI DER 的形式在 `KeyMaterial` 中流转。

use crate::common::key::{KeyAlgorithm, KeyKind, KeyMaterial, KeyPurposes, RSA_KEY_SIZE_BITS};
use crate::common::utils::ZeroizingVec;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::pss::{Signature as PssSignature, SigningKey, VerifyingKey};
use rsa::rand_core::OsRng as RsaOsRng;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use thiserror::Error;

/// RSA 系统的独立错误类型
#[derive(Error, Debug)]
pub enum RsaSystemError {
    #[error("RSA key generation failed: {0}")]
    KeyGeneration(#[source] rsa::Error),

    #[error("failed to export RSA key: {0}")]
    Export(String),

    #[error("failed to parse RSA public key: {0}")]
    InvalidPublicKey(#[source] rsa::pkcs8::spki::Error),

    #[error("failed to parse RSA private key: {0}")]
    InvalidPrivateKey(#[source] rsa::pkcs8::Error),

    #[error("RSA encryption failed: {0}")]
    Encryption(#[source] rsa::Error),

    #[error("RSA decryption failed")]
    Decryption,
}

/// RSA 加密系统实现
pub struct RsaSystem;

impl RsaSystem {
    pub const DEFAULT_KEY_BITS: usize = RSA_KEY_SIZE_BITS;

    /// 生成密钥对，返回 `(公钥, 私钥)` 句柄。
    pub fn generate_keypair(bits: usize) -> Result<(KeyMaterial, KeyMaterial), RsaSystemError> {
        let mut rng = RsaOsRng;
        let private_key =
            RsaPrivateKey::new(&mut rng, bits).map_err(RsaSystemError::KeyGeneration)?;
        let public_key = RsaPublicKey::from(&private_key);

        let public_der = public_key
            .to_public_key_der()
            .map_err(|e| RsaSystemError::Export(e.to_string()))?;
        let private_der = private_key
            .to_pkcs8_der()
            .map_err(|e| RsaSystemError::Export(e.to_string()))?;

        Ok((
            KeyMaterial::new(
                KeyAlgorithm::Rsa,
                KeyKind::Public,
                KeyPurposes::ALL,
                public_der.as_bytes().to_vec(),
            ),
            KeyMaterial::new(
                KeyAlgorithm::Rsa,
                KeyKind::Private,
                KeyPurposes::ALL,
                ZeroizingVec(private_der.as_bytes().to_vec()),
            ),
        ))
    }

    pub fn encrypt(public_der: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, RsaSystemError> {
        let public_key = Self::public_key(public_der)?;
        let mut rng = RsaOsRng;
        public_key
            .encrypt(&mut rng, Oaep::new::<Sha256>(), plaintext)
            .map_err(RsaSystemError::Encryption)
    }

    pub fn decrypt(private_der: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, RsaSystemError> {
        let private_key = Self::private_key(private_der)?;
        private_key
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|_| RsaSystemError::Decryption)
    }

    pub fn sign(private_der: &[u8], message: &[u8]) -> Result<Vec<u8>, RsaSystemError> {
        let private_key = Self::private_key(private_der)?;
        let signing_key = SigningKey::<Sha256>::new(private_key);
        let mut rng = RsaOsRng;
        let signature = signing_key.sign_with_rng(&mut rng, message);
        Ok(signature.to_vec())
    }

    /// 签名不匹配或格式错误时返回 `Ok(false)`，只有公钥本身无法解析才返回错误。
    pub fn verify(
        public_der: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, RsaSystemError> {
        let public_key = Self::public_key(public_der)?;
        let verifying_key = VerifyingKey::<Sha256>::new(public_key);
        let Ok(signature) = PssSignature::try_from(signature) else {
            return Ok(false);
        };
        Ok(verifying_key.verify(message, &signature).is_ok())
    }

    fn public_key(der: &[u8]) -> Result<RsaPublicKey, RsaSystemError> {
        RsaPublicKey::from_public_key_der(der).map_err(RsaSystemError::InvalidPublicKey)
    }

    fn private_key(der: &[u8]) -> Result<RsaPrivateKey, RsaSystemError> {
        RsaPrivateKey::from_pkcs8_der(der).map_err(RsaSystemError::InvalidPrivateKey)
    }
}
