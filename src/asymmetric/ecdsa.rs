//! P-256 上的 ECDSA(SHA-256) 签名，签名值使用 DER 编码。

use crate::common::key::{KeyAlgorithm, KeyKind, KeyMaterial, KeyPurposes};
use crate::common::utils::ZeroizingVec;
use p256::ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::rand_core::OsRng;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EcdsaSystemError {
    #[error("invalid EC private key")]
    InvalidPrivateKey,

    #[error("invalid EC public key")]
    InvalidPublicKey,
}

pub struct EcdsaSystem;

impl EcdsaSystem {
    /// 生成 P-256 密钥对，返回 `(公钥, 私钥)` 句柄。
    pub fn generate_keypair() -> (KeyMaterial, KeyMaterial) {
        let signing_key = SigningKey::random(&mut OsRng);
        let public_point = signing_key.verifying_key().to_encoded_point(false);

        (
            KeyMaterial::new(
                KeyAlgorithm::Ec,
                KeyKind::Public,
                KeyPurposes::SIGN_VERIFY,
                public_point.as_bytes().to_vec(),
            ),
            KeyMaterial::new(
                KeyAlgorithm::Ec,
                KeyKind::Private,
                KeyPurposes::SIGN_VERIFY,
                ZeroizingVec(signing_key.to_bytes().to_vec()),
            ),
        )
    }

    pub fn sign(private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, EcdsaSystemError> {
        let secret_key = p256::SecretKey::from_slice(private_key)
            .map_err(|_| EcdsaSystemError::InvalidPrivateKey)?;
        let signing_key = SigningKey::from(secret_key);
        let signature: Signature = signing_key.sign(message);
        Ok(signature.to_der().as_bytes().to_vec())
    }

    /// 签名格式错误或不匹配时返回 `Ok(false)`
    pub fn verify(
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<bool, EcdsaSystemError> {
        let verifying_key = VerifyingKey::from_sec1_bytes(public_key)
            .map_err(|_| EcdsaSystemError::InvalidPublicKey)?;
        let Ok(signature) = Signature::from_der(signature) else {
            return Ok(false);
        };
        Ok(verifying_key.verify(message, &signature).is_ok())
    }
}
