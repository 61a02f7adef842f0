//! AES-GCM 信封加密
//!
//! 信封格式：`IV(12 字节) ∥ 密文 ∥ 认证标签(16 字节)`，传输时整体做 Base64 编码。
//! 格式没有版本前缀，更换方案时必须显式引入版本号。
use crate::common::key::{KeyAlgorithm, KeyKind, KeyMaterial};
use crate::common::utils::{decode_base64, encode_base64};
use crate::error::{Error, Operation, Result};
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

/// GCM IV 长度（字节）
pub const IV_SIZE: usize = 12;
/// GCM 认证标签长度（字节）
pub const TAG_SIZE: usize = 16;
/// GCM 认证标签长度（位）
pub const TAG_SIZE_BITS: usize = TAG_SIZE * 8;
/// AES-256 密钥长度（字节）
pub const KEY_SIZE: usize = 32;

/// 一次加密产生的自描述信封
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    iv: [u8; IV_SIZE],
    ciphertext_and_tag: Vec<u8>,
}

impl EncryptedEnvelope {
    /// 从原始字节拆分信封：前 `IV_SIZE` 字节为 IV，其余为密文与标签。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < IV_SIZE + TAG_SIZE {
            return Err(Error::opaque(Operation::Decrypt));
        }
        let (iv, rest) = bytes.split_at(IV_SIZE);
        let iv: [u8; IV_SIZE] = iv
            .try_into()
            .map_err(|_| Error::opaque(Operation::Decrypt))?;
        Ok(Self {
            iv,
            ciphertext_and_tag: rest.to_vec(),
        })
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = decode_base64(encoded).map_err(|_| Error::opaque(Operation::Decrypt))?;
        Self::from_bytes(&bytes)
    }

    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }

    pub fn ciphertext_and_tag(&self) -> &[u8] {
        &self.ciphertext_and_tag
    }

    pub fn tag_size_bits(&self) -> usize {
        TAG_SIZE_BITS
    }

    /// `IV ∥ 密文 ∥ 标签`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(IV_SIZE + self.ciphertext_and_tag.len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext_and_tag);
        out
    }

    pub fn to_base64(&self) -> String {
        encode_base64(&self.to_bytes())
    }
}

/// 无状态的 AES-GCM 信封加密器。
///
/// 每次调用都会新建 cipher 上下文并抽取新的随机 IV，调用之间不共享任何可变状态。
#[derive(Debug)]
pub struct EnvelopeCipher;

impl EnvelopeCipher {
    pub fn encrypt(plaintext: &[u8], key: &KeyMaterial) -> Result<EncryptedEnvelope> {
        let cipher = Self::cipher_for(key, Operation::Encrypt)?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext_and_tag = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| Error::crypto(Operation::Encrypt, e.to_string()))?;

        let mut iv = [0u8; IV_SIZE];
        iv.copy_from_slice(nonce.as_slice());
        Ok(EncryptedEnvelope {
            iv,
            ciphertext_and_tag,
        })
    }

    /// 标签不匹配、输入被截断以及密钥错误都统一表现为不带原因的 `CryptoOperation`。
    pub fn decrypt(envelope: &EncryptedEnvelope, key: &KeyMaterial) -> Result<Vec<u8>> {
        if envelope.ciphertext_and_tag.len() < TAG_SIZE {
            return Err(Error::opaque(Operation::Decrypt));
        }
        let cipher = Self::cipher_for(key, Operation::Decrypt)?;
        let nonce = Nonce::from_slice(&envelope.iv);
        cipher
            .decrypt(nonce, envelope.ciphertext_and_tag.as_slice())
            .map_err(|_| Error::opaque(Operation::Decrypt))
    }

    /// 加密并输出 Base64 线格式
    pub fn encrypt_to_base64(plaintext: &[u8], key: &KeyMaterial) -> Result<String> {
        Ok(Self::encrypt(plaintext, key)?.to_base64())
    }

    pub fn decrypt_from_base64(encoded: &str, key: &KeyMaterial) -> Result<Vec<u8>> {
        let envelope = EncryptedEnvelope::from_base64(encoded)?;
        Self::decrypt(&envelope, key)
    }

    fn cipher_for(key: &KeyMaterial, operation: Operation) -> Result<Aes256Gcm> {
        if key.algorithm() != &KeyAlgorithm::Aes
            || key.kind() != KeyKind::Secret
            || !key.purposes().allows(operation)
        {
            return Err(Error::opaque(operation));
        }
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| Error::opaque(operation))
    }
}
