//! # Asymmetric Cryptography Module
//!
//! RSA-OAEP encryption, RSA-PSS and ECDSA signatures, and the `AsymmetricCipher`
//! facade that dispatches on a key's algorithm tag.
//!
//! ---
//!
//! # 非对称加密模块
//!
//! 包含 RSA-OAEP 加解密、RSA-PSS 与 ECDSA 签名，以及按密钥算法标签分派的
//! `AsymmetricCipher` 统一入口。

pub mod cipher;
pub mod ecdsa;
pub mod rsa;

pub use self::cipher::{AsymmetricCipher, EcCurve, KeyPairSpec};
pub use self::ecdsa::{EcdsaSystem, EcdsaSystemError};
pub use self::rsa::{RsaSystem, RsaSystemError};
