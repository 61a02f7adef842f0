//! 对称加密模块：AES-GCM 信封加密

pub mod envelope;

pub use self::envelope::{EncryptedEnvelope, EnvelopeCipher};
