//! Authentication gate: the optional human-presence check in front of a key operation.
// 中文: 认证闸门，即在密钥操作之前可选的人工认证步骤。

pub mod channel;

pub use self::channel::{AuthPrompt, ChannelGate, GATE_UNAVAILABLE};

use crate::error::{Error, Result};
use async_trait::async_trait;

/// 展示给用户的认证提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub title: String,
    pub description: String,
}

impl AuthRequest {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn encrypt_prompt() -> Self {
        Self::new("Encrypt Data", "Authenticate to encrypt your data")
    }

    pub fn decrypt_prompt() -> Self {
        Self::new("Decrypt Data", "Authenticate to decrypt your data")
    }
}

/// 一次认证请求的唯一结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    /// 用户未通过认证或取消了提示
    Failure(String),
    /// 闸门本身出错（传感器不可用、锁定等）
    Error { code: i32, message: String },
}

impl AuthOutcome {
    /// `Success` 之外的结果都映射为 `Error::Authentication`。
    pub fn into_result(self) -> Result<()> {
        match self {
            AuthOutcome::Success => Ok(()),
            AuthOutcome::Failure(reason) => Err(Error::Authentication(reason)),
            AuthOutcome::Error { code, message } => Err(Error::Authentication(format!(
                "authentication error [{code}]: {message}"
            ))),
        }
    }
}

/// Defines the capability that suspends an operation until a human has authenticated.
///
/// The returned future resolves to exactly one `AuthOutcome`. Cancellation by the user
/// must resolve to `AuthOutcome::Failure`; enforcing a timeout is up to the implementation.
///
/// 中文: 在用户完成认证之前挂起操作的能力。返回的 future 恰好产生一个 `AuthOutcome`；
/// 用户取消必须映射为 `Failure`，超时由具体实现负责。
#[async_trait]
pub trait AuthenticationGate: Send + Sync {
    async fn request_authentication(&self, request: AuthRequest) -> AuthOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_mapping() {
        assert!(AuthOutcome::Success.into_result().is_ok());

        let err = AuthOutcome::Failure("cancelled".into()).into_result().unwrap_err();
        assert!(matches!(err, Error::Authentication(ref reason) if reason == "cancelled"));

        let err = AuthOutcome::Error {
            code: 7,
            message: "too many attempts".into(),
        }
        .into_result()
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "authentication failed: authentication error [7]: too many attempts"
        );
    }
}
