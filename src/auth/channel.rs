//! 基于通道的认证闸门。
//!
//! `ChannelGate` 把每个认证请求包装成 `AuthPrompt` 发送给宿主 UI 层，然后等待 UI
//! 通过 `oneshot` 回传结果。UI 丢弃提示（用户关闭了对话框）即视为取消。
use crate::auth::{AuthOutcome, AuthRequest, AuthenticationGate};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// 提示通道已关闭（没有 UI 在监听）时返回的错误码
pub const GATE_UNAVAILABLE: i32 = -1;

/// 等待 UI 处理的一次认证提示
#[derive(Debug)]
pub struct AuthPrompt {
    request: AuthRequest,
    responder: oneshot::Sender<AuthOutcome>,
}

impl AuthPrompt {
    pub fn request(&self) -> &AuthRequest {
        &self.request
    }

    /// 回传认证结果。等待方已经放弃时静默忽略。
    pub fn respond(self, outcome: AuthOutcome) {
        if self.responder.send(outcome).is_err() {
            debug!(title = %self.request.title, "authentication result arrived after the caller gave up");
        }
    }

    /// 用户关闭提示
    pub fn cancel(self) {
        drop(self);
    }
}

/// 通过 `mpsc` 通道把提示交给 UI 的认证闸门
#[derive(Debug, Clone)]
pub struct ChannelGate {
    prompts: mpsc::Sender<AuthPrompt>,
    timeout: Option<Duration>,
}

impl ChannelGate {
    /// 创建闸门及 UI 侧的提示接收端
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<AuthPrompt>) {
        let (prompts, receiver) = mpsc::channel(buffer);
        (
            Self {
                prompts,
                timeout: None,
            },
            receiver,
        )
    }

    /// 超过 `timeout` 仍未得到结果时按失败处理
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn exchange(&self, request: AuthRequest) -> AuthOutcome {
        let (responder, response) = oneshot::channel();
        let prompt = AuthPrompt { request, responder };

        if self.prompts.send(prompt).await.is_err() {
            warn!("authentication prompt channel is closed");
            return AuthOutcome::Error {
                code: GATE_UNAVAILABLE,
                message: "authentication prompt unavailable".to_string(),
            };
        }

        // 发送端被丢弃说明提示被关闭
        response
            .await
            .unwrap_or_else(|_| AuthOutcome::Failure("cancelled".to_string()))
    }
}

#[async_trait]
impl AuthenticationGate for ChannelGate {
    /// 超时同时覆盖提示入队和等待回复两个阶段。
    async fn request_authentication(&self, request: AuthRequest) -> AuthOutcome {
        let exchange = self.exchange(request);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .unwrap_or_else(|_| AuthOutcome::Failure("timed out".to_string())),
            None => exchange.await,
        }
    }
}
