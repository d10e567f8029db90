//! 商户通知通道
//!
//! Fire-and-forget delivery of [`NotifyEvent`] payloads to the merchant's
//! webhook. 投递永远发生在数据库事务提交之后；失败只记录日志，绝不
//! 回滚业务操作。
//!
//! # 实现
//!
//! | 类型 | 场景 |
//! |------|------|
//! | [`WebhookNotifier`] | 配置了 NOTIFY_WEBHOOK_URL 时，POST JSON |
//! | [`NoopNotifier`] | 未配置 webhook，静默丢弃 |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::Config;
use shared::NotifyEvent;

/// Notification delivery error
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// 请求未能送达 (连接失败、超时)
    #[error("request failed: {0}")]
    Request(String),

    /// Webhook 返回了非 2xx 状态码
    #[error("webhook returned status {0}")]
    Status(u16),
}

/// Outbound notification channel.
///
/// Implementations must be cheap to call and must never block the caller
/// beyond their own bounded timeout.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &NotifyEvent) -> Result<(), NotifyError>;
}

/// POSTs events as JSON to a merchant-configured webhook.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, client: reqwest::Client, timeout_ms: u64) -> Self {
        Self {
            url: url.into(),
            client,
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, event: &NotifyEvent) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(event)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status().as_u16()));
        }

        debug!(target: "notify", event = event.name(), "Notification delivered");
        Ok(())
    }
}

/// Drops every event. Used when no webhook is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, event: &NotifyEvent) -> Result<(), NotifyError> {
        debug!(
            target: "notify",
            event = event.name(),
            "No webhook configured, dropping event"
        );
        Ok(())
    }
}

/// Pick the notifier implementation from configuration.
pub fn notifier_from_config(config: &Config, client: reqwest::Client) -> Arc<dyn Notifier> {
    match config.notify_webhook_url.as_deref() {
        Some(url) if !url.is_empty() => {
            info!(target: "notify", url = %url, "Webhook notifier enabled");
            Arc::new(WebhookNotifier::new(url, client, config.notify_timeout_ms))
        }
        _ => {
            info!(target: "notify", "No webhook configured, notifications disabled");
            Arc::new(NoopNotifier)
        }
    }
}

/// Test double that records every event it receives.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    events: std::sync::Mutex<Vec<NotifyEvent>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub(crate) fn recorded(&self) -> Vec<NotifyEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &NotifyEvent) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::notify::OrderNotice;
    use shared::order::OrderStatus;

    fn sample_event() -> NotifyEvent {
        NotifyEvent::OrderCompleted {
            order: OrderNotice {
                id: 1,
                order_number: "SO-1001".to_string(),
                status: OrderStatus::Completed,
                total: 25.0,
                closed_at: Some(1_000),
            },
        }
    }

    #[tokio::test]
    async fn test_noop_notifier_accepts_everything() {
        assert!(NoopNotifier.notify(&sample_event()).await.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_connect_failure_is_reported() {
        // Port 9 (discard) is not listening; connection is refused immediately
        let notifier = WebhookNotifier::new("http://127.0.0.1:9", reqwest::Client::new(), 500);
        let result = notifier.notify(&sample_event()).await;
        assert!(matches!(result, Err(NotifyError::Request(_))));
    }

    #[tokio::test]
    async fn test_recording_notifier_captures_events() {
        let recorder = RecordingNotifier::default();
        recorder.notify(&sample_event()).await.unwrap();
        let events = recorder.recorded();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "order.completed");
    }
}
