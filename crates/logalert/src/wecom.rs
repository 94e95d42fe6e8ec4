//! WeCom group-robot webhook notifier.

use logalert_core::{NotificationReceipt, Notifier, PipelineError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::WeComConfig;
use crate::error::{AppError, Result};
use crate::http::{ensure_success, read_body};

/// Markdown message body accepted by the robot webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownPayload {
    /// Always `markdown`.
    pub msgtype: String,
    /// The markdown content.
    pub markdown: MarkdownContent,
}

/// Content of a markdown message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownContent {
    /// The rendered alert.
    pub content: String,
}

impl MarkdownPayload {
    /// Wraps a rendered message.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            msgtype: "markdown".to_string(),
            markdown: MarkdownContent {
                content: content.into(),
            },
        }
    }
}

/// Webhook answer; `errcode` 0 means accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebhookReply {
    /// Status code of the robot API.
    pub errcode: i64,
    /// Human-readable status.
    #[serde(default)]
    pub errmsg: String,
}

/// Delivers alerts to a WeCom group robot.
#[derive(Debug, Clone)]
pub struct WeComNotifier {
    client: Client,
    webhook_url: String,
    token: String,
}

impl WeComNotifier {
    /// Creates a notifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no robot token is configured.
    pub fn new(config: &WeComConfig, client: Client) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(AppError::Config(
                "wecom.token is required (or set LOGALERT_WECOM_TOKEN)".to_string(),
            ));
        }
        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
            token: config.token.clone(),
        })
    }

    async fn deliver(&self, message: &str) -> Result<NotificationReceipt> {
        let response = self
            .client
            .post(&self.webhook_url)
            .query(&[("key", self.token.as_str())])
            .json(&MarkdownPayload::new(message))
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let (status, body) = read_body(response).await?;
        ensure_success(status, &body)?;

        let reply = decode_reply(&body)?;
        Ok(NotificationReceipt::new(self.name())
            .with_status_code(status.as_u16())
            .with_acknowledgment(format!("errcode={} errmsg={}", reply.errcode, reply.errmsg)))
    }
}

impl Notifier for WeComNotifier {
    fn name(&self) -> &str {
        "wecom"
    }

    async fn send(&self, message: &str) -> logalert_core::Result<NotificationReceipt> {
        self.deliver(message)
            .await
            .map_err(AppError::into_notification)
    }
}

/// Decodes the webhook answer, rejecting non-zero `errcode`s.
///
/// # Errors
///
/// Returns `AppError::Decode` for an unreadable body and a notification
/// failure for a rejected message.
pub fn decode_reply(body: &str) -> Result<WebhookReply> {
    let reply: WebhookReply = serde_json::from_str(body)?;
    if reply.errcode != 0 {
        return Err(PipelineError::Notification {
            reason: format!("errcode {}: {}", reply.errcode, reply.errmsg),
        }
        .into());
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(token: &str) -> WeComConfig {
        WeComConfig {
            webhook_url: "https://qyapi.weixin.qq.com/cgi-bin/webhook/send".to_string(),
            token: token.to_string(),
        }
    }

    #[test]
    fn payload_shape() {
        let payload = serde_json::to_value(MarkdownPayload::new("# Log Alert")).unwrap();
        assert_eq!(
            payload,
            json!({ "msgtype": "markdown", "markdown": { "content": "# Log Alert" } })
        );
    }

    #[test]
    fn missing_token_is_rejected() {
        let result = WeComNotifier::new(&config("  "), Client::new());
        assert!(matches!(result, Err(AppError::Config(_))));
        assert!(WeComNotifier::new(&config("robot-key"), Client::new()).is_ok());
    }

    #[test]
    fn ok_reply_is_accepted() {
        let reply = decode_reply(r#"{"errcode":0,"errmsg":"ok"}"#).unwrap();
        assert_eq!(reply.errmsg, "ok");
    }

    #[test]
    fn rejected_reply_is_a_notification_failure() {
        let err = decode_reply(r#"{"errcode":93000,"errmsg":"invalid webhook url"}"#)
            .unwrap_err()
            .into_notification();
        assert_eq!(
            err.to_string(),
            "notification failed: errcode 93000: invalid webhook url"
        );
    }

    #[test]
    fn garbage_reply_is_a_decode_error() {
        assert!(matches!(decode_reply("<html>"), Err(AppError::Decode(_))));
    }
}
