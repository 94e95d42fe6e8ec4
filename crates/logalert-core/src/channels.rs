//! Notification channels for alert delivery.
//!
//! This module provides the [`Notifier`] trait and a [`LogNotifier`] that
//! writes rendered alerts to the tracing stream instead of a chat webhook.

use std::fmt;
use std::future::Future;

use tracing::warn;

use crate::error::Result;

/// Acknowledgment returned by a channel after delivering a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationReceipt {
    /// The channel that delivered the message.
    pub channel: String,
    /// HTTP status code, if the channel speaks HTTP.
    pub status_code: Option<u16>,
    /// Raw acknowledgment from the receiver, kept for the audit log.
    pub acknowledgment: Option<String>,
}

impl NotificationReceipt {
    /// Creates a receipt for `channel`.
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            status_code: None,
            acknowledgment: None,
        }
    }

    /// Sets the status code.
    #[must_use]
    pub const fn with_status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the acknowledgment text.
    #[must_use]
    pub fn with_acknowledgment(mut self, ack: impl Into<String>) -> Self {
        self.acknowledgment = Some(ack.into());
        self
    }
}

impl fmt::Display for NotificationReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.channel)?;
        if let Some(code) = self.status_code {
            write!(f, " status={code}")?;
        }
        if let Some(ref ack) = self.acknowledgment {
            write!(f, " ack={ack}")?;
        }
        Ok(())
    }
}

/// Trait for channels that deliver a rendered alert message.
pub trait Notifier: Send + Sync + fmt::Debug {
    /// Returns the name of this channel.
    fn name(&self) -> &str;

    /// Delivers `message`. Attempted once; callers do not retry.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Notification` if the message was not accepted.
    fn send(&self, message: &str) -> impl Future<Output = Result<NotificationReceipt>> + Send;
}

impl<T: Notifier> Notifier for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&self, message: &str) -> impl Future<Output = Result<NotificationReceipt>> + Send {
        (**self).send(message)
    }
}

/// A channel that logs alerts instead of sending them.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    name: String,
}

impl LogNotifier {
    /// Creates a new log channel.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new("log")
    }
}

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: &str) -> Result<NotificationReceipt> {
        warn!(channel = %self.name, message = %message, "ALERT");
        Ok(NotificationReceipt::new(self.name.as_str()).with_acknowledgment("logged to tracing"))
    }
}
