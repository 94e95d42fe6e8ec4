//! Error types for logalert.

use logalert_core::PipelineError;
use thiserror::Error;

/// Errors raised by configuration loading and the HTTP adapters.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with an unexpected status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Pipeline error.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl AppError {
    /// Maps this error onto a query failure against `index`.
    #[must_use]
    pub fn into_query(self, index: &str) -> PipelineError {
        match self {
            Self::Pipeline(e) => e,
            other => PipelineError::Query {
                index: index.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Maps this error onto a notification failure.
    #[must_use]
    pub fn into_notification(self) -> PipelineError {
        match self {
            Self::Pipeline(e) => e,
            other => PipelineError::Notification {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type for logalert operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Caps a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 256;
    if body.chars().count() <= MAX {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(MAX).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = AppError::Config("alert.threshold missing".to_string());
        assert_eq!(err.to_string(), "configuration error: alert.threshold missing");
    }

    #[test]
    fn test_status_error_display() {
        let err = AppError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected status 503: unavailable");
    }

    #[test]
    fn test_into_query_wraps_reason() {
        let err = AppError::Decode("missing hits".to_string()).into_query("javalogs-2024-05-01");
        assert_eq!(
            err.to_string(),
            "query against javalogs-2024-05-01 failed: decode error: missing hits"
        );
    }

    #[test]
    fn test_into_notification_keeps_pipeline_errors() {
        let inner = PipelineError::Notification {
            reason: "errcode 40008".to_string(),
        };
        let err = AppError::Pipeline(inner).into_notification();
        assert_eq!(err.to_string(), "notification failed: errcode 40008");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");
        let long = "b".repeat(300);
        assert_eq!(truncate_body(&long).chars().count(), 257);
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<String>("invalid json").unwrap_err();
        assert!(matches!(AppError::from(json_err), AppError::Decode(_)));
    }
}
