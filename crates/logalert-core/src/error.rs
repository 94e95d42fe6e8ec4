//! Error types for the logalert-core crate.

use thiserror::Error;

/// Errors reported by the collaborators of the evaluation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The log store could not be reached at all.
    #[error("log store unavailable: {reason}")]
    StoreUnavailable {
        /// The reason the store is unavailable.
        reason: String,
    },

    /// A count or search query against an index failed.
    #[error("query against {index} failed: {reason}")]
    Query {
        /// The index the query targeted.
        index: String,
        /// The reason the query failed.
        reason: String,
    },

    /// Delivering the alert message failed.
    #[error("notification failed: {reason}")]
    Notification {
        /// The reason the notification failed.
        reason: String,
    },
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_store_unavailable() {
        let err = PipelineError::StoreUnavailable {
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "log store unavailable: connection refused");
    }

    #[test]
    fn error_display_query() {
        let err = PipelineError::Query {
            index: "javalogs-2024-05-01".to_string(),
            reason: "status 500".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "query against javalogs-2024-05-01 failed: status 500"
        );
    }

    #[test]
    fn error_display_notification() {
        let err = PipelineError::Notification {
            reason: "errcode 93000".to_string(),
        };
        assert_eq!(err.to_string(), "notification failed: errcode 93000");
    }
}
