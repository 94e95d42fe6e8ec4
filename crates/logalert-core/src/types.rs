//! Core types for the evaluation pipeline.
//!
//! This module provides:
//! - [`LogRecord`]: a matching log document projected to timestamp and message
//! - [`ErrorSearch`]: the result of an error-match query
//! - [`EvaluationResult`]: counts, ratio and samples for one index
//! - [`AlertDecision`]: whether an evaluated index should alert

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::index::IndexTarget;

/// A log document that matched one of the error patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// When the log line was written.
    pub timestamp: DateTime<Utc>,
    /// The log message.
    pub message: String,
}

impl LogRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(timestamp: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            message: message.into(),
        }
    }
}

/// The answer of an error-match query.
///
/// `total_errors` is the store's hit count, which may be larger than
/// `records` because the store only returns a page of hits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSearch {
    /// Matching records in store order.
    pub records: Vec<LogRecord>,
    /// Total number of matching documents in the window.
    pub total_errors: u64,
}

impl ErrorSearch {
    /// Creates a search result.
    #[must_use]
    pub const fn new(records: Vec<LogRecord>, total_errors: u64) -> Self {
        Self {
            records,
            total_errors,
        }
    }

    /// The result for an index that does not exist yet.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            records: Vec::new(),
            total_errors: 0,
        }
    }
}

/// Counts, ratio and sample messages for one index over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// The evaluated index.
    pub index: IndexTarget,
    /// All documents in the window.
    pub total_count: u64,
    /// Documents matching an error pattern in the window.
    pub error_count: u64,
    /// `error_count / total_count * 100`, or `0.0` for an empty window.
    pub error_ratio_percent: f64,
    /// At most three messages, in store order.
    pub sample_messages: Vec<String>,
}

impl EvaluationResult {
    /// Returns the ratio rendered with one decimal, e.g. `24.0%`.
    #[must_use]
    pub fn ratio_display(&self) -> String {
        format!("{:.1}%", self.error_ratio_percent)
    }
}

/// The threshold and silence inputs that decide whether to alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDecision {
    /// The evaluated error count.
    pub error_count: u64,
    /// The configured alarm threshold.
    pub threshold: u64,
    /// Whether an active silence covers the index.
    pub silenced: bool,
}

impl AlertDecision {
    /// Creates a decision.
    #[must_use]
    pub const fn new(error_count: u64, threshold: u64, silenced: bool) -> Self {
        Self {
            error_count,
            threshold,
            silenced,
        }
    }

    /// Returns true if the error count reaches the threshold.
    #[must_use]
    pub const fn over_threshold(&self) -> bool {
        self.error_count >= self.threshold
    }

    /// Returns true if an alert should be delivered.
    #[must_use]
    pub const fn should_fire(&self) -> bool {
        self.over_threshold() && !self.silenced
    }
}
