//! Turns the two per-index query results into an [`EvaluationResult`].

use crate::index::IndexTarget;
use crate::types::{ErrorSearch, EvaluationResult};

/// Maximum number of sample messages kept per index.
pub const SAMPLE_LIMIT: usize = 3;

/// Computes the error ratio in percent.
///
/// Returns `0.0` for an empty window. The store is not trusted to keep
/// `error_count <= total_count`, so the ratio may exceed 100.
#[must_use]
pub fn error_ratio_percent(error_count: u64, total_count: u64) -> f64 {
    if total_count == 0 {
        return 0.0;
    }
    error_count as f64 / total_count as f64 * 100.0
}

/// Evaluates one index.
///
/// The error count is the store's hit total, not the number of returned
/// records; samples are the first [`SAMPLE_LIMIT`] records in received order.
#[must_use]
pub fn evaluate(index: IndexTarget, total_count: u64, search: ErrorSearch) -> EvaluationResult {
    let error_count = search.total_errors;
    let sample_messages = search
        .records
        .into_iter()
        .take(SAMPLE_LIMIT)
        .map(|record| record.message)
        .collect();

    EvaluationResult {
        index,
        total_count,
        error_count,
        error_ratio_percent: error_ratio_percent(error_count, total_count),
        sample_messages,
    }
}
