//! Contracts the pipeline needs from the log store and the silence service.

use std::future::Future;

use crate::error::Result;
use crate::index::IndexTarget;
use crate::types::ErrorSearch;
use crate::window::EvaluationWindow;

/// Read access to a date-partitioned log store.
///
/// Implementations must report a missing index as zero counts rather than
/// an error: the index for today may simply not exist yet.
pub trait LogQueryGateway: Send + Sync {
    /// Checks that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::StoreUnavailable` if the store cannot be reached.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// Counts every document of `index` within `window`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Query` on transport or store failure.
    fn count_total(
        &self,
        index: &IndexTarget,
        window: &EvaluationWindow,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Finds documents of `index` within `window` whose message field matches
    /// any of `patterns`.
    ///
    /// Records come back in store order, which must be stable within one call.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Query` on transport or store failure.
    fn search_errors(
        &self,
        index: &IndexTarget,
        window: &EvaluationWindow,
        patterns: &[String],
    ) -> impl Future<Output = Result<ErrorSearch>> + Send;
}

/// Source of silence state for an index.
pub trait SilenceGate: Send + Sync {
    /// Returns true if an active silence covers `index`.
    ///
    /// Never fails: an unreachable or unreadable silence service must report
    /// `false` and log the failure.
    fn is_silenced(&self, index: &IndexTarget) -> impl Future<Output = bool> + Send;
}

impl<T: LogQueryGateway> LogQueryGateway for &T {
    fn ping(&self) -> impl Future<Output = Result<()>> + Send {
        (**self).ping()
    }

    fn count_total(
        &self,
        index: &IndexTarget,
        window: &EvaluationWindow,
    ) -> impl Future<Output = Result<u64>> + Send {
        (**self).count_total(index, window)
    }

    fn search_errors(
        &self,
        index: &IndexTarget,
        window: &EvaluationWindow,
        patterns: &[String],
    ) -> impl Future<Output = Result<ErrorSearch>> + Send {
        (**self).search_errors(index, window, patterns)
    }
}

impl<T: SilenceGate> SilenceGate for &T {
    fn is_silenced(&self, index: &IndexTarget) -> impl Future<Output = bool> + Send {
        (**self).is_silenced(index)
    }
}
