//! The single-shot alert evaluation pipeline.
//!
//! This module provides the [`AlertPipeline`] which is the main entry point
//! of the crate. One call to [`AlertPipeline::run`] resolves the window,
//! walks every configured index prefix in order and, per index:
//! - queries total and error counts from the log store
//! - evaluates ratio and sample messages
//! - consults the silence gate
//! - renders and delivers an alert when the threshold is reached
//!
//! Failures are isolated per index; only an unreachable store aborts a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::channels::Notifier;
use crate::error::Result;
use crate::evaluator::evaluate;
use crate::formatter::format_alert;
use crate::gateway::{LogQueryGateway, SilenceGate};
use crate::index::{resolve_indices, IndexDateZone, IndexTarget};
use crate::links::{explore_link, silence_link};
use crate::types::{AlertDecision, EvaluationResult};
use crate::window::EvaluationWindow;

/// Settings the pipeline needs for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Index prefixes, evaluated in this order.
    pub index_prefixes: Vec<String>,
    /// Phrases that mark a log line as an error; any one matching suffices.
    pub error_patterns: Vec<String>,
    /// Error count at or above which an alert fires.
    pub alarm_threshold: u64,
    /// Length of the trailing window in minutes.
    pub interval_minutes: u32,
    /// Base URL of the Kibana UI used for explore links.
    pub kibana_url: String,
    /// Base URL of the Alertmanager UI used for silence links.
    pub alertmanager_url: String,
    /// Clock that decides today's index suffix.
    #[serde(default)]
    pub index_date_zone: IndexDateZone,
}

/// What happened to one index during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The error count stayed below the threshold.
    BelowThreshold,
    /// An active silence suppressed the alert.
    Silenced,
    /// The alert was delivered.
    Notified,
    /// The alert could not be delivered.
    NotificationFailed {
        /// Why delivery failed.
        reason: String,
    },
    /// The store queries for the index failed; the index was skipped.
    QueryFailed {
        /// Why the query failed.
        reason: String,
    },
}

impl IndexOutcome {
    /// Returns the outcome as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BelowThreshold => "below_threshold",
            Self::Silenced => "silenced",
            Self::Notified => "notified",
            Self::NotificationFailed { .. } => "notification_failed",
            Self::QueryFailed { .. } => "query_failed",
        }
    }

    /// Returns true if the outcome records a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::NotificationFailed { .. } | Self::QueryFailed { .. }
        )
    }
}

impl std::fmt::Display for IndexOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The per-index record of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    /// The evaluated index.
    pub target: IndexTarget,
    /// Counts and samples, absent when the queries failed.
    pub evaluation: Option<EvaluationResult>,
    /// What the pipeline did with the index.
    pub outcome: IndexOutcome,
}

/// The result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// The window shared by every index of the run.
    pub window: EvaluationWindow,
    /// One entry per configured prefix, in configured order.
    pub indices: Vec<IndexReport>,
}

impl RunReport {
    fn new(window: EvaluationWindow) -> Self {
        Self {
            window,
            indices: Vec::new(),
        }
    }

    /// Number of alerts delivered.
    #[must_use]
    pub fn notified(&self) -> usize {
        self.count(|o| matches!(o, IndexOutcome::Notified))
    }

    /// Number of indices suppressed by a silence.
    #[must_use]
    pub fn silenced(&self) -> usize {
        self.count(|o| matches!(o, IndexOutcome::Silenced))
    }

    /// Number of indices that hit a query or notification failure.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(IndexOutcome::is_failure)
    }

    /// Returns the report for the index named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&IndexReport> {
        self.indices.iter().find(|r| r.target.name() == name)
    }

    fn count(&self, pred: impl Fn(&IndexOutcome) -> bool) -> usize {
        self.indices.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Evaluates configured indices against a log store and alerts on error spikes.
#[derive(Debug)]
pub struct AlertPipeline<S, G, N> {
    config: PipelineConfig,
    store: S,
    silences: G,
    notifier: N,
}

impl<S, G, N> AlertPipeline<S, G, N>
where
    S: LogQueryGateway,
    G: SilenceGate,
    N: Notifier,
{
    /// Creates a pipeline from its configuration and collaborators.
    #[must_use]
    pub const fn new(config: PipelineConfig, store: S, silences: G, notifier: N) -> Self {
        Self {
            config,
            store,
            silences,
            notifier,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the pipeline against the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::StoreUnavailable` if the store cannot be reached.
    pub async fn run(&self) -> Result<RunReport> {
        self.run_at(Utc::now()).await
    }

    /// Runs the pipeline as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::StoreUnavailable` if the store cannot be reached.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        let window = EvaluationWindow::trailing(now, self.config.interval_minutes);
        debug!(
            start = %window.start_rfc3339(),
            end = %window.end_rfc3339(),
            "resolved evaluation window"
        );

        if let Err(e) = self.store.ping().await {
            error!(error = %e, "log store unreachable, aborting run");
            return Err(e);
        }

        let date = self.config.index_date_zone.date_of(now);
        let mut report = RunReport::new(window);

        for target in resolve_indices(&self.config.index_prefixes, date) {
            let (evaluation, outcome) = self.evaluate_index(&target, &window).await;
            report.indices.push(IndexReport {
                target,
                evaluation,
                outcome,
            });
        }

        info!(
            indices = report.indices.len(),
            notified = report.notified(),
            silenced = report.silenced(),
            failed = report.failed(),
            "run complete"
        );

        Ok(report)
    }

    async fn evaluate_index(
        &self,
        target: &IndexTarget,
        window: &EvaluationWindow,
    ) -> (Option<EvaluationResult>, IndexOutcome) {
        let result = match self.query(target, window).await {
            Ok(result) => result,
            Err(e) => {
                error!(index = %target, error = %e, "query failed, skipping index");
                return (
                    None,
                    IndexOutcome::QueryFailed {
                        reason: e.to_string(),
                    },
                );
            }
        };

        info!(
            index = %target,
            total = result.total_count,
            errors = result.error_count,
            ratio = %result.ratio_display(),
            "evaluated index"
        );
        for (i, sample) in result.sample_messages.iter().enumerate() {
            debug!(index = %target, n = i + 1, message = %sample, "error sample");
        }

        let silenced = self.silences.is_silenced(target).await;
        let decision =
            AlertDecision::new(result.error_count, self.config.alarm_threshold, silenced);

        if silenced {
            info!(index = %target, errors = result.error_count, "skipped: active silence");
            return (Some(result), IndexOutcome::Silenced);
        }

        if !decision.should_fire() {
            debug!(
                index = %target,
                errors = result.error_count,
                threshold = self.config.alarm_threshold,
                "below threshold"
            );
            return (Some(result), IndexOutcome::BelowThreshold);
        }

        let explore = explore_link(&self.config.kibana_url, target, window);
        let silence = silence_link(&self.config.alertmanager_url, target);
        let message = format_alert(&result, &explore, &silence);
        debug!(index = %target, link = %explore, "explore link");

        let outcome = match self.notifier.send(&message).await {
            Ok(receipt) => {
                info!(
                    index = %target,
                    channel = %self.notifier.name(),
                    receipt = %receipt,
                    "alert delivered"
                );
                IndexOutcome::Notified
            }
            Err(e) => {
                error!(
                    index = %target,
                    channel = %self.notifier.name(),
                    error = %e,
                    "alert delivery failed"
                );
                IndexOutcome::NotificationFailed {
                    reason: e.to_string(),
                }
            }
        };

        (Some(result), outcome)
    }

    async fn query(
        &self,
        target: &IndexTarget,
        window: &EvaluationWindow,
    ) -> Result<EvaluationResult> {
        let total = self.store.count_total(target, window).await?;
        let search = self
            .store
            .search_errors(target, window, &self.config.error_patterns)
            .await?;
        Ok(evaluate(target.clone(), total, search))
    }
}
