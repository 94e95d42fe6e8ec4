//! Log error-rate alerting with Alertmanager-style silencing.
//!
//! `logalert-core` samples date-partitioned log indices over a trailing
//! window, counts lines matching error patterns and raises a chat alert when
//! the error count reaches a threshold, unless an external silence covers
//! the index.
//!
//! # Features
//!
//! - **Shared window**: every index of a run is evaluated over the same bounds
//! - **Multiple indices and patterns**: prefixes are resolved to today's
//!   index names; patterns are OR-ed
//! - **Silences**: checked per index, fail-open, scoped to that index only
//! - **Markdown alerts**: counts, ratio, samples and deep links to Kibana
//!   and Alertmanager
//! - **Failure isolation**: a failing index or notification does not stop
//!   the rest of the run
//!
//! The log store, silence service and chat channel are abstracted behind
//! [`LogQueryGateway`], [`SilenceGate`] and [`Notifier`].
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use logalert_core::{
//!     evaluate, explore_link, format_alert, silence_link, ErrorSearch, EvaluationWindow,
//!     IndexTarget, LogRecord,
//! };
//!
//! let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
//! let window = EvaluationWindow::trailing(now, 1);
//! let index = IndexTarget::new("javalogs-", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
//!
//! let search = ErrorSearch::new(vec![LogRecord::new(now, "NullPointerException")], 12);
//! let result = evaluate(index.clone(), 50, search);
//! assert_eq!(result.ratio_display(), "24.0%");
//!
//! let message = format_alert(
//!     &result,
//!     &explore_link("http://kibana:5601", &index, &window),
//!     &silence_link("http://alertmanager:9094", &index),
//! );
//! assert!(message.contains("NullPointerException"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channels;
pub mod error;
pub mod evaluator;
pub mod formatter;
pub mod gateway;
pub mod index;
pub mod links;
pub mod pipeline;
pub mod types;
pub mod window;

// Re-export main types at crate root
pub use channels::{LogNotifier, NotificationReceipt, Notifier};
pub use error::{PipelineError, Result};
pub use evaluator::{error_ratio_percent, evaluate, SAMPLE_LIMIT};
pub use formatter::format_alert;
pub use gateway::{LogQueryGateway, SilenceGate};
pub use index::{resolve_indices, IndexDateZone, IndexTarget};
pub use links::{explore_link, silence_link};
pub use pipeline::{AlertPipeline, IndexOutcome, IndexReport, PipelineConfig, RunReport};
pub use types::{AlertDecision, ErrorSearch, EvaluationResult, LogRecord};
pub use window::EvaluationWindow;
