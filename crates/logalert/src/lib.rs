//! logalert - one-shot log error-rate checker.
//!
//! Wires the [`logalert_core`] pipeline to concrete collaborators:
//! - [`elastic::ElasticGateway`] for the log store
//! - [`alertmanager::AlertmanagerGate`] for silences
//! - [`wecom::WeComNotifier`] for chat delivery
//!
//! Configuration is loaded from TOML by [`config::AppConfig`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod alertmanager;
pub mod config;
pub mod elastic;
pub mod error;
pub mod http;
pub mod wecom;

pub use alertmanager::AlertmanagerGate;
pub use config::AppConfig;
pub use elastic::ElasticGateway;
pub use error::{AppError, Result};
pub use wecom::WeComNotifier;

use logalert_core::{AlertPipeline, LogNotifier, RunReport};
use tracing::info;

/// Runs one evaluation pass with the collaborators described by `config`.
///
/// With `dry_run` set, alerts are written to the log instead of the webhook.
///
/// # Errors
///
/// Returns an error if the HTTP client or notifier cannot be built, or if
/// the log store is unreachable.
pub async fn run_once(config: &AppConfig, dry_run: bool) -> Result<RunReport> {
    let client = http::build_client(config.request_timeout())?;
    let store = ElasticGateway::new(&config.elasticsearch, client.clone());
    let silences = AlertmanagerGate::new(&config.alertmanager.url, client.clone());
    let pipeline_config = config.pipeline_config();

    let report = if dry_run {
        info!("dry run, alerts go to the log only");
        AlertPipeline::new(pipeline_config, store, silences, LogNotifier::new("dry-run"))
            .run()
            .await?
    } else {
        let notifier = WeComNotifier::new(&config.wecom, client)?;
        AlertPipeline::new(pipeline_config, store, silences, notifier)
            .run()
            .await?
    };

    Ok(report)
}
