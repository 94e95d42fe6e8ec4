//! logalert - checks today's log indices for error spikes.
//!
//! Meant to be started by cron or a Kubernetes `CronJob` at the same
//! interval as `alert.interval_minutes`.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use logalert::AppConfig;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "logalert")]
#[command(about = "Alert a chat webhook when today's log indices show an error spike")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, env = "LOGALERT_CONFIG", default_value = "/etc/logalert/config.toml")]
    config: PathBuf,

    /// Elasticsearch password, overrides the config file
    #[arg(long, env = "LOGALERT_ES_PASSWORD", hide_env_values = true)]
    es_password: Option<String>,

    /// WeCom robot key, overrides the config file
    #[arg(long, env = "LOGALERT_WECOM_TOKEN", hide_env_values = true)]
    wecom_token: Option<String>,

    /// Log rendered alerts instead of sending them
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("logalert=info,logalert_core=info")
        }))
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to create async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    info!(config = %cli.config.display(), "starting logalert");

    let mut config = AppConfig::from_file(&cli.config)?;
    config.apply_secrets(cli.es_password, cli.wecom_token);
    config.validate()?;

    let report = logalert::run_once(&config, cli.dry_run).await?;

    for entry in &report.indices {
        info!(index = %entry.target, outcome = %entry.outcome, "index result");
    }

    Ok(())
}
