//! Wiring tests for the checker entry point.

use logalert::{AppConfig, AppError};
use logalert_core::PipelineError;

const EXAMPLE: &str = include_str!("../config.example.toml");

fn unreachable_config() -> AppConfig {
    let mut config = AppConfig::from_toml(EXAMPLE).expect("example config parses");
    config.elasticsearch.url = "http://127.0.0.1:9".to_string();
    config.request_timeout_secs = 1;
    config
}

#[test]
fn example_config_is_valid() {
    let config = AppConfig::from_toml(EXAMPLE).expect("example config parses");
    assert!(config.validate().is_ok());
    assert!(config.wecom.token.is_empty());
}

#[tokio::test]
async fn unreachable_store_aborts_the_run() {
    let result = logalert::run_once(&unreachable_config(), true).await;
    assert!(matches!(
        result,
        Err(AppError::Pipeline(PipelineError::StoreUnavailable { .. }))
    ));
}

#[tokio::test]
async fn live_run_requires_a_token() {
    let result = logalert::run_once(&unreachable_config(), false).await;
    assert!(matches!(result, Err(AppError::Config(_))));
}
