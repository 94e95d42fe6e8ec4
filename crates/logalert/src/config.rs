//! Checker configuration.
//!
//! Configuration is read from a TOML file with one section per external
//! collaborator:
//! - `[elasticsearch]`: store endpoint, credentials, indices and patterns
//! - `[kibana]` and `[alertmanager]`: bases for deep links and silences
//! - `[alert]`: threshold and window length
//! - `[wecom]`: chat webhook endpoint and token
//!
//! Secrets may instead come from the environment, see [`AppConfig::apply_secrets`].

use std::path::Path;
use std::time::Duration;

use logalert_core::{IndexDateZone, PipelineConfig};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default WeCom group-robot endpoint.
pub const DEFAULT_WECOM_URL: &str = "https://qyapi.weixin.qq.com/cgi-bin/webhook/send";

/// Log store settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ElasticConfig {
    /// Base URL of the Elasticsearch HTTP API.
    pub url: String,
    /// Basic-auth user.
    #[serde(default)]
    pub username: Option<String>,
    /// Basic-auth password.
    #[serde(default)]
    pub password: Option<String>,
    /// Prefixes of the daily indices, e.g. `javalogs-`.
    pub index_prefixes: Vec<String>,
    /// Field holding the document timestamp.
    #[serde(default = "default_timestamp_field")]
    pub timestamp_field: String,
    /// Field the error patterns are matched against.
    #[serde(default = "default_error_field")]
    pub error_field: String,
    /// Phrases that mark a document as an error.
    #[serde(default = "default_error_patterns")]
    pub error_patterns: Vec<String>,
}

/// Kibana settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KibanaConfig {
    /// Base URL of the Kibana UI.
    pub url: String,
}

/// Alertmanager settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertmanagerConfig {
    /// Base URL of the Alertmanager API and UI.
    pub url: String,
}

/// Threshold settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlertConfig {
    /// Error count at or above which an alert fires.
    pub threshold: u64,
    /// Window length in minutes; should match the schedule interval.
    pub interval_minutes: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold: 10,
            interval_minutes: 1,
        }
    }
}

/// Chat webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeComConfig {
    /// Webhook endpoint without the `key` parameter.
    #[serde(default = "default_wecom_url")]
    pub webhook_url: String,
    /// Robot key appended as `?key=`.
    #[serde(default)]
    pub token: String,
}

impl Default for WeComConfig {
    fn default() -> Self {
        Self {
            webhook_url: default_wecom_url(),
            token: String::new(),
        }
    }
}

/// Main checker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Which calendar date names today's index.
    #[serde(default)]
    pub index_date_zone: IndexDateZone,
    /// Timeout applied to every HTTP request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Log store settings.
    pub elasticsearch: ElasticConfig,
    /// Kibana settings.
    pub kibana: KibanaConfig,
    /// Alertmanager settings.
    pub alertmanager: AlertmanagerConfig,
    /// Threshold settings.
    #[serde(default)]
    pub alert: AlertConfig,
    /// Chat webhook settings.
    #[serde(default)]
    pub wecom: WeComConfig,
}

fn default_timestamp_field() -> String {
    "@timestamp".to_string()
}

fn default_error_field() -> String {
    "message".to_string()
}

fn default_error_patterns() -> Vec<String> {
    vec!["error".to_string()]
}

fn default_wecom_url() -> String {
    DEFAULT_WECOM_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::Config(format!(
                "failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("invalid TOML: {e}")))
    }

    /// Overrides secrets with values taken from the environment.
    pub fn apply_secrets(&mut self, es_password: Option<String>, wecom_token: Option<String>) {
        if let Some(password) = es_password {
            self.elasticsearch.password = Some(password);
        }
        if let Some(token) = wecom_token {
            self.wecom.token = token;
        }
    }

    /// Validate the configuration.
    ///
    /// The webhook token is checked by the notifier, so dry runs work without it.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), AppError> {
        check_url("elasticsearch.url", &self.elasticsearch.url)?;
        check_url("kibana.url", &self.kibana.url)?;
        check_url("alertmanager.url", &self.alertmanager.url)?;
        check_url("wecom.webhook_url", &self.wecom.webhook_url)?;

        if self.elasticsearch.index_prefixes.is_empty() {
            return Err(AppError::Config(
                "elasticsearch.index_prefixes cannot be empty".to_string(),
            ));
        }
        if self.elasticsearch.index_prefixes.iter().any(String::is_empty) {
            return Err(AppError::Config(
                "elasticsearch.index_prefixes cannot contain an empty prefix".to_string(),
            ));
        }

        if self.elasticsearch.error_patterns.is_empty() {
            return Err(AppError::Config(
                "elasticsearch.error_patterns cannot be empty".to_string(),
            ));
        }
        if self
            .elasticsearch
            .error_patterns
            .iter()
            .any(|p| p.trim().is_empty())
        {
            return Err(AppError::Config(
                "elasticsearch.error_patterns cannot contain a blank pattern".to_string(),
            ));
        }

        if self.elasticsearch.timestamp_field.is_empty() {
            return Err(AppError::Config(
                "elasticsearch.timestamp_field cannot be empty".to_string(),
            ));
        }
        if self.elasticsearch.error_field.is_empty() {
            return Err(AppError::Config(
                "elasticsearch.error_field cannot be empty".to_string(),
            ));
        }

        if self.alert.interval_minutes == 0 {
            return Err(AppError::Config(
                "alert.interval_minutes must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the per-request HTTP timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the settings handed to the evaluation pipeline.
    #[must_use]
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            index_prefixes: self.elasticsearch.index_prefixes.clone(),
            error_patterns: self.elasticsearch.error_patterns.clone(),
            alarm_threshold: self.alert.threshold,
            interval_minutes: self.alert.interval_minutes,
            kibana_url: self.kibana.url.clone(),
            alertmanager_url: self.alertmanager.url.clone(),
            index_date_zone: self.index_date_zone,
        }
    }
}

fn check_url(key: &str, url: &str) -> Result<(), AppError> {
    if url.is_empty() {
        return Err(AppError::Config(format!("{key} cannot be empty")));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(AppError::Config(format!(
            "{key} must start with http:// or https://"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
        [elasticsearch]
        url = "http://127.0.0.1:9200"
        index_prefixes = ["javalogs-"]

        [kibana]
        url = "http://127.0.0.1:5601"

        [alertmanager]
        url = "http://127.0.0.1:9094"
    "#;

    // Helper to create a temporary config file
    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("failed to write temp file");
        file
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = AppConfig::from_toml(MINIMAL).expect("should parse minimal config");

        assert_eq!(config.elasticsearch.index_prefixes, vec!["javalogs-"]);
        // Defaults should be applied
        assert_eq!(config.elasticsearch.timestamp_field, "@timestamp");
        assert_eq!(config.elasticsearch.error_field, "message");
        assert_eq!(config.elasticsearch.error_patterns, vec!["error"]);
        assert_eq!(config.alert.threshold, 10);
        assert_eq!(config.alert.interval_minutes, 1);
        assert_eq!(config.wecom.webhook_url, DEFAULT_WECOM_URL);
        assert_eq!(config.index_date_zone, IndexDateZone::Local);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            index_date_zone = "utc"
            request_timeout_secs = 5

            [elasticsearch]
            url = "https://es.internal:9200"
            username = "alarm"
            password = "secret"
            index_prefixes = ["javalogs-", "nginx-"]
            timestamp_field = "ts"
            error_field = "log"
            error_patterns = ["error", "Exception"]

            [kibana]
            url = "https://kibana.internal"

            [alertmanager]
            url = "https://am.internal"

            [alert]
            threshold = 25
            interval_minutes = 5

            [wecom]
            token = "robot-key"
        "#;

        let config = AppConfig::from_toml(toml).expect("should parse full config");
        assert!(config.validate().is_ok());

        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.index_prefixes, vec!["javalogs-", "nginx-"]);
        assert_eq!(pipeline.error_patterns, vec!["error", "Exception"]);
        assert_eq!(pipeline.alarm_threshold, 25);
        assert_eq!(pipeline.interval_minutes, 5);
        assert_eq!(pipeline.kibana_url, "https://kibana.internal");
        assert_eq!(pipeline.alertmanager_url, "https://am.internal");
        assert_eq!(pipeline.index_date_zone, IndexDateZone::Utc);
        assert_eq!(config.elasticsearch.username.as_deref(), Some("alarm"));
        assert_eq!(config.wecom.token, "robot-key");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_from_file() {
        let file = create_temp_config(MINIMAL);
        let config = AppConfig::from_file(file.path()).expect("should load");
        assert_eq!(config.kibana.url, "http://127.0.0.1:5601");
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::from_file("/nonexistent/logalert.toml");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let result = AppConfig::from_toml("[elasticsearch");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_secrets_override_file_values() {
        let mut config = AppConfig::from_toml(MINIMAL).unwrap();
        config.apply_secrets(Some("from-env".to_string()), Some("key-from-env".to_string()));
        assert_eq!(config.elasticsearch.password.as_deref(), Some("from-env"));
        assert_eq!(config.wecom.token, "key-from-env");

        config.apply_secrets(None, None);
        assert_eq!(config.wecom.token, "key-from-env");
    }

    mod validation {
        use super::*;
        use test_case::test_case;

        fn base() -> AppConfig {
            AppConfig::from_toml(MINIMAL).unwrap()
        }

        #[test_case(|c: &mut AppConfig| c.elasticsearch.url = String::new(); "empty store url")]
        #[test_case(|c: &mut AppConfig| c.kibana.url = "kibana:5601".to_string(); "url without scheme")]
        #[test_case(|c: &mut AppConfig| c.alertmanager.url = "ftp://am".to_string(); "non http scheme")]
        #[test_case(|c: &mut AppConfig| c.elasticsearch.index_prefixes.clear(); "no prefixes")]
        #[test_case(|c: &mut AppConfig| c.elasticsearch.index_prefixes.push(String::new()); "empty prefix")]
        #[test_case(|c: &mut AppConfig| c.elasticsearch.error_patterns.clear(); "no patterns")]
        #[test_case(|c: &mut AppConfig| c.elasticsearch.error_patterns.push("  ".to_string()); "blank pattern")]
        #[test_case(|c: &mut AppConfig| c.elasticsearch.error_field = String::new(); "empty error field")]
        #[test_case(|c: &mut AppConfig| c.elasticsearch.timestamp_field = String::new(); "empty timestamp field")]
        #[test_case(|c: &mut AppConfig| c.alert.interval_minutes = 0; "zero interval")]
        #[test_case(|c: &mut AppConfig| c.request_timeout_secs = 0; "zero timeout")]
        fn rejects(mutate: fn(&mut AppConfig)) {
            let mut config = base();
            mutate(&mut config);
            assert!(matches!(config.validate(), Err(AppError::Config(_))));
        }

        #[test]
        fn zero_threshold_is_allowed() {
            let mut config = base();
            config.alert.threshold = 0;
            assert!(config.validate().is_ok());
        }
    }
}
