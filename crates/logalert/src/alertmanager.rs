//! Alertmanager implementation of the silence gate.

use logalert_core::{IndexTarget, SilenceGate};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::http::{ensure_success, read_body};

/// Looks up active silences through the Alertmanager v2 API.
///
/// Silences are matched on a `path` label equal to the index name.
#[derive(Debug, Clone)]
pub struct AlertmanagerGate {
    client: Client,
    base_url: String,
}

impl AlertmanagerGate {
    /// Creates a gate for the Alertmanager at `base_url`.
    #[must_use]
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the silences endpoint.
    #[must_use]
    pub fn silences_url(&self) -> String {
        format!("{}/api/v2/silences", self.base_url)
    }

    async fn fetch(&self, index: &IndexTarget) -> Result<bool> {
        let filter = path_matcher(index);
        let response = self
            .client
            .get(self.silences_url())
            .query(&[("filter", filter.as_str()), ("active", "true")])
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        ensure_success(status, &body)?;
        decode_silences(&body)
    }
}

impl SilenceGate for AlertmanagerGate {
    async fn is_silenced(&self, index: &IndexTarget) -> bool {
        match self.fetch(index).await {
            Ok(silenced) => {
                debug!(index = %index, silenced, "checked silences");
                silenced
            }
            Err(e) => {
                warn!(index = %index, error = %e, "silence check failed, assuming not silenced");
                false
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SilenceEntry {
    status: SilenceStatus,
}

#[derive(Debug, Deserialize)]
struct SilenceStatus {
    state: String,
}

/// Builds the label matcher selecting silences for `index`.
#[must_use]
pub fn path_matcher(index: &IndexTarget) -> String {
    format!("path=\"{}\"", index.name())
}

/// Decodes a silence list; true if any entry is active.
///
/// # Errors
///
/// Returns `AppError::Decode` if the body is not a silence list.
pub fn decode_silences(body: &str) -> Result<bool> {
    let entries: Vec<SilenceEntry> = serde_json::from_str(body)?;
    Ok(entries.iter().any(|e| e.status.state == "active"))
}
