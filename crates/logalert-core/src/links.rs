//! Deep links embedded in alert messages.

use url::form_urlencoded;

use crate::index::IndexTarget;
use crate::window::EvaluationWindow;

/// Builds a Kibana Discover link showing `index` over exactly `window`.
#[must_use]
pub fn explore_link(kibana_url: &str, index: &IndexTarget, window: &EvaluationWindow) -> String {
    format!(
        "{}/app/discover#/?_g=(filters:!(),refreshInterval:(pause:!t,value:0),time:(from:'{}',to:'{}'))&_a=(columns:!('@timestamp',message),filters:!(),index:{},interval:auto,query:(language:kuery,query:''),sort:!(!('@timestamp',desc)))",
        kibana_url.trim_end_matches('/'),
        window.start_rfc3339(),
        window.end_rfc3339(),
        index.name(),
    )
}

/// Builds an Alertmanager UI link that opens a new silence scoped to `index`.
#[must_use]
pub fn silence_link(alertmanager_url: &str, index: &IndexTarget) -> String {
    let matcher = format!("{{path=\"{}\"}}", index.name());
    let encoded: String = form_urlencoded::byte_serialize(matcher.as_bytes()).collect();
    format!(
        "{}/#/silences/new?filter={encoded}",
        alertmanager_url.trim_end_matches('/')
    )
}
