//! Date-suffixed index resolution.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A concrete index for one configured prefix on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexTarget {
    /// The configured prefix, e.g. `javalogs-`.
    pub prefix: String,
    /// The calendar date the index covers.
    pub date: NaiveDate,
    /// `prefix` followed by `date` as `YYYY-MM-DD`.
    pub resolved_name: String,
}

impl IndexTarget {
    /// Builds the target for `prefix` on `date`.
    #[must_use]
    pub fn new(prefix: impl Into<String>, date: NaiveDate) -> Self {
        let prefix = prefix.into();
        let resolved_name = format!("{prefix}{}", date.format("%Y-%m-%d"));
        Self {
            prefix,
            date,
            resolved_name,
        }
    }

    /// Returns the resolved index name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.resolved_name
    }
}

impl fmt::Display for IndexTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolved_name)
    }
}

/// Which clock decides the date suffix of "today".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexDateZone {
    /// The process-local calendar date.
    #[default]
    Local,
    /// The UTC calendar date.
    Utc,
}

impl IndexDateZone {
    /// Returns the calendar date of `now` in this zone.
    #[must_use]
    pub fn date_of(self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => now.with_timezone(&Local).date_naive(),
            Self::Utc => now.date_naive(),
        }
    }
}

/// Resolves one target per prefix, in configured order.
#[must_use]
pub fn resolve_indices<S: AsRef<str>>(prefixes: &[S], date: NaiveDate) -> Vec<IndexTarget> {
    prefixes
        .iter()
        .map(|prefix| IndexTarget::new(prefix.as_ref(), date))
        .collect()
}
