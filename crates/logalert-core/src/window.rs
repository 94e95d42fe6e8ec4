//! Trailing evaluation window.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// The `[start, end]` time span every index of a run is evaluated over.
///
/// A window is resolved once at pipeline start so that the total-count and
/// error-count queries of every index see the same bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl EvaluationWindow {
    /// Creates the window ending at `now` and reaching back `interval_minutes`.
    ///
    /// An interval of zero is treated as one minute so that `start < end`
    /// always holds.
    #[must_use]
    pub fn trailing(now: DateTime<Utc>, interval_minutes: u32) -> Self {
        let minutes = i64::from(interval_minutes.max(1));
        Self {
            start: now - Duration::minutes(minutes),
            end: now,
        }
    }

    /// Returns the inclusive lower bound.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the inclusive upper bound.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the length of the window.
    #[must_use]
    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if a timestamp falls within the window, both ends inclusive.
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Formats the lower bound as RFC 3339 UTC with millisecond precision.
    #[must_use]
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Formats the upper bound as RFC 3339 UTC with millisecond precision.
    #[must_use]
    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn trailing_window_bounds() {
        let window = EvaluationWindow::trailing(fixed_now(), 5);
        assert_eq!(window.end(), fixed_now());
        assert_eq!(
            window.start(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 25, 0).unwrap()
        );
    }

    #[test]
    fn zero_interval_is_clamped() {
        let window = EvaluationWindow::trailing(fixed_now(), 0);
        assert_eq!(window.length(), Duration::minutes(1));
    }

    #[test]
    fn contains_is_inclusive() {
        let window = EvaluationWindow::trailing(fixed_now(), 1);
        assert!(window.contains(window.start()));
        assert!(window.contains(window.end()));
        assert!(!window.contains(window.end() + Duration::milliseconds(1)));
        assert!(!window.contains(window.start() - Duration::milliseconds(1)));
    }

    #[test]
    fn rfc3339_bounds_use_millis_and_z() {
        let window = EvaluationWindow::trailing(fixed_now(), 1);
        assert_eq!(window.start_rfc3339(), "2024-05-01T12:29:00.000Z");
        assert_eq!(window.end_rfc3339(), "2024-05-01T12:30:00.000Z");
    }

    proptest! {
        #[test]
        fn prop_window_matches_interval(
            secs in 0i64..4_000_000_000,
            interval in 1u32..10_000,
        ) {
            let now = Utc.timestamp_opt(secs, 0).unwrap();
            let window = EvaluationWindow::trailing(now, interval);
            prop_assert!(window.start() < window.end());
            prop_assert_eq!(window.length(), Duration::minutes(i64::from(interval)));
        }
    }
}
