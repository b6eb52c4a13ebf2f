//! # Normalized reading and refresh status.
//!
//! [`PopularityReading`] is what one successful refresh cycle produces after
//! normalization: a clamped 0..=100 value, the live/historical flag, and the
//! per-weekday historical grid. Readings are immutable once created; the
//! fan-out replaces the cached one wholesale, never edits it in place.
//!
//! [`RefreshStatus`] tracks the outcome trail across cycles: last success
//! time, last error kind, consecutive failure count. A cancelled cycle is
//! not an outcome and leaves the status untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::RefreshErrorKind;

/// Weekday labels, Monday first, matching the historical grid indices.
const DAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Returns the lowercase English name for a weekday index
/// (0 = Monday .. 6 = Sunday), or `None` out of range.
///
/// Useful for hosts rendering per-day attributes from
/// [`PopularityReading::per_weekday`].
pub fn day_name(weekday: usize) -> Option<&'static str> {
    DAY_NAMES.get(weekday).copied()
}

/// One normalized popularity observation.
///
/// Created by the refresh engine on every successful cycle, cached by the
/// fan-out, shared read-only with consumers behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularityReading {
    /// Occupancy percentage, clamped to 0..=100.
    pub value: u8,
    /// `true` when the value came from the live estimate, `false` when it
    /// fell back to the historical grid.
    pub is_live: bool,
    /// Venue name as the data source reported it.
    pub venue_name: Option<String>,
    /// Venue address as the data source reported it.
    pub address: Option<String>,
    /// Hourly curves per weekday (0 = Monday .. 6 = Sunday); days the source
    /// had no data for stay `None`.
    pub per_weekday: [Option<Vec<i32>>; 7],
    /// When this reading was produced.
    pub captured_at: DateTime<Utc>,
}

impl PopularityReading {
    /// Returns the historical curve for a weekday, if present.
    pub fn day(&self, weekday: usize) -> Option<&[i32]> {
        self.per_weekday
            .get(weekday)
            .and_then(Option::as_ref)
            .map(Vec::as_slice)
    }
}

/// Rolling refresh outcome state for one venue.
///
/// Success resets the failure streak and clears the last error; a failed
/// cycle increments the streak and records the error kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RefreshStatus {
    /// When the last successful cycle completed, if any.
    pub last_success_time: Option<DateTime<Utc>>,
    /// Error kind of the most recent failed cycle; cleared on success.
    pub last_error: Option<RefreshErrorKind>,
    /// Failed cycles since the last success.
    pub consecutive_failures: u32,
}

impl RefreshStatus {
    pub(crate) fn record_success(&mut self, at: DateTime<Utc>) {
        self.last_success_time = Some(at);
        self.last_error = None;
        self.consecutive_failures = 0;
    }

    pub(crate) fn record_failure(&mut self, kind: RefreshErrorKind) {
        self.last_error = Some(kind);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_names_cover_the_week() {
        assert_eq!(day_name(0), Some("monday"));
        assert_eq!(day_name(6), Some("sunday"));
        assert_eq!(day_name(7), None);
    }

    #[test]
    fn status_tracks_failure_streaks() {
        let mut status = RefreshStatus::default();
        status.record_failure(RefreshErrorKind::Exhausted);
        status.record_failure(RefreshErrorKind::NoData);
        assert_eq!(status.consecutive_failures, 2);
        assert_eq!(status.last_error, Some(RefreshErrorKind::NoData));

        status.record_success(Utc::now());
        assert_eq!(status.consecutive_failures, 0);
        assert!(status.last_error.is_none());
        assert!(status.last_success_time.is_some());
    }
}
