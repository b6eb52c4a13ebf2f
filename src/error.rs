//! Error types used by the popwatch engine, fan-out, and watcher.
//!
//! This module defines three error enums, one per boundary:
//!
//! - [`FetchError`] — classification of a failed data-source call
//!   (transient vs. permanent), produced by fetcher adapters.
//! - [`RefreshError`] — terminal outcome of one refresh cycle, produced by
//!   the refresh engine and handed to the fan-out.
//! - [`WatchError`] — errors raised by the watcher runtime itself
//!   (configuration rejects, shutdown grace overruns).
//!
//! All types provide `as_label()` for stable snake_case identifiers in
//! logs/metrics; [`RefreshError::kind`] yields the compact
//! [`RefreshErrorKind`] stored in
//! [`RefreshStatus`](crate::reading::RefreshStatus).

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// # Errors classified at the fetch boundary.
///
/// A fetcher adapter must map every failure of the underlying call into one
/// of these two classes; the refresh engine retries `Transient` and gives
/// up immediately on `Permanent`.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// Retryable condition: network timeout, refused connection, rate
    /// limiting, or a server-side HTTP error (429/5xx).
    #[error("transient fetch failure: {reason}")]
    Transient {
        /// Human-readable description of the underlying condition.
        reason: String,
    },

    /// Non-retryable condition: malformed response, unexpected payload, or
    /// any other HTTP error.
    #[error("permanent fetch failure: {reason}")]
    Permanent {
        /// Human-readable description of the underlying condition.
        reason: String,
    },
}

impl FetchError {
    /// Builds a transient (retryable) fetch error.
    pub fn transient(reason: impl Into<String>) -> Self {
        FetchError::Transient {
            reason: reason.into(),
        }
    }

    /// Builds a permanent (non-retryable) fetch error.
    pub fn permanent(reason: impl Into<String>) -> Self {
        FetchError::Permanent {
            reason: reason.into(),
        }
    }

    /// Classifies an HTTP status code for transports that surface one.
    ///
    /// `429` and every `5xx` status are transient (the server asked us to
    /// back off, or may recover); every other status is permanent.
    ///
    /// # Example
    /// ```
    /// use popwatch::FetchError;
    ///
    /// assert!(FetchError::from_status(429, "popularity endpoint").is_transient());
    /// assert!(FetchError::from_status(503, "popularity endpoint").is_transient());
    /// assert!(!FetchError::from_status(404, "popularity endpoint").is_transient());
    /// ```
    pub fn from_status(status: u16, context: impl Into<String>) -> Self {
        let reason = format!("http status {status} from {}", context.into());
        if status == 429 || (500..=599).contains(&status) {
            FetchError::Transient { reason }
        } else {
            FetchError::Permanent { reason }
        }
    }

    /// Indicates whether the refresh engine may retry after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::Transient { .. } => "fetch_transient",
            FetchError::Permanent { .. } => "fetch_permanent",
        }
    }

    /// Returns the underlying reason string.
    pub fn reason(&self) -> &str {
        match self {
            FetchError::Transient { reason } | FetchError::Permanent { reason } => reason,
        }
    }
}

/// Compact classification of a refresh failure.
///
/// This is the form cached in [`RefreshStatus`](crate::reading::RefreshStatus)
/// and exported by diagnostics; the full [`RefreshError`] carries the
/// per-cycle detail and is delivered to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshErrorKind {
    /// Non-retryable failure (malformed data, non-retryable HTTP error).
    Permanent,
    /// Live value absent and the historical slot for the current
    /// weekday/hour absent too; classified permanent for the cycle.
    NoData,
    /// Retry budget spent while the condition stayed transient.
    Exhausted,
    /// The cycle was aborted by cancellation.
    Canceled,
}

impl RefreshErrorKind {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RefreshErrorKind::Permanent => "permanent",
            RefreshErrorKind::NoData => "no_data",
            RefreshErrorKind::Exhausted => "exhausted",
            RefreshErrorKind::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for RefreshErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// # Terminal outcome of one failed refresh cycle.
///
/// Exactly one of these is produced per cycle that does not yield a
/// reading. `Permanent` and `NoData` are non-retryable within the cycle;
/// `Exhausted` means the transient retry budget was spent; `Canceled`
/// means the cycle was aborted and must not touch cached state.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum RefreshError {
    /// The fetcher reported a non-retryable condition.
    #[error("permanent refresh failure: {reason}")]
    Permanent {
        /// Description carried over from the fetch boundary.
        reason: String,
    },

    /// Neither a live value nor a historical slot for the current
    /// weekday/hour exists in the snapshot.
    #[error("no data available")]
    NoData,

    /// All retry attempts were consumed while the condition stayed
    /// transient (or the snapshot stayed empty).
    #[error("retries exhausted after {attempts} attempts: {cause}")]
    Exhausted {
        /// Total attempts performed (equals the configured budget).
        attempts: u32,
        /// The transient cause observed on the final attempt.
        cause: FetchError,
    },

    /// The cycle was cancelled (shutdown or venue removal).
    #[error("refresh cycle cancelled")]
    Canceled,
}

impl RefreshError {
    /// Returns the compact classification of this error.
    ///
    /// # Example
    /// ```
    /// use popwatch::{RefreshError, RefreshErrorKind};
    ///
    /// assert_eq!(RefreshError::NoData.kind(), RefreshErrorKind::NoData);
    /// ```
    pub fn kind(&self) -> RefreshErrorKind {
        match self {
            RefreshError::Permanent { .. } => RefreshErrorKind::Permanent,
            RefreshError::NoData => RefreshErrorKind::NoData,
            RefreshError::Exhausted { .. } => RefreshErrorKind::Exhausted,
            RefreshError::Canceled => RefreshErrorKind::Canceled,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RefreshError::Permanent { .. } => "refresh_permanent",
            RefreshError::NoData => "refresh_no_data",
            RefreshError::Exhausted { .. } => "refresh_exhausted",
            RefreshError::Canceled => "refresh_canceled",
        }
    }

    /// True for failures that retrying within a cycle cannot fix
    /// (`Permanent` and its `NoData` sub-case).
    pub fn is_permanent(&self) -> bool {
        matches!(self, RefreshError::Permanent { .. } | RefreshError::NoData)
    }
}

/// # Errors produced by the watcher runtime.
///
/// These represent failures of the orchestration layer itself — venue
/// configuration rejects and shutdown-grace overruns — never data-path
/// failures (those are [`RefreshError`]s).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WatchError {
    /// Shutdown grace period was exceeded; some venue actors were still
    /// mid-cycle and had to be abandoned.
    #[error("shutdown grace {grace:?} exceeded; venues still refreshing: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the venues that did not stop in time.
        stuck: Vec<String>,
    },

    /// A venue with the same derived id (same normalized address) is
    /// already being watched.
    #[error("venue {venue_id} ({name}) is already configured")]
    DuplicateVenue {
        /// The address-derived venue id.
        venue_id: String,
        /// Display name of the rejected venue.
        name: String,
    },

    /// Both the name and the address of a venue query were empty.
    #[error("venue needs a non-empty name or address")]
    EmptyVenue,
}

impl WatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use popwatch::WatchError;
    ///
    /// assert_eq!(WatchError::EmptyVenue.as_label(), "watch_empty_venue");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WatchError::GraceExceeded { .. } => "watch_grace_exceeded",
            WatchError::DuplicateVenue { .. } => "watch_duplicate_venue",
            WatchError::EmptyVenue => "watch_empty_venue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification_matches_retry_table() {
        for status in [429, 500, 502, 503, 504, 599] {
            assert!(
                FetchError::from_status(status, "t").is_transient(),
                "{status} should be transient"
            );
        }
        for status in [400, 401, 403, 404, 410, 418] {
            assert!(
                !FetchError::from_status(status, "t").is_transient(),
                "{status} should be permanent"
            );
        }
    }

    #[test]
    fn refresh_error_kinds_and_labels() {
        let exhausted = RefreshError::Exhausted {
            attempts: 4,
            cause: FetchError::transient("connection refused"),
        };
        assert_eq!(exhausted.kind(), RefreshErrorKind::Exhausted);
        assert_eq!(exhausted.as_label(), "refresh_exhausted");
        assert!(!exhausted.is_permanent());

        assert!(RefreshError::NoData.is_permanent());
        assert_eq!(RefreshError::NoData.kind().as_label(), "no_data");
        assert!(RefreshError::Permanent {
            reason: "boom".into()
        }
        .is_permanent());
    }

    #[test]
    fn exhausted_display_carries_the_last_cause() {
        let err = RefreshError::Exhausted {
            attempts: 3,
            cause: FetchError::from_status(503, "venue lookup"),
        };
        let text = err.to_string();
        assert!(text.contains("3 attempts"));
        assert!(text.contains("503"));
    }
}
