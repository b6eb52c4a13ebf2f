//! # Runtime events emitted by the watcher and refresh engines.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Cycle events**: refresh execution flow (starting, fetch failed,
//!   backoff scheduled, completed, failed)
//! - **Consumer events**: fan-out delivery problems (overflow, panic)
//! - **Membership events**: venues added to / removed from the watcher
//! - **Shutdown events**: signal observed, grace outcome
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! venue labels, attempt numbers, backoff delays, and normalized values.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use popwatch::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_venue("cafe-luna")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_secs(2))
//!     .with_reason("transient fetch failure: timeout");
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.venue.as_deref(), Some("cafe-luna"));
//! assert_eq!(ev.delay_ms, Some(2000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Cycle events ===
    /// A refresh cycle is starting for a venue.
    ///
    /// Sets: `venue`, `at`, `seq`.
    CycleStarting,

    /// One fetch attempt failed (transient, permanent, or empty snapshot).
    ///
    /// Sets: `venue`, `attempt`, `reason`, `at`, `seq`.
    FetchFailed,

    /// A retry was scheduled after a transient failure.
    ///
    /// Sets: `venue`, `attempt` (the failed attempt), `delay_ms` (jittered
    /// sleep), `reason`, `at`, `seq`.
    BackoffScheduled,

    /// The cycle produced a normalized reading.
    ///
    /// Sets: `venue`, `value`, `live`, `at`, `seq`.
    CycleCompleted,

    /// The cycle ended without a reading.
    ///
    /// Sets: `venue`, `attempt` (attempts performed), `reason`, `at`, `seq`.
    CycleFailed,

    // === Consumer events ===
    /// A consumer's queue was full or closed; the update was dropped for
    /// that consumer only.
    ///
    /// Sets: `venue` (consumer name), `reason` ("full"/"closed"), `at`, `seq`.
    ConsumerOverflow,

    /// A consumer panicked while handling an update.
    ///
    /// Sets: `venue` (consumer name), `reason` (panic info), `at`, `seq`.
    ConsumerPanicked,

    // === Membership events ===
    /// A venue was added to the watcher.
    ///
    /// Sets: `venue`, `at`, `seq`.
    VenueAdded,

    /// A venue was removed from the watcher (actor joined).
    ///
    /// Sets: `venue`, `at`, `seq`.
    VenueRemoved,

    // === Shutdown events ===
    /// Shutdown requested (OS signal observed or explicit shutdown call).
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// All venue actors stopped within the configured grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// Grace period exceeded; some venue actors did not stop in time.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Venue label — or consumer name for `Consumer*` events.
    pub venue: Option<Arc<str>>,
    /// Attempt count within the cycle (starting from 1).
    pub attempt: Option<u32>,
    /// Backoff delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Normalized popularity value of a completed cycle.
    pub value: Option<u8>,
    /// Whether the completed cycle's value was live (vs. historical).
    pub live: Option<bool>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            venue: None,
            attempt: None,
            delay_ms: None,
            reason: None,
            value: None,
            live: None,
        }
    }

    /// Attaches a venue label.
    #[inline]
    pub fn with_venue(mut self, venue: impl Into<Arc<str>>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the normalized popularity value.
    #[inline]
    pub fn with_value(mut self, value: u8) -> Self {
        self.value = Some(value);
        self
    }

    /// Attaches the live/historical flag.
    #[inline]
    pub fn with_live(mut self, live: bool) -> Self {
        self.live = Some(live);
        self
    }

    /// Creates a consumer overflow event.
    #[inline]
    pub fn consumer_overflow(consumer: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::ConsumerOverflow)
            .with_venue(consumer)
            .with_reason(reason)
    }

    /// Creates a consumer panic event.
    #[inline]
    pub fn consumer_panicked(consumer: &'static str, info: String) -> Self {
        Event::new(EventKind::ConsumerPanicked)
            .with_venue(consumer)
            .with_reason(info)
    }
}
