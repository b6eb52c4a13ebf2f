//! # RefreshEngine: one venue's retry/backoff state machine.
//!
//! Runs one refresh cycle at a time: fetch, retry transients with jittered
//! exponential backoff, normalize the first usable snapshot.
//!
//! ## Cycle flow
//! ```text
//! refresh(token)
//!   ├─► publish CycleStarting
//!   └─► attempt = 1..=max_attempts
//!        ├─► fetch (raced against token)
//!        │     ├─ Ok(non-empty) ──► normalize ──► CycleCompleted / CycleFailed(no data)
//!        │     ├─ Ok(empty) ──────► treated as transient
//!        │     ├─ Err(Transient) ─► publish FetchFailed
//!        │     └─ Err(Permanent) ─► publish FetchFailed + CycleFailed, stop
//!        ├─► attempt < max: publish BackoffScheduled, cancellable sleep
//!        └─► attempt = max: publish CycleFailed, return Exhausted
//! ```
//!
//! ## Rules
//! - Exactly one terminal outcome per call: a reading or a [`RefreshError`].
//! - Exactly one of `CycleCompleted`/`CycleFailed` per non-cancelled cycle.
//! - `Permanent` is never retried; `Transient` and empty snapshots are
//!   retried until the attempt budget is spent, then become `Exhausted`.
//! - Cancellation aborts the pending sleep or the fetch race promptly and
//!   publishes no terminal event (the cycle did not complete).
//! - The engine never touches cached state; it returns a value and the
//!   fan-out does the caching.

use std::sync::Arc;

use chrono::Utc;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::engine::normalize::{DaySlot, normalize};
use crate::engine::query::VenueQuery;
use crate::error::{FetchError, RefreshError};
use crate::events::{Bus, Event, EventKind};
use crate::fetch::FetchRef;
use crate::policies::RetryPolicy;
use crate::reading::PopularityReading;

/// Retry/backoff state machine for one venue.
///
/// Holds the derived query string, the provider, and the retry policy; all
/// transient state of a cycle lives on [`RefreshEngine::refresh`]'s stack
/// and is discarded when the call returns.
pub struct RefreshEngine {
    venue: Arc<str>,
    target: String,
    fetcher: FetchRef,
    retry: RetryPolicy,
    bus: Bus,
}

impl RefreshEngine {
    /// Creates an engine for one venue.
    ///
    /// `venue` is the label attached to published events (typically the
    /// address-derived venue id); the query string is derived from `query`
    /// once, here.
    pub fn new(
        venue: impl Into<Arc<str>>,
        query: &VenueQuery,
        fetcher: FetchRef,
        retry: RetryPolicy,
        bus: Bus,
    ) -> Self {
        Self {
            venue: venue.into(),
            target: query.target(),
            fetcher,
            retry,
            bus,
        }
    }

    /// Returns the derived query string sent to the provider.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Runs one refresh cycle to a single terminal outcome.
    ///
    /// Retries transient failures and empty snapshots with jittered
    /// exponential backoff until the attempt budget is spent; fails
    /// immediately on permanent errors. Both the fetch and the backoff
    /// sleeps are raced against `token`; cancellation returns
    /// [`RefreshError::Canceled`] without publishing a terminal event.
    pub async fn refresh(
        &self,
        token: &CancellationToken,
    ) -> Result<PopularityReading, RefreshError> {
        self.bus
            .publish(Event::new(EventKind::CycleStarting).with_venue(Arc::clone(&self.venue)));

        let max_attempts = self.retry.max_attempts;
        let mut attempt = 0;
        loop {
            attempt += 1;

            let fetched = select! {
                res = self.fetcher.fetch(&self.target) => res,
                _ = token.cancelled() => return Err(RefreshError::Canceled),
            };

            let cause = match fetched {
                Ok(snapshot) if snapshot.is_empty() => FetchError::transient("empty snapshot"),
                Ok(snapshot) => return self.complete(&snapshot),
                Err(err) if err.is_transient() => err,
                Err(err) => {
                    let reason = err.reason().to_string();
                    self.publish_attempt_failed(attempt, &err);
                    self.publish_cycle_failed(attempt, err.as_label());
                    return Err(RefreshError::Permanent { reason });
                }
            };

            self.publish_attempt_failed(attempt, &cause);

            if attempt >= max_attempts {
                self.publish_cycle_failed(attempt, "refresh_exhausted");
                return Err(RefreshError::Exhausted {
                    attempts: attempt,
                    cause,
                });
            }

            let delay = self.retry.delay_after(attempt);
            self.bus.publish(
                Event::new(EventKind::BackoffScheduled)
                    .with_venue(Arc::clone(&self.venue))
                    .with_attempt(attempt)
                    .with_delay(delay)
                    .with_reason(cause.to_string()),
            );

            select! {
                _ = time::sleep(delay) => {}
                _ = token.cancelled() => return Err(RefreshError::Canceled),
            }
        }
    }

    /// Normalizes a non-empty snapshot and publishes the terminal event.
    fn complete(
        &self,
        snapshot: &crate::fetch::VenueSnapshot,
    ) -> Result<PopularityReading, RefreshError> {
        match normalize(snapshot, DaySlot::now(), Utc::now()) {
            Ok(reading) => {
                self.bus.publish(
                    Event::new(EventKind::CycleCompleted)
                        .with_venue(Arc::clone(&self.venue))
                        .with_value(reading.value)
                        .with_live(reading.is_live),
                );
                Ok(reading)
            }
            Err(err) => {
                self.bus.publish(
                    Event::new(EventKind::CycleFailed)
                        .with_venue(Arc::clone(&self.venue))
                        .with_reason(err.as_label()),
                );
                Err(err)
            }
        }
    }

    fn publish_attempt_failed(&self, attempt: u32, cause: &FetchError) {
        self.bus.publish(
            Event::new(EventKind::FetchFailed)
                .with_venue(Arc::clone(&self.venue))
                .with_attempt(attempt)
                .with_reason(cause.to_string()),
        );
    }

    fn publish_cycle_failed(&self, attempts: u32, label: &'static str) {
        self.bus.publish(
            Event::new(EventKind::CycleFailed)
                .with_venue(Arc::clone(&self.venue))
                .with_attempt(attempts)
                .with_reason(label),
        );
    }
}
