//! # VenueActor: one venue's periodic refresh loop.
//!
//! Runs refresh cycles back to back with a cancellable interval sleep in
//! between. Cycles for one venue never overlap: a cycle runs to its
//! terminal outcome before the next sleep is scheduled.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► engine.refresh(token)          (cycle to completion)
//!   │     ├─ Ok / Err(terminal) ──► fanout.on_cycle_complete(result)
//!   │     └─ Err(Canceled) ───────► exit (cached state untouched)
//!   └─► sleep(interval)                (cancellable)
//! }
//! ```
//!
//! ## Rules
//! - The first cycle starts immediately; the interval paces cycle starts
//!   after each completion.
//! - Cancellation is honored at the cycle's own safe points (fetch race,
//!   backoff sleep) and during the interval sleep.
//! - A cancelled cycle skips the fan-out entirely.

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::engine::RefreshEngine;
use crate::error::RefreshError;
use crate::subscribers::FanOut;

/// Periodic driver for one venue.
pub(crate) struct VenueActor {
    engine: RefreshEngine,
    fanout: Arc<FanOut>,
    interval: Duration,
}

impl VenueActor {
    pub(crate) fn new(engine: RefreshEngine, fanout: Arc<FanOut>, interval: Duration) -> Self {
        Self {
            engine,
            fanout,
            interval,
        }
    }

    /// Runs cycles until cancellation.
    pub(crate) async fn run(self, token: CancellationToken) {
        loop {
            if token.is_cancelled() {
                break;
            }

            match self.engine.refresh(&token).await {
                Err(RefreshError::Canceled) => break,
                result => self.fanout.on_cycle_complete(result),
            }

            let sleep = time::sleep(self.interval);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => break,
            }
        }
        self.fanout.close().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::engine::VenueQuery;
    use crate::error::FetchError;
    use crate::events::Bus;
    use crate::fetch::{Fetch, VenueSnapshot};
    use crate::policies::{BackoffPolicy, JitterPolicy, RetryPolicy};

    /// Pure async fake so paused-clock tests never touch the blocking pool.
    struct Counting(Arc<AtomicU32>);

    #[async_trait]
    impl Fetch for Counting {
        async fn fetch(&self, _target: &str) -> Result<VenueSnapshot, FetchError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(VenueSnapshot {
                current_popularity: Some(10.0),
                ..VenueSnapshot::default()
            })
        }
    }

    fn engine(fetcher: crate::fetch::FetchRef, bus: Bus) -> RefreshEngine {
        RefreshEngine::new(
            "venue_test",
            &VenueQuery::new("Cafe Luna", "12 Pier Rd").unwrap(),
            fetcher,
            RetryPolicy::new(
                1,
                BackoffPolicy {
                    first: Duration::from_millis(1),
                    max: Duration::from_millis(10),
                    factor: 2.0,
                    jitter: JitterPolicy::None,
                },
            ),
            bus,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_are_paced_by_the_interval() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = Arc::new(Counting(Arc::clone(&calls)));

        let bus = Bus::new(16);
        let fanout = Arc::new(FanOut::new(bus.clone()));
        let actor = VenueActor::new(
            engine(fetcher, bus),
            Arc::clone(&fanout),
            Duration::from_secs(600),
        );

        let token = CancellationToken::new();
        let cancel = token.clone();
        let handle = tokio::spawn(actor.run(token));

        // First cycle runs immediately.
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(fanout.available());

        // Two more intervals elapse on the paused clock.
        time::sleep(Duration::from_secs(1201)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn cancellation_during_the_interval_stops_the_actor() {
        let fetcher = Arc::new(Counting(Arc::new(AtomicU32::new(0))));

        let bus = Bus::new(16);
        let fanout = Arc::new(FanOut::new(bus.clone()));
        let actor = VenueActor::new(
            engine(fetcher, bus),
            Arc::clone(&fanout),
            Duration::from_secs(600),
        );

        let token = CancellationToken::new();
        let cancel = token.clone();
        let handle = tokio::spawn(actor.run(token));

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
        handle.await.unwrap();

        // The completed first cycle is cached; the abort changed nothing.
        let view = fanout.current();
        assert_eq!(view.reading.unwrap().value, 10);
        assert_eq!(view.status.consecutive_failures, 0);
    }
}
