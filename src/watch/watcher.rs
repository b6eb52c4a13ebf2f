//! # Watcher: orchestrates venue actors and graceful shutdown.
//!
//! The [`Watcher`] owns the event bus and the set of running venue actors.
//! It adds and removes venues on behalf of the host's config layer, waits
//! for OS termination signals, and enforces a bounded shutdown grace
//! period.
//!
//! ## Key responsibilities
//! - spawn one [`VenueActor`](super::actor::VenueActor) per configured
//!   venue, each with its own child cancellation token and fan-out
//! - reject duplicate venues (same normalized address → same id)
//! - handle OS termination signals (SIGINT/SIGTERM/SIGQUIT, Ctrl-C)
//! - perform graceful shutdown within [`WatchConfig::grace`]
//! - expose per-venue [`VenueReport`] diagnostics
//!
//! ## High-level architecture
//! ```text
//! VenueSpec ──► Watcher::add_venue
//!                 ├─► FanOut (per venue, returned to the host)
//!                 ├─► RefreshEngine (per venue)
//!                 └─► VenueActor::run(child_token)    (spawned)
//!
//! Shutdown path:
//!   wait_for_shutdown_signal()
//!       └─► Bus.publish(ShutdownRequested)
//!       └─► root_token.cancel()        → propagates to child tokens
//!       └─► join all actors within grace:
//!              ├─ Ok              → Bus.publish(AllStoppedWithin)
//!              └─ grace exceeded  → Bus.publish(GraceExceeded)
//!                                   Err(WatchError::GraceExceeded{stuck})
//! ```
//!
//! Venues are independent: no cross-venue state is shared beyond the bus
//! and the (stateless) fetch transport the host chooses to reuse.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::WatchConfig;
use crate::diag::VenueReport;
use crate::engine::RefreshEngine;
use crate::error::WatchError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::FanOut;
use crate::watch::actor::VenueActor;
use crate::watch::shutdown::wait_for_shutdown_signal;
use crate::watch::spec::VenueSpec;

/// Handle to a running venue actor.
struct VenueHandle {
    spec: VenueSpec,
    fanout: Arc<FanOut>,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

/// Coordinates venue actors, per-venue fan-outs, and graceful shutdown.
///
/// One watcher per process (or per host integration instance). Venue
/// membership changes come from the host's config layer through
/// [`Watcher::add_venue`]/[`Watcher::remove_venue`]; a watcher that has
/// been shut down stays cancelled and will not run newly added venues.
pub struct Watcher {
    cfg: WatchConfig,
    bus: Bus,
    root: CancellationToken,
    venues: RwLock<HashMap<String, VenueHandle>>,
}

impl Watcher {
    /// Creates a watcher with the given configuration.
    pub fn new(cfg: WatchConfig) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        Self {
            cfg,
            bus,
            root: CancellationToken::new(),
            venues: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the watcher's configuration.
    pub fn config(&self) -> &WatchConfig {
        &self.cfg
    }

    /// Creates a new subscription to the lifecycle event stream.
    pub fn events(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Starts watching a venue and returns its fan-out.
    ///
    /// The first refresh cycle starts immediately; the host registers its
    /// consumers on the returned [`FanOut`]. A venue whose normalized
    /// address is already being watched is rejected with
    /// [`WatchError::DuplicateVenue`].
    pub async fn add_venue(&self, spec: VenueSpec) -> Result<Arc<FanOut>, WatchError> {
        let venue_id = spec.venue_id();
        let mut venues = self.venues.write().await;
        if venues.contains_key(&venue_id) {
            return Err(WatchError::DuplicateVenue {
                venue_id,
                name: spec.query().label().to_string(),
            });
        }

        let fanout = Arc::new(FanOut::new(self.bus.clone()));
        let engine = RefreshEngine::new(
            venue_id.clone(),
            spec.query(),
            Arc::clone(spec.fetcher()),
            spec.retry().clone(),
            self.bus.clone(),
        );
        let actor = VenueActor::new(engine, Arc::clone(&fanout), spec.interval());

        let cancel = self.root.child_token();
        let join = tokio::spawn(actor.run(cancel.clone()));

        venues.insert(
            venue_id.clone(),
            VenueHandle {
                spec,
                fanout: Arc::clone(&fanout),
                cancel,
                join,
            },
        );
        drop(venues);

        self.bus
            .publish(Event::new(EventKind::VenueAdded).with_venue(venue_id));
        Ok(fanout)
    }

    /// Stops watching a venue: cancels its actor and joins it.
    ///
    /// Any in-flight cycle aborts at its next safe point without touching
    /// cached state. Returns `false` when the id is not being watched.
    pub async fn remove_venue(&self, venue_id: &str) -> bool {
        let handle = {
            let mut venues = self.venues.write().await;
            venues.remove(venue_id)
        };
        let Some(handle) = handle else {
            return false;
        };

        handle.cancel.cancel();
        let _ = handle.join.await;
        self.bus
            .publish(Event::new(EventKind::VenueRemoved).with_venue(venue_id.to_string()));
        true
    }

    /// Returns the fan-out of a watched venue.
    pub async fn venue(&self, venue_id: &str) -> Option<Arc<FanOut>> {
        self.venues
            .read()
            .await
            .get(venue_id)
            .map(|h| Arc::clone(&h.fanout))
    }

    /// Returns the sorted ids of all watched venues.
    pub async fn venue_ids(&self) -> Vec<String> {
        let venues = self.venues.read().await;
        let mut ids: Vec<String> = venues.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Builds a diagnostics report per watched venue, sorted by id.
    pub async fn diagnostics(&self) -> Vec<VenueReport> {
        let venues = self.venues.read().await;
        let mut reports: Vec<VenueReport> = venues
            .values()
            .map(|h| VenueReport::new(&h.spec, &h.fanout.current()))
            .collect();
        reports.sort_by(|a, b| a.venue_id.cmp(&b.venue_id));
        reports
    }

    /// Runs until the process receives a termination signal, then shuts
    /// down gracefully.
    pub async fn run_until_shutdown(&self) -> Result<(), WatchError> {
        let _ = wait_for_shutdown_signal().await;
        self.shutdown().await
    }

    /// Cancels every venue actor and waits up to [`WatchConfig::grace`]
    /// for them to drain.
    ///
    /// Publishes `ShutdownRequested`, then `AllStoppedWithin` on success or
    /// `GraceExceeded` on timeout; stuck actors are aborted and named in
    /// the returned [`WatchError::GraceExceeded`].
    pub async fn shutdown(&self) -> Result<(), WatchError> {
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.root.cancel();

        let handles: Vec<(String, VenueHandle)> = {
            let mut venues = self.venues.write().await;
            venues.drain().collect()
        };
        for (_, handle) in &handles {
            handle.cancel.cancel();
        }

        let grace = self.cfg.grace;
        let deadline = Instant::now() + grace;
        let mut stuck = Vec::new();
        for (venue_id, mut handle) in handles {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, &mut handle.join).await {
                Ok(_) => {}
                Err(_elapsed) => {
                    handle.join.abort();
                    stuck.push(venue_id);
                }
            }
        }

        if stuck.is_empty() {
            self.bus.publish(Event::new(EventKind::AllStoppedWithin));
            Ok(())
        } else {
            self.bus.publish(Event::new(EventKind::GraceExceeded));
            Err(WatchError::GraceExceeded { grace, stuck })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use super::*;
    use crate::engine::VenueQuery;
    use crate::fetch::{FetchFn, VenueSnapshot};
    use crate::reading::PopularityReading;
    use crate::subscribers::Consume;

    fn live_spec(cfg: &WatchConfig, name: &str, address: &str) -> VenueSpec {
        VenueSpec::with_defaults(
            VenueQuery::new(name, address).unwrap(),
            FetchFn::arc(|_| {
                Ok(VenueSnapshot {
                    name: Some("Cafe Luna".into()),
                    current_popularity: Some(63.0),
                    ..VenueSnapshot::default()
                })
            }),
            cfg,
        )
    }

    async fn wait_available(fanout: &FanOut) {
        timeout(Duration::from_secs(2), async {
            while !fanout.available() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("first cycle never completed");
    }

    #[tokio::test]
    async fn duplicate_addresses_are_rejected() {
        let cfg = WatchConfig::default();
        let watcher = Watcher::new(cfg.clone());

        watcher
            .add_venue(live_spec(&cfg, "Cafe Luna", "12 Pier Rd"))
            .await
            .unwrap();
        let err = watcher
            .add_venue(live_spec(&cfg, "Other Name", " 12 PIER RD "))
            .await
            .unwrap_err();

        match err {
            WatchError::DuplicateVenue { name, .. } => assert_eq!(name, "Other Name"),
            other => panic!("expected DuplicateVenue, got {other:?}"),
        }
        assert_eq!(watcher.venue_ids().await.len(), 1);
        watcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn first_cycle_populates_the_fanout() {
        let cfg = WatchConfig::default();
        let watcher = Watcher::new(cfg.clone());

        let fanout = watcher
            .add_venue(live_spec(&cfg, "Cafe Luna", "12 Pier Rd"))
            .await
            .unwrap();
        wait_available(&fanout).await;

        let view = fanout.current();
        assert_eq!(view.reading.unwrap().value, 63);
        assert!(view.status.last_success_time.is_some());

        let reports = watcher.diagnostics().await;
        assert_eq!(reports.len(), 1);
        assert!(reports[0].available);
        assert_eq!(reports[0].reading.as_ref().unwrap().value, 63);
        assert_eq!(reports[0].address_redacted, "***");

        watcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn remove_venue_joins_the_actor() {
        let cfg = WatchConfig::default();
        let watcher = Watcher::new(cfg.clone());
        let mut events = watcher.events();

        let fanout = watcher
            .add_venue(live_spec(&cfg, "Cafe Luna", "12 Pier Rd"))
            .await
            .unwrap();
        wait_available(&fanout).await;
        let id = watcher.venue_ids().await.remove(0);

        assert!(watcher.remove_venue(&id).await);
        assert!(!watcher.remove_venue(&id).await, "second remove is a no-op");
        assert!(watcher.venue(&id).await.is_none());

        let removed = timeout(Duration::from_secs(1), async {
            loop {
                let ev = events.recv().await.unwrap();
                if ev.kind == EventKind::VenueRemoved {
                    break ev;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(removed.venue.as_deref(), Some(id.as_str()));
    }

    #[tokio::test]
    async fn shutdown_within_grace_reports_all_stopped() {
        let cfg = WatchConfig::default();
        let watcher = Watcher::new(cfg.clone());
        let mut events = watcher.events();

        let a = watcher
            .add_venue(live_spec(&cfg, "Cafe Luna", "12 Pier Rd"))
            .await
            .unwrap();
        let b = watcher
            .add_venue(live_spec(&cfg, "Harbor Gym", "3 Dock St"))
            .await
            .unwrap();
        wait_available(&a).await;
        wait_available(&b).await;

        watcher.shutdown().await.unwrap();
        assert!(watcher.venue_ids().await.is_empty());

        let mut saw_requested = false;
        let mut saw_all_stopped = false;
        while let Ok(ev) = events.try_recv() {
            match ev.kind {
                EventKind::ShutdownRequested => saw_requested = true,
                EventKind::AllStoppedWithin => saw_all_stopped = true,
                _ => {}
            }
        }
        assert!(saw_requested);
        assert!(saw_all_stopped);
    }

    /// Releases one fetch per permit, so tests control when the first
    /// cycle may complete.
    struct Gated(Arc<tokio::sync::Semaphore>);

    #[async_trait]
    impl crate::fetch::Fetch for Gated {
        async fn fetch(&self, _target: &str) -> Result<VenueSnapshot, crate::error::FetchError> {
            self.0.acquire().await.expect("gate closed").forget();
            Ok(VenueSnapshot {
                name: Some("Cafe Luna".into()),
                current_popularity: Some(63.0),
                ..VenueSnapshot::default()
            })
        }
    }

    fn gated_spec(cfg: &WatchConfig) -> (VenueSpec, Arc<tokio::sync::Semaphore>) {
        let gate = Arc::new(tokio::sync::Semaphore::new(0));
        let spec = VenueSpec::with_defaults(
            VenueQuery::new("Cafe Luna", "12 Pier Rd").unwrap(),
            Arc::new(Gated(Arc::clone(&gate))),
            cfg,
        );
        (spec, gate)
    }

    /// Holds the delivered update forever, so the fan-out close (and with
    /// it the actor join) cannot finish.
    struct Wedged;

    #[async_trait]
    impl Consume for Wedged {
        async fn on_reading(&self, _reading: &PopularityReading) {
            std::future::pending().await
        }

        fn name(&self) -> &'static str {
            "wedged"
        }
    }

    #[tokio::test]
    async fn wedged_consumer_exceeds_the_grace_period() {
        let cfg = WatchConfig {
            grace: Duration::from_millis(50),
            ..WatchConfig::default()
        };
        let watcher = Watcher::new(cfg.clone());

        let (spec, gate) = gated_spec(&cfg);
        let fanout = watcher.add_venue(spec).await.unwrap();
        // Register before releasing the first cycle, so the wedged worker
        // is guaranteed to be holding an update at shutdown.
        fanout.register(Arc::new(Wedged));
        gate.add_permits(1);
        wait_available(&fanout).await;

        let err = watcher.shutdown().await.unwrap_err();
        match err {
            WatchError::GraceExceeded { stuck, .. } => {
                assert_eq!(stuck.len(), 1);
                assert!(stuck[0].starts_with("venue_"));
            }
            other => panic!("expected GraceExceeded, got {other:?}"),
        }
    }

    /// Consumer forwarding readings to the test.
    struct Forward(mpsc::UnboundedSender<u8>);

    #[async_trait]
    impl Consume for Forward {
        async fn on_reading(&self, reading: &PopularityReading) {
            let _ = self.0.send(reading.value);
        }

        fn name(&self) -> &'static str {
            "forward"
        }
    }

    #[tokio::test]
    async fn consumers_registered_by_the_host_receive_readings() {
        let cfg = WatchConfig::default();
        let watcher = Watcher::new(cfg.clone());

        let (spec, gate) = gated_spec(&cfg);
        let fanout = watcher.add_venue(spec).await.unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        fanout.register(Arc::new(Forward(tx)));
        gate.add_permits(1);

        let value = timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("no delivery")
            .unwrap();
        assert_eq!(value, 63);

        watcher.shutdown().await.unwrap();
    }
}
