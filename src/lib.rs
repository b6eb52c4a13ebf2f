//! # popwatch
//!
//! **Popwatch** is a small library for polling "popular times" occupancy
//! data for configured venues.
//!
//! It refreshes each venue on a fixed cadence with bounded retries and
//! jittered exponential backoff, reconciles live vs. historical values,
//! and fans normalized readings out to registered consumers. The crate is
//! designed as the polling core of a host automation platform; entity
//! rendering, configuration storage, and the actual scraping transport
//! stay on the host side.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  VenueSpec   │   │  VenueSpec   │   │  VenueSpec   │
//!     │ (venue #1)   │   │ (venue #2)   │   │ (venue #3)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Watcher (orchestrator)                                           │
//! │  - Bus (broadcast lifecycle events)                               │
//! │  - venue handle map (token + join handle per venue)               │
//! │  - graceful shutdown with bounded grace                           │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  VenueActor  │   │  VenueActor  │   │  VenueActor  │
//!     │(periodic loop│   │              │   │              │
//!     │ + RefreshEng)│   │              │   │              │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ refresh cycle:   │                  │
//!      │  fetch → retry/  │                  │
//!      │  backoff → norm  │                  │
//!      ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    FanOut    │   │    FanOut    │   │    FanOut    │
//!     │ cache+status │   │              │   │              │
//!     └┬─────────────┘   └──────────────┘   └──────────────┘
//!      │ per-consumer bounded queues
//!      ├─────────┬─────────┐
//!      ▼         ▼         ▼
//!   worker1   worker2   workerN
//!      ▼         ▼         ▼
//!   c1.on_    c2.on_    cN.on_
//!   reading() reading() reading()
//! ```
//!
//! ### Refresh cycle
//! ```text
//! VenueActor loop {
//!   ├─► RefreshEngine::refresh(token)
//!   │     ├─► publish CycleStarting
//!   │     ├─► attempt = 1..=max_attempts
//!   │     │     ├─ Fetch::fetch(target)       (cancellable race)
//!   │     │     ├─ Ok(non-empty) ─► normalize (live else historical slot)
//!   │     │     │     ├─ Ok  ─► publish CycleCompleted, return reading
//!   │     │     │     └─ Err ─► publish CycleFailed (no data), return
//!   │     │     ├─ Transient / empty ─► publish FetchFailed
//!   │     │     │     ├─ budget left ─► publish BackoffScheduled, sleep
//!   │     │     │     └─ exhausted  ─► publish CycleFailed, return
//!   │     │     └─ Permanent ─► publish FetchFailed + CycleFailed, return
//!   │     └─► cancellation aborts fetch race / sleep, no terminal event
//!   ├─► FanOut::on_cycle_complete(result)   (skipped when cancelled)
//!   │     ├─ Ok  ─► swap cached Arc, reset status, deliver to consumers
//!   │     └─ Err ─► record status, keep last good reading, deliver failure
//!   └─► sleep(interval)                      (cancellable)
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                         | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------------|---------------------------------------------|
//! | **Fetching**      | Pluggable data providers; blocking calls bridged off the executor.  | [`Fetch`], [`FetchFn`], [`FetchRef`]        |
//! | **Refreshing**    | Retry/backoff state machine, live vs. historical normalization.     | [`RefreshEngine`], [`RetryPolicy`]          |
//! | **Fan-out**       | Cached readings, per-consumer queues, panic/overflow isolation.     | [`FanOut`], [`Consume`], [`CurrentView`]    |
//! | **Watching**      | Per-venue actors, membership, signals, graceful shutdown.           | [`Watcher`], [`VenueSpec`]                  |
//! | **Errors**        | Typed errors per boundary with stable labels.                       | [`FetchError`], [`RefreshError`], [`WatchError`] |
//! | **Configuration** | Defaults bundle + clamped raw host options.                         | [`WatchConfig`], [`RefreshOptions`]         |
//! | **Diagnostics**   | Serializable per-venue report with address redaction.               | [`VenueReport`], [`redact_address`]         |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use popwatch::{
//!     FetchFn, VenueQuery, VenueSnapshot, VenueSpec, WatchConfig, Watcher,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = WatchConfig::default();
//!     let watcher = Watcher::new(cfg.clone());
//!
//!     // A real provider would call the popularity data source here.
//!     let fetcher = FetchFn::arc(|_target| {
//!         Ok(VenueSnapshot {
//!             current_popularity: Some(42.0),
//!             ..VenueSnapshot::default()
//!         })
//!     });
//!
//!     let query = VenueQuery::new("Cafe Luna", "12 Pier Rd, Harbortown")?;
//!     let fanout = watcher
//!         .add_venue(VenueSpec::with_defaults(query, fetcher, &cfg))
//!         .await?;
//!
//!     // The host registers consumers on `fanout` and can poll
//!     // `fanout.current()` at any time.
//!     # drop(fanout);
//!     # watcher.shutdown().await?;
//!     # return Ok(());
//!     // Blocks until SIGINT/SIGTERM, then drains within the grace period.
//!     watcher.run_until_shutdown().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod diag;
mod engine;
mod error;
mod events;
mod fetch;
mod policies;
mod reading;
mod subscribers;
mod watch;

// ---- Public re-exports ----

pub use config::{RefreshOptions, WatchConfig};
pub use diag::{ReadingSummary, VenueReport, redact_address};
pub use engine::{RefreshEngine, VenueQuery};
pub use error::{FetchError, RefreshError, RefreshErrorKind, WatchError};
pub use events::{Bus, Event, EventKind};
pub use fetch::{DayCurve, Fetch, FetchFn, FetchRef, VenueSnapshot};
pub use policies::{BackoffPolicy, JitterPolicy, RetryPolicy};
pub use reading::{PopularityReading, RefreshStatus, day_name};
pub use subscribers::{Consume, ConsumeRef, CurrentView, FanOut, SubscriptionHandle};
pub use watch::{VenueSpec, Watcher, venue_id};

// Optional: expose a simple built-in logging consumer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
