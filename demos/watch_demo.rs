//! # Example: watch_demo
//!
//! Watches two synthetic venues with a fake blocking provider and prints
//! every delivered reading via [`LogWriter`].
//!
//! The first venue answers immediately; the second fails twice per cycle
//! before succeeding, showing the retry/backoff schedule in the event
//! stream.
//!
//! ## Flow
//! ```text
//! Watcher::add_venue("Cafe Luna")   ─► actor #1 ─► FanOut #1 ─► LogWriter
//! Watcher::add_venue("Pier Diner")  ─► actor #2 ─► FanOut #2 ─► LogWriter
//! Watcher::run_until_shutdown()     ─► Ctrl-C → cancel → bounded grace
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example watch_demo --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use popwatch::{
    DayCurve, FetchError, FetchFn, FetchRef, LogWriter, VenueQuery, VenueSnapshot, VenueSpec,
    WatchConfig, Watcher,
};

static FLAKY_CALLS: AtomicU64 = AtomicU64::new(0);

fn curve() -> Option<DayCurve> {
    // A plausible daily shape: quiet mornings, lunch and dinner peaks.
    Some(DayCurve {
        data: vec![
            0, 0, 0, 0, 0, 0, 5, 10, 20, 30, 40, 55, 70, 65, 50, 45, 50, 60, 75, 70, 50, 30, 15, 5,
        ],
    })
}

fn snapshot(name: &str, live: Option<f64>) -> VenueSnapshot {
    VenueSnapshot {
        name: Some(name.to_string()),
        address: None,
        current_popularity: live,
        populartimes: (0..7).map(|_| curve()).collect(),
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Configure: short interval and tight backoff so the demo is lively.
    let mut cfg = WatchConfig::default();
    cfg.interval = Duration::from_secs(15);
    cfg.backoff.first = Duration::from_millis(500);
    cfg.backoff.max = Duration::from_secs(4);
    cfg.grace = Duration::from_secs(5);

    let watcher = Arc::new(Watcher::new(cfg.clone()));

    // 2. A well-behaved provider: always answers with a live value.
    let steady: FetchRef = FetchFn::arc(|target| {
        println!("[fetch] steady target={target:?}");
        Ok(snapshot("Cafe Luna", Some(63.0)))
    });

    // 3. A flaky provider: two transient failures before every success.
    let flaky: FetchRef = FetchFn::arc(|target| {
        let call = FLAKY_CALLS.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[fetch] flaky target={target:?} call #{call}");
        if call % 3 != 0 {
            return Err(FetchError::from_status(503, "synthetic outage"));
        }
        Ok(snapshot("Pier Diner", None))
    });

    // 4. Add both venues; register the stdout consumer on each fan-out.
    let luna = watcher
        .add_venue(VenueSpec::with_defaults(
            VenueQuery::new("Cafe Luna", "12 Pier Rd, Harbortown")?,
            steady,
            &cfg,
        ))
        .await?;
    luna.register(Arc::new(LogWriter));

    let diner = watcher
        .add_venue(
            VenueSpec::with_defaults(
                VenueQuery::new("Pier Diner", "48 Dock St, Harbortown")?,
                flaky,
                &cfg,
            )
            .with_max_attempts(4),
        )
        .await?;
    diner.register(Arc::new(LogWriter));

    // 5. Periodically dump the diagnostics report.
    {
        let watcher = Arc::clone(&watcher);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(20)).await;
                for report in watcher.diagnostics().await {
                    println!("[diag] {}", serde_json::to_string(&report).unwrap());
                }
            }
        });
    }

    // 6. Block until Ctrl-C, then drain within the grace period.
    println!("[main] watching, press Ctrl-C to stop");
    match watcher.run_until_shutdown().await {
        Ok(()) => println!("[main] stopped gracefully"),
        Err(e) => println!("[main] stopped with error: {e}"),
    }

    Ok(())
}
