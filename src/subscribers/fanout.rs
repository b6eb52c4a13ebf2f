//! # FanOut: cached reading plus non-blocking delivery to consumers.
//!
//! One [`FanOut`] exists per venue. It owns the venue's long-lived state
//! (the latest [`PopularityReading`] and the [`RefreshStatus`] trail) and
//! distributes each cycle outcome to registered consumers **without
//! awaiting** their processing.
//!
//! ## What it guarantees
//! - [`FanOut::on_cycle_complete`] returns without blocking on consumers.
//! - Readers of [`FanOut::current`] never see a torn reading: the cached
//!   value is an `Arc` swapped under a short write lock.
//! - Per-consumer FIFO (queue order).
//! - Panics inside consumers are caught and published (isolation).
//! - A failed cycle keeps the last good reading; only the status changes.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different consumers.
//! - No retries on per-consumer queue overflow (the update is dropped for
//!   that consumer).
//!
//! ## Diagram
//! ```text
//!    on_cycle_complete(result)
//!        │ swap cached Arc + update status
//!        │                        (Arc-clone per consumer)
//!        ├────────────────► [queue C1] ─► worker C1 ─► on_reading()
//!        ├────────────────► [queue C2] ─► worker C2 ─► on_reading()
//!        └────────────────► [queue CN] ─► worker CN ─► on_refresh_failed()
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::RefreshError;
use crate::events::{Bus, Event};
use crate::reading::{PopularityReading, RefreshStatus};
use crate::subscribers::consumer::ConsumeRef;

/// Handle identifying one registration, returned by [`FanOut::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

/// Read-only snapshot of one venue's cached state.
#[derive(Debug, Clone)]
pub struct CurrentView {
    /// Latest successful reading, if any cycle has ever succeeded.
    pub reading: Option<Arc<PopularityReading>>,
    /// Outcome trail across cycles.
    pub status: RefreshStatus,
}

/// One cycle outcome as delivered to consumer workers.
#[derive(Clone)]
enum CycleUpdate {
    Reading(Arc<PopularityReading>),
    Failed(Arc<RefreshError>),
}

/// Per-consumer channel with metadata.
#[derive(Debug)]
struct ConsumerChannel {
    name: &'static str,
    sender: mpsc::Sender<CycleUpdate>,
    worker: JoinHandle<()>,
}

/// Cached state guarded by the write lock.
#[derive(Debug, Default)]
struct Shared {
    reading: Option<Arc<PopularityReading>>,
    status: RefreshStatus,
}

/// Per-venue cache and consumer fan-out.
#[derive(Debug)]
pub struct FanOut {
    state: RwLock<Shared>,
    channels: RwLock<HashMap<u64, ConsumerChannel>>,
    next_id: AtomicU64,
    bus: Bus,
}

impl FanOut {
    /// Creates an empty fan-out publishing delivery problems to `bus`.
    pub fn new(bus: Bus) -> Self {
        Self {
            state: RwLock::new(Shared::default()),
            channels: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
            bus,
        }
    }

    /// Registers a consumer and spawns its worker task.
    ///
    /// The consumer gets a bounded MPSC queue of size
    /// `max(queue_capacity, 1)` and starts receiving outcomes of cycles
    /// that complete after this call. Must be called from within a tokio
    /// runtime.
    pub fn register(&self, consumer: ConsumeRef) -> SubscriptionHandle {
        let cap = consumer.queue_capacity().max(1);
        let name = consumer.name();
        let (tx, mut rx) = mpsc::channel::<CycleUpdate>(cap);
        let bus = self.bus.clone();

        let worker = tokio::spawn(async move {
            while let Some(update) = rx.recv().await {
                let fut = async {
                    match &update {
                        CycleUpdate::Reading(reading) => consumer.on_reading(reading).await,
                        CycleUpdate::Failed(error) => consumer.on_refresh_failed(error).await,
                    }
                };
                if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                    let info = {
                        let any = &*panic_err;
                        if let Some(msg) = any.downcast_ref::<&'static str>() {
                            (*msg).to_string()
                        } else if let Some(msg) = any.downcast_ref::<String>() {
                            msg.clone()
                        } else {
                            "unknown panic".to_string()
                        }
                    };
                    bus.publish(Event::consumer_panicked(consumer.name(), info));
                }
            }
        });

        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        self.channels_write().insert(
            id,
            ConsumerChannel {
                name,
                sender: tx,
                worker,
            },
        );
        SubscriptionHandle(id)
    }

    /// Removes a registration.
    ///
    /// Updates already queued still drain in FIFO order; cycles completing
    /// after this call no longer deliver to the consumer. Returns `false`
    /// when the handle was not (or no longer) registered.
    pub fn unregister(&self, handle: SubscriptionHandle) -> bool {
        self.channels_write().remove(&handle.0).is_some()
    }

    /// Records one cycle outcome and fans it out to registered consumers.
    ///
    /// On success the cached reading is atomically replaced and the status
    /// reset before any consumer sees the update; on failure only the
    /// status changes and the last good reading stays. Delivery is
    /// `try_send`: a full or closed queue drops the update for that
    /// consumer only and publishes `ConsumerOverflow`.
    pub fn on_cycle_complete(&self, result: Result<PopularityReading, RefreshError>) {
        let update = match result {
            Ok(reading) => {
                let reading = Arc::new(reading);
                let mut state = self.state_write();
                state.status.record_success(reading.captured_at);
                state.reading = Some(Arc::clone(&reading));
                drop(state);
                CycleUpdate::Reading(reading)
            }
            // A cancelled cycle is an aborted attempt sequence, not an
            // outcome; cached state must stay untouched.
            Err(RefreshError::Canceled) => return,
            Err(error) => {
                let error = Arc::new(error);
                self.state_write().status.record_failure(error.kind());
                CycleUpdate::Failed(error)
            }
        };

        // Snapshot the senders so registration churn during delivery cannot
        // skip or double-send to a consumer that stays registered.
        let senders: Vec<(&'static str, mpsc::Sender<CycleUpdate>)> = self
            .channels_read()
            .values()
            .map(|c| (c.name, c.sender.clone()))
            .collect();

        for (name, sender) in senders {
            match sender.try_send(update.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.bus.publish(Event::consumer_overflow(name, "full"));
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    self.bus.publish(Event::consumer_overflow(name, "closed"));
                }
            }
        }
    }

    /// Returns the cached reading and status.
    ///
    /// Cheap and safe to call concurrently with [`FanOut::on_cycle_complete`];
    /// the reading is `Arc`-cloned, never copied or torn.
    pub fn current(&self) -> CurrentView {
        let state = self.state_read();
        CurrentView {
            reading: state.reading.clone(),
            status: state.status.clone(),
        }
    }

    /// `true` once any cycle has ever produced a reading.
    ///
    /// Stays `true` through later failures: the last good reading remains
    /// available to consumers and diagnostics.
    pub fn available(&self) -> bool {
        self.state_read().reading.is_some()
    }

    /// Number of registered consumers.
    pub fn len(&self) -> usize {
        self.channels_read().len()
    }

    /// True if no consumers are registered.
    pub fn is_empty(&self) -> bool {
        self.channels_read().is_empty()
    }

    /// Graceful shutdown: close all queues and await worker completion.
    ///
    /// Queued updates drain first. The fan-out stays usable for `current`
    /// afterwards; new registrations are possible but pointless once the
    /// venue's actor has stopped.
    pub async fn close(&self) {
        let channels: Vec<ConsumerChannel> = {
            let mut map = self.channels_write();
            map.drain().map(|(_, c)| c).collect()
        };
        let workers: Vec<JoinHandle<()>> = channels
            .into_iter()
            .map(|c| {
                drop(c.sender);
                c.worker
            })
            .collect();
        for worker in workers {
            let _ = worker.await;
        }
    }

    // Lock poisoning cannot leave partial state here: readers and the
    // single writer only ever store fully-formed Arcs, so a poisoned
    // guard's data is taken as-is.

    fn state_read(&self) -> RwLockReadGuard<'_, Shared> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn state_write(&self) -> RwLockWriteGuard<'_, Shared> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn channels_read(&self) -> RwLockReadGuard<'_, HashMap<u64, ConsumerChannel>> {
        self.channels.read().unwrap_or_else(|e| e.into_inner())
    }

    fn channels_write(&self) -> RwLockWriteGuard<'_, HashMap<u64, ConsumerChannel>> {
        self.channels.write().unwrap_or_else(|e| e.into_inner())
    }
}
