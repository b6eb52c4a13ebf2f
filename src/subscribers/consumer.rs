//! # Reading consumer trait.
//!
//! Provides [`Consume`] the extension point for anything that wants to
//! render or forward readings: host entities, loggers, exporters.
//!
//! Each registered consumer gets:
//! - **Dedicated worker task** (runs independently)
//! - **Per-consumer bounded queue** (capacity via [`Consume::queue_capacity`])
//! - **Panic isolation** (panics are caught and reported as
//!   `EventKind::ConsumerPanicked`)
//!
//! ## Architecture
//! ```text
//! FanOut ──► [bounded queue] ──► worker task ──► consumer.on_reading()
//!                             └─► panic caught → EventKind::ConsumerPanicked
//! ```
//!
//! ## Rules
//! - A slow consumer only affects its own queue.
//! - Queue overflow drops the update **for this consumer only** and
//!   publishes `EventKind::ConsumerOverflow`; other consumers are
//!   unaffected.
//! - Updates are delivered sequentially (FIFO) per consumer.
//! - Consumers never block the refresh cycle or each other.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use popwatch::{Consume, PopularityReading, RefreshError};
//!
//! struct Threshold;
//!
//! #[async_trait]
//! impl Consume for Threshold {
//!     async fn on_reading(&self, reading: &PopularityReading) {
//!         if reading.value > 80 {
//!             // fire a notification, flip a switch, etc.
//!         }
//!     }
//!
//!     async fn on_refresh_failed(&self, error: &RefreshError) {
//!         eprintln!("refresh failed: {error}");
//!     }
//!
//!     fn name(&self) -> &'static str { "threshold" }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RefreshError;
use crate::reading::PopularityReading;

/// Shared reference to a reading consumer.
pub type ConsumeRef = Arc<dyn Consume>;

/// Consumer of refresh-cycle outcomes for one venue.
///
/// Each consumer runs in isolation:
/// - **Bounded queue** buffers updates (capacity via [`Self::queue_capacity`]).
/// - **Dedicated worker task** processes updates sequentially (FIFO).
/// - **Panic isolation**: panics are caught and published as
///   `ConsumerPanicked`.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
/// - Slow processing affects only this consumer's queue.
#[async_trait]
pub trait Consume: Send + Sync + 'static {
    /// Handles a new reading after a successful refresh cycle.
    ///
    /// The reading is replace-only: the fan-out never mutates it after
    /// delivery, so it is safe to keep (it arrives behind an `Arc`).
    async fn on_reading(&self, reading: &PopularityReading);

    /// Handles a failed refresh cycle.
    ///
    /// The last good reading stays cached; this hook is for availability
    /// rendering. The default does nothing.
    async fn on_refresh_failed(&self, error: &RefreshError) {
        let _ = error;
    }

    /// Returns the consumer name used in overflow/panic events.
    ///
    /// Prefer short, descriptive names (e.g., "entity", "log", "mqtt").
    /// The default uses `type_name::<Self>()`, which can be verbose -
    /// override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this consumer.
    ///
    /// Overflow behavior:
    /// 1) The new update is dropped for this consumer only,
    /// 2) an `EventKind::ConsumerOverflow` is published,
    /// 3) other consumers are unaffected.
    ///
    /// The fan-out clamps capacity to a minimum of 1.
    ///
    /// Default: 64 (readings arrive once per cycle; deep queues only hide
    /// a stuck consumer).
    fn queue_capacity(&self) -> usize {
        64
    }
}
