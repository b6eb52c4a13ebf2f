//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the watcher, venue
//! actors, refresh engine, and fan-out workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Watcher` (venue add/remove, shutdown path),
//!   `engine::RefreshEngine` (cycle lifecycle, backoff), `FanOut` workers
//!   (consumer overflow/panic).
//! - **Consumers**: host diagnostics via [`Watcher::events`](crate::Watcher::events),
//!   the optional `LogWriter` demo printer, tests.
//!
//! Events are observability metadata only; cached readings travel through
//! the fan-out, never through the bus.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
