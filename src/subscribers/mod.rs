//! Consumer fan-out: cached state plus non-blocking delivery.
//!
//! ## Contents
//! - [`Consume`] / [`ConsumeRef`] the consumer extension point
//! - [`FanOut`] per-venue cache + per-consumer queues and workers
//! - [`CurrentView`], [`SubscriptionHandle`] read-side types
//! - [`LogWriter`] stdout printer (feature `logging`)
//!
//! ## Design
//! One fan-out per venue. The refresh cycle is the single writer; consumers
//! and diagnostics are many readers. The cached reading is an `Arc` swapped
//! under a short write lock, so readers never block the writer longer than
//! the swap. Delivery is per-consumer bounded queues drained by dedicated
//! workers; a slow, overflowing, or panicking consumer never affects its
//! siblings.

mod consumer;
mod fanout;

pub use consumer::{Consume, ConsumeRef};
pub use fanout::{CurrentView, FanOut, SubscriptionHandle};

#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;
