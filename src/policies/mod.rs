//! Retry pacing policies.
//!
//! This module groups the knobs that control **how long** the refresh
//! engine waits between attempts of one cycle.
//!
//! ## Contents
//! - [`RetryPolicy`]   attempt budget + backoff, what the engine consumes
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization added on top to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! VenueSpec { retry: RetryPolicy { max_attempts, backoff }, .. }
//!      └─► engine::RefreshEngine uses:
//!           - retry.delay_after(attempt) to pace the sleep after a
//!             transient failure
//!           - retry.max_attempts to bound the cycle
//! ```
//!
//! ## Defaults
//! - `RetryPolicy::default()` → 3 attempts over
//!   `BackoffPolicy::default()` (first=1s, factor=2.0, max=60s,
//!   jitter=Spread(0.4)); the additive spread keeps retries for many venues
//!   from lining up on the same instant.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::RetryPolicy;
