//! Watching layer: per-venue actors, the watcher, signal handling.
//!
//! ## Contents
//! - [`VenueSpec`] / [`venue_id`] per-venue configuration bundle
//! - `VenueActor` (private) the periodic refresh loop
//! - [`Watcher`] actor set, membership, diagnostics, graceful shutdown
//! - `shutdown` (private) cross-platform signal wait
//!
//! ## Quick wiring
//! ```text
//! WatchConfig ──► Watcher::new
//! VenueSpec  ──► Watcher::add_venue ──► VenueActor (spawned)
//!                        │                  └─► RefreshEngine + FanOut
//!                        └─► Arc<FanOut> returned to the host
//! Watcher::run_until_shutdown ──► signal → cancel → bounded grace join
//! ```

mod actor;
mod shutdown;
mod spec;
mod watcher;

pub use spec::{VenueSpec, venue_id};
pub use watcher::Watcher;
