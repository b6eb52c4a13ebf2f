//! Refresh engine: query derivation, retry loop, normalization.
//!
//! ## Contents
//! - [`VenueQuery`] name + address with the derived query string
//! - [`RefreshEngine`] the per-venue retry/backoff state machine
//! - `normalize` (private) snapshot → reading conversion
//!
//! ## Quick wiring
//! ```text
//! VenueActor ──► RefreshEngine::refresh(token)
//!                  ├─► FetchRef::fetch(target)      (cancellable race)
//!                  ├─► RetryPolicy::delay_after(n)  (cancellable sleep)
//!                  └─► normalize(snapshot, slot)    (live else historical)
//! ```

mod normalize;
mod query;
mod refresh;

pub use query::VenueQuery;
pub use refresh::RefreshEngine;
