//! # Function-backed provider (`FetchFn`)
//!
//! [`FetchFn`] wraps a *blocking* closure `F: Fn(&str) -> Result<VenueSnapshot,
//! FetchError>` and runs it on tokio's blocking pool, so the cooperative
//! scheduler stays responsive while the underlying call performs synchronous
//! network I/O.
//!
//! ## Concurrency semantics
//! - Each [`Fetch::fetch`] call dispatches one `spawn_blocking` job.
//! - The closure is shared (`Arc`), never mutated; keep per-call state inside
//!   the closure's own locals.
//! - A panic inside the closure surfaces as [`FetchError::Permanent`]
//!   (unexpected failure), never as a crash of the calling task.
//!
//! ## Example
//! ```rust
//! use popwatch::{FetchFn, FetchRef, VenueSnapshot};
//!
//! let provider: FetchRef = FetchFn::arc(|target| {
//!     // a real transport would do blocking I/O here
//!     let _ = target;
//!     Ok(VenueSnapshot::default())
//! });
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fetch::fetcher::{Fetch, FetchRef};
use crate::fetch::snapshot::VenueSnapshot;

/// Blocking-closure provider implementation.
///
/// Runs the wrapped closure via [`tokio::task::spawn_blocking`] on every
/// fetch.
pub struct FetchFn<F> {
    f: Arc<F>,
}

impl<F> FetchFn<F>
where
    F: Fn(&str) -> Result<VenueSnapshot, FetchError> + Send + Sync + 'static,
{
    /// Wraps a blocking fetch closure.
    ///
    /// Prefer [`FetchFn::arc`] when you immediately need a [`FetchRef`].
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }

    /// Wraps the closure and returns it as a shared handle (`Arc<dyn Fetch>`).
    pub fn arc(f: F) -> FetchRef {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F> Fetch for FetchFn<F>
where
    F: Fn(&str) -> Result<VenueSnapshot, FetchError> + Send + Sync + 'static,
{
    async fn fetch(&self, target: &str) -> Result<VenueSnapshot, FetchError> {
        let f = Arc::clone(&self.f);
        let target = target.to_owned();
        match tokio::task::spawn_blocking(move || f(&target)).await {
            Ok(result) => result,
            Err(join) => Err(FetchError::permanent(format!("fetch call failed: {join}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_closure_off_the_executor() {
        let provider = FetchFn::new(|target: &str| {
            assert_eq!(target, "Cafe Luna, 12 Pier Rd");
            Ok(VenueSnapshot {
                current_popularity: Some(55.0),
                ..VenueSnapshot::default()
            })
        });

        let snap = provider.fetch("Cafe Luna, 12 Pier Rd").await.unwrap();
        assert_eq!(snap.current_popularity, Some(55.0));
    }

    #[tokio::test]
    async fn closure_panic_becomes_permanent() {
        let provider = FetchFn::new(|_: &str| -> Result<VenueSnapshot, FetchError> {
            panic!("transport blew up");
        });

        let err = provider.fetch("anywhere").await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn classified_errors_pass_through() {
        let provider = FetchFn::new(|_: &str| Err(FetchError::from_status(503, "upstream")));

        let err = provider.fetch("anywhere").await.unwrap_err();
        assert!(err.is_transient());
    }
}
