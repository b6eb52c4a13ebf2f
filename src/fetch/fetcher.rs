//! # Popularity data provider trait.
//!
//! This module defines the [`Fetch`] trait, the single seam between the
//! refresh engine and whatever transport actually talks to the data source.
//! The common handle type is [`FetchRef`], an `Arc<dyn Fetch>` safe to share
//! across venues (the transport must be stateless with respect to callers).
//!
//! Implementations classify their failures as transient or permanent via
//! [`FetchError`](crate::FetchError); the refresh engine retries only
//! transient ones.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::fetch::snapshot::VenueSnapshot;

/// Shared reference to a popularity data provider.
pub type FetchRef = Arc<dyn Fetch>;

/// # Popularity data provider.
///
/// `fetch` receives the derived query string (see
/// [`VenueQuery::target`](crate::VenueQuery::target)) and returns one raw
/// [`VenueSnapshot`], or a classified [`FetchError`]:
/// - [`FetchError::Transient`] for conditions worth retrying (timeouts,
///   connection resets, HTTP 429/5xx),
/// - [`FetchError::Permanent`] for everything else (malformed responses,
///   non-retryable HTTP errors, unexpected failures).
///
/// Implementations must not block the async executor; wrap blocking calls
/// with [`FetchFn`](crate::FetchFn) or `spawn_blocking` yourself.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use popwatch::{Fetch, FetchError, VenueSnapshot};
///
/// struct Fixed(f64);
///
/// #[async_trait]
/// impl Fetch for Fixed {
///     async fn fetch(&self, _target: &str) -> Result<VenueSnapshot, FetchError> {
///         Ok(VenueSnapshot {
///             current_popularity: Some(self.0),
///             ..VenueSnapshot::default()
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    /// Performs one fetch for the given query string.
    async fn fetch(&self, target: &str) -> Result<VenueSnapshot, FetchError>;
}
