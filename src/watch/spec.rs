//! # Venue specification for watching.
//!
//! Defines [`VenueSpec`] a configuration bundle describing how one venue is
//! polled (query, provider, cadence, retry pacing), plus [`venue_id`] the
//! stable address-derived identifier.
//!
//! A spec can be created:
//! - **From config** with [`VenueSpec::with_defaults`] (inherit cadence and
//!   retry pacing from [`WatchConfig`])
//! - then tightened per venue with the builder-style `with_*` methods
//!
//! ## Rules
//! - The spec is passed to [`Watcher::add_venue`](crate::Watcher::add_venue).
//! - Two specs whose addresses normalize to the same string share a venue
//!   id; the watcher rejects the second as a duplicate.

use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::config::WatchConfig;
use crate::engine::VenueQuery;
use crate::fetch::FetchRef;
use crate::policies::{BackoffPolicy, RetryPolicy};

/// Derives the stable identifier for an address.
///
/// The address is trimmed and lowercased, then hashed; the id is `venue_`
/// followed by the first 12 hex characters of the sha256 digest. Stable
/// across whitespace and case variations of the same address.
///
/// # Example
/// ```
/// use popwatch::venue_id;
///
/// assert_eq!(
///     venue_id("12 Pier Rd, Harbortown"),
///     venue_id("  12 PIER RD, Harbortown "),
/// );
/// ```
pub fn venue_id(address: &str) -> String {
    let digest = Sha256::digest(address.trim().to_lowercase().as_bytes());
    format!("venue_{}", &hex::encode(digest)[..12])
}

/// Specification for watching one venue.
///
/// Bundles together:
/// - The venue identity ([`VenueQuery`])
/// - The data provider ([`FetchRef`])
/// - The refresh cadence (interval between cycles)
/// - The retry pacing within a cycle ([`RetryPolicy`])
#[derive(Clone)]
pub struct VenueSpec {
    query: VenueQuery,
    fetcher: FetchRef,
    interval: Duration,
    retry: RetryPolicy,
}

impl VenueSpec {
    /// Creates a spec inheriting cadence and retry pacing from `cfg`.
    ///
    /// # Example
    /// ```
    /// use popwatch::{FetchFn, VenueQuery, VenueSpec, WatchConfig, VenueSnapshot};
    ///
    /// let cfg = WatchConfig::default();
    /// let query = VenueQuery::new("Cafe Luna", "12 Pier Rd").unwrap();
    /// let fetcher = FetchFn::arc(|_| Ok(VenueSnapshot::default()));
    /// let spec = VenueSpec::with_defaults(query, fetcher, &cfg);
    /// assert_eq!(spec.interval(), cfg.interval);
    /// ```
    pub fn with_defaults(query: VenueQuery, fetcher: FetchRef, cfg: &WatchConfig) -> Self {
        Self {
            query,
            fetcher,
            interval: cfg.interval,
            retry: RetryPolicy::new(cfg.max_attempts, cfg.backoff),
        }
    }

    /// Returns the venue query.
    pub fn query(&self) -> &VenueQuery {
        &self.query
    }

    /// Returns the data provider.
    pub fn fetcher(&self) -> &FetchRef {
        &self.fetcher
    }

    /// Returns the interval between refresh cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the retry pacing for one cycle.
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Returns the address-derived stable id for this venue.
    pub fn venue_id(&self) -> String {
        venue_id(self.query.address())
    }

    /// Returns a new spec with an updated cycle interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Returns a new spec with an updated attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.retry = RetryPolicy::new(max_attempts, self.retry.backoff);
        self
    }

    /// Returns a new spec with an updated backoff schedule.
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.retry = RetryPolicy::new(self.retry.max_attempts, backoff);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchFn, VenueSnapshot};
    use crate::policies::JitterPolicy;

    fn spec() -> VenueSpec {
        VenueSpec::with_defaults(
            VenueQuery::new("Cafe Luna", "12 Pier Rd, Harbortown").unwrap(),
            FetchFn::arc(|_| Ok(VenueSnapshot::default())),
            &WatchConfig::default(),
        )
    }

    #[test]
    fn venue_id_is_stable_across_address_variants() {
        let id = venue_id("12 Pier Rd, Harbortown");
        assert_eq!(id, venue_id("  12 pier rd, harbortown  "));
        assert_ne!(id, venue_id("13 Pier Rd, Harbortown"));
        assert!(id.starts_with("venue_"));
        assert_eq!(id.len(), "venue_".len() + 12);
    }

    #[test]
    fn inherits_defaults_from_config() {
        let cfg = WatchConfig::default();
        let s = spec();
        assert_eq!(s.interval(), cfg.interval);
        assert_eq!(s.retry().max_attempts, cfg.max_attempts);
    }

    #[test]
    fn builders_override_inherited_values() {
        let s = spec()
            .with_interval(Duration::from_secs(60))
            .with_max_attempts(8)
            .with_backoff(BackoffPolicy {
                first: Duration::from_millis(250),
                max: Duration::from_secs(5),
                factor: 2.0,
                jitter: JitterPolicy::None,
            });

        assert_eq!(s.interval(), Duration::from_secs(60));
        assert_eq!(s.retry().max_attempts, 8);
        assert_eq!(s.retry().backoff.first, Duration::from_millis(250));
    }
}
