//! # Watcher configuration.
//!
//! [`WatchConfig`] is the crate-wide defaults bundle: refresh cadence,
//! attempt budget, backoff schedule, bus capacity, shutdown grace. Venue
//! specs inherit from it via
//! [`VenueSpec::with_defaults`](crate::VenueSpec::with_defaults).
//!
//! [`RefreshOptions`] is the raw, serde-deserializable form a host config
//! layer hands over; [`RefreshOptions::clamped`] folds it into a
//! [`WatchConfig`], silently pinning out-of-range values into their valid
//! ranges so a bad option can never destabilize the refresh core.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use popwatch::WatchConfig;
//!
//! let mut cfg = WatchConfig::default();
//! cfg.interval = Duration::from_secs(300);
//! cfg.max_attempts = 5;
//!
//! assert_eq!(cfg.max_attempts, 5);
//! ```

use std::time::Duration;

use serde::Deserialize;

use crate::policies::{BackoffPolicy, JitterPolicy};

/// Global configuration for a [`Watcher`](crate::Watcher) and the defaults
/// venue specs inherit.
#[derive(Clone, Debug)]
pub struct WatchConfig {
    /// Time between refresh cycles of one venue.
    pub interval: Duration,
    /// Fetch attempts per refresh cycle.
    pub max_attempts: u32,
    /// Delay schedule between attempts of one cycle.
    pub backoff: BackoffPolicy,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
    /// Maximum time to wait for venue actors during graceful shutdown.
    pub grace: Duration,
}

impl Default for WatchConfig {
    /// Provides the default configuration:
    /// - `interval = 10min`
    /// - `max_attempts = 3`
    /// - `backoff = BackoffPolicy::default()` (1s..60s doubling, spread jitter)
    /// - `bus_capacity = 1024`
    /// - `grace = 30s`
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            max_attempts: 3,
            backoff: BackoffPolicy::default(),
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
        }
    }
}

/// Valid ranges enforced by [`RefreshOptions::clamped`].
const INTERVAL_MINUTES: (u64, u64) = (1, 120);
const MAX_ATTEMPTS: (u32, u32) = (1, 8);
const BACKOFF_INITIAL_SECONDS: (f64, f64) = (0.1, 30.0);
const BACKOFF_MAX_SECONDS_CEIL: f64 = 120.0;

/// Raw refresh options as a host config layer supplies them.
///
/// Field names match the option keys of the host integration
/// (`update_interval_minutes`, `max_attempts`, `backoff_initial_seconds`,
/// `backoff_max_seconds`). Values are *not* trusted: [`Self::clamped`]
/// pins every field into its valid range.
///
/// # Example
/// ```
/// use popwatch::RefreshOptions;
///
/// let options: RefreshOptions = serde_json::from_str(
///     r#"{"update_interval_minutes": 5, "max_attempts": 99}"#,
/// ).unwrap();
/// let cfg = options.clamped();
/// assert_eq!(cfg.interval.as_secs(), 300);
/// assert_eq!(cfg.max_attempts, 8);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefreshOptions {
    /// Minutes between refresh cycles, valid range 1..=120.
    pub update_interval_minutes: u64,
    /// Fetch attempts per cycle, valid range 1..=8.
    pub max_attempts: u32,
    /// First backoff delay in seconds, valid range 0.1..=30.0.
    pub backoff_initial_seconds: f64,
    /// Backoff cap in seconds, valid range initial..=120.0.
    pub backoff_max_seconds: f64,
}

impl Default for RefreshOptions {
    /// Mirrors [`WatchConfig::default`] in option form.
    fn default() -> Self {
        Self {
            update_interval_minutes: 10,
            max_attempts: 3,
            backoff_initial_seconds: 1.0,
            backoff_max_seconds: 60.0,
        }
    }
}

impl RefreshOptions {
    /// Folds the raw options into a [`WatchConfig`], clamping every value
    /// into its valid range.
    ///
    /// Non-finite backoff seconds fall back to the defaults before
    /// clamping; `backoff_max` is additionally floored at the clamped
    /// initial delay so the schedule can never shrink.
    pub fn clamped(&self) -> WatchConfig {
        let minutes = self
            .update_interval_minutes
            .clamp(INTERVAL_MINUTES.0, INTERVAL_MINUTES.1);
        let max_attempts = self.max_attempts.clamp(MAX_ATTEMPTS.0, MAX_ATTEMPTS.1);

        let initial = finite_or(self.backoff_initial_seconds, 1.0)
            .clamp(BACKOFF_INITIAL_SECONDS.0, BACKOFF_INITIAL_SECONDS.1);
        let max = finite_or(self.backoff_max_seconds, 60.0).clamp(initial, BACKOFF_MAX_SECONDS_CEIL);

        let defaults = WatchConfig::default();
        WatchConfig {
            interval: Duration::from_secs(minutes * 60),
            max_attempts,
            backoff: BackoffPolicy {
                first: Duration::from_secs_f64(initial),
                max: Duration::from_secs_f64(max),
                factor: 2.0,
                jitter: JitterPolicy::spread(),
            },
            bus_capacity: defaults.bus_capacity,
            grace: defaults.grace,
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_default_config() {
        let cfg = RefreshOptions::default().clamped();
        let defaults = WatchConfig::default();
        assert_eq!(cfg.interval, defaults.interval);
        assert_eq!(cfg.max_attempts, defaults.max_attempts);
        assert_eq!(cfg.backoff.first, defaults.backoff.first);
        assert_eq!(cfg.backoff.max, defaults.backoff.max);
    }

    #[test]
    fn out_of_range_values_are_pinned() {
        let cfg = RefreshOptions {
            update_interval_minutes: 0,
            max_attempts: 99,
            backoff_initial_seconds: 0.0,
            backoff_max_seconds: 999.0,
        }
        .clamped();

        assert_eq!(cfg.interval, Duration::from_secs(60));
        assert_eq!(cfg.max_attempts, 8);
        assert_eq!(cfg.backoff.first, Duration::from_secs_f64(0.1));
        assert_eq!(cfg.backoff.max, Duration::from_secs_f64(120.0));
    }

    #[test]
    fn backoff_max_is_floored_at_the_initial_delay() {
        let cfg = RefreshOptions {
            backoff_initial_seconds: 20.0,
            backoff_max_seconds: 5.0,
            ..RefreshOptions::default()
        }
        .clamped();

        assert_eq!(cfg.backoff.first, Duration::from_secs_f64(20.0));
        assert_eq!(cfg.backoff.max, Duration::from_secs_f64(20.0));
    }

    #[test]
    fn non_finite_backoff_falls_back_to_defaults() {
        let cfg = RefreshOptions {
            backoff_initial_seconds: f64::NAN,
            backoff_max_seconds: f64::INFINITY,
            ..RefreshOptions::default()
        }
        .clamped();

        assert_eq!(cfg.backoff.first, Duration::from_secs(1));
        assert_eq!(cfg.backoff.max, Duration::from_secs(60));
    }

    #[test]
    fn missing_json_fields_use_defaults() {
        let options: RefreshOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.update_interval_minutes, 10);
        assert_eq!(options.max_attempts, 3);
    }
}
