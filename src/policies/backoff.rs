//! # Backoff policy for retrying fetch attempts.
//!
//! [`BackoffPolicy`] controls how the delay between retry attempts of one
//! refresh cycle grows. It is parameterized by:
//! - [`BackoffPolicy::first`] the delay after the first failed attempt;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the cap on the base delay.
//!
//! The base delay for retry `n` (0-indexed) is `first × factor^n`, clamped
//! to `max`, after which jitter is applied. Because the base is derived
//! purely from the retry number, jitter output never feeds back into later
//! delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use popwatch::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_secs(1),
//!     max: Duration::from_secs(60),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! // Retry 0 — uses `first`
//! assert_eq!(backoff.next(0), Duration::from_secs(1));
//! // Retry 2 — 1s × 2² = 4s
//! assert_eq!(backoff.next(2), Duration::from_secs(4));
//! // Retry 10 — 1s × 2¹⁰ = 1024s → capped at 60s
//! assert_eq!(backoff.next(10), Duration::from_secs(60));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy for one venue's refresh cycles.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Cap applied to the base delay (jitter may extend past it).
    pub max: Duration,
    /// Multiplicative growth factor (`2.0` gives the usual doubling).
    pub factor: f64,
    /// Randomization applied on top of the clamped base delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns the crate default pacing:
    /// - `first = 1s`
    /// - `factor = 2.0`
    /// - `max = 60s`
    /// - `jitter = Spread(0.4)`
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            max: Duration::from_secs(60),
            factor: 2.0,
            jitter: JitterPolicy::default(),
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given retry number (0-indexed).
    ///
    /// The base is `first × factor^retry`, clamped to [`BackoffPolicy::max`];
    /// overflow and non-finite intermediate values clamp to `max` as well.
    /// Jitter is then applied to the clamped base — with the spread policy
    /// the actual sleep lands in `[base, (1+ratio) × base]`.
    pub fn next(&self, retry: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = retry.min(i32::MAX as u32) as i32;
        let raw_secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base = if !raw_secs.is_finite() || raw_secs < 0.0 || raw_secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(raw_secs)
        };

        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubling(first_ms: u64, max: Duration) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn retry_zero_returns_first() {
        let policy = doubling(100, Duration::from_secs(30));
        assert_eq!(policy.next(0), Duration::from_millis(100));
    }

    #[test]
    fn doubles_without_jitter() {
        let policy = doubling(100, Duration::from_secs(30));
        assert_eq!(policy.next(0), Duration::from_millis(100));
        assert_eq!(policy.next(1), Duration::from_millis(200));
        assert_eq!(policy.next(2), Duration::from_millis(400));
        assert_eq!(policy.next(3), Duration::from_millis(800));
    }

    #[test]
    fn clamps_to_max() {
        let policy = doubling(100, Duration::from_secs(1));
        assert_eq!(policy.next(10), Duration::from_secs(1));
    }

    #[test]
    fn first_exceeding_max_is_clamped() {
        let policy = doubling(10_000, Duration::from_secs(5));
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn huge_retry_number_clamps_to_max() {
        let policy = doubling(100, Duration::from_secs(60));
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(60));
    }

    #[test]
    fn spread_jitter_never_undershoots_the_base() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::Spread { ratio: 0.4 },
        };
        for retry in 0..8 {
            let base = Duration::from_millis(100 * (1 << retry));
            let delay = policy.next(retry);
            assert!(delay >= base, "retry {retry}: {delay:?} < base {base:?}");
            let ceiling = base + Duration::from_millis((base.as_millis() as u64 * 2) / 5);
            assert!(
                delay <= ceiling,
                "retry {retry}: {delay:?} > ceiling {ceiling:?}"
            );
        }
    }

    #[test]
    fn zero_first_stays_zero() {
        let policy = doubling(0, Duration::from_secs(30));
        assert_eq!(policy.next(5), Duration::ZERO);
    }
}
