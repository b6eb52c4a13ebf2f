//! # Jitter policy for retry delays.
//!
//! [`JitterPolicy`] adds randomness to backoff delays so that many venues
//! recovering from the same upstream outage do not retry in lockstep.
//!
//! - [`JitterPolicy::None`] — no randomization, predictable delays
//! - [`JitterPolicy::Spread`] — adds `uniform(0, ratio × delay)` on top of
//!   the base delay, so the sleep lands in `[delay, (1+ratio) × delay]`

use std::time::Duration;

use rand::Rng;

/// Policy controlling randomization of retry delays.
///
/// The spread form *extends* the base delay rather than shrinking it: the
/// base schedule stays the floor, which keeps the worst-case retry pressure
/// on the data source bounded below by the exponential curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JitterPolicy {
    /// No jitter: use the exact backoff delay.
    ///
    /// Use for a single venue, or in tests that assert the base schedule.
    None,

    /// Additive spread: `delay + uniform(0, ratio × delay)`.
    ///
    /// `ratio` is clamped to `[0, +∞)`; non-finite ratios behave like `0`.
    Spread {
        /// Fraction of the base delay available as extra random wait.
        ratio: f64,
    },
}

impl JitterPolicy {
    /// Spread ratio used by [`JitterPolicy::spread`] and the crate defaults.
    pub const DEFAULT_SPREAD_RATIO: f64 = 0.4;

    /// Returns the default spread policy (`ratio = 0.4`).
    pub fn spread() -> Self {
        JitterPolicy::Spread {
            ratio: Self::DEFAULT_SPREAD_RATIO,
        }
    }

    /// Applies jitter to the given base delay.
    ///
    /// For [`JitterPolicy::None`] the delay is returned unchanged. For
    /// [`JitterPolicy::Spread`] a uniform random extra in
    /// `[0, ratio × delay]` is added; sub-millisecond bounds collapse to no
    /// extra wait.
    pub fn apply(&self, delay: Duration) -> Duration {
        match *self {
            JitterPolicy::None => delay,
            JitterPolicy::Spread { ratio } => {
                let ratio = if ratio.is_finite() { ratio.max(0.0) } else { 0.0 };
                let bound_ms = (delay.as_millis() as f64 * ratio).round() as u64;
                if bound_ms == 0 {
                    return delay;
                }
                let mut rng = rand::rng();
                delay + Duration::from_millis(rng.random_range(0..=bound_ms))
            }
        }
    }
}

impl Default for JitterPolicy {
    /// Returns the additive spread at [`Self::DEFAULT_SPREAD_RATIO`].
    fn default() -> Self {
        Self::spread()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let d = Duration::from_millis(750);
        assert_eq!(JitterPolicy::None.apply(d), d);
    }

    #[test]
    fn spread_stays_within_bounds() {
        let policy = JitterPolicy::Spread { ratio: 0.4 };
        let base = Duration::from_millis(1000);
        for _ in 0..200 {
            let jittered = policy.apply(base);
            assert!(jittered >= base, "jitter must never shrink the delay");
            assert!(
                jittered <= Duration::from_millis(1400),
                "jitter above 1.4x base: {jittered:?}"
            );
        }
    }

    #[test]
    fn spread_on_zero_delay_is_zero() {
        let policy = JitterPolicy::spread();
        assert_eq!(policy.apply(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn degenerate_ratios_behave_like_none() {
        let base = Duration::from_millis(500);
        for ratio in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let policy = JitterPolicy::Spread { ratio };
            assert_eq!(policy.apply(base), base, "ratio {ratio} should be inert");
        }
    }
}
