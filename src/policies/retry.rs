//! # Retry policy: attempt budget plus backoff pacing.

use std::time::Duration;

use crate::policies::backoff::BackoffPolicy;

/// How many attempts one refresh cycle may spend, and how the sleeps
/// between them are paced.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use popwatch::{BackoffPolicy, JitterPolicy, RetryPolicy};
///
/// let policy = RetryPolicy::new(
///     4,
///     BackoffPolicy {
///         first: Duration::from_secs(1),
///         max: Duration::from_secs(60),
///         factor: 2.0,
///         jitter: JitterPolicy::None,
///     },
/// );
///
/// // delay scheduled after the n-th failed attempt:
/// assert_eq!(policy.delay_after(1), Duration::from_secs(1));
/// assert_eq!(policy.delay_after(2), Duration::from_secs(2));
/// assert_eq!(policy.delay_after(3), Duration::from_secs(4));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per cycle, at least 1.
    pub max_attempts: u32,
    /// Delay schedule between attempts.
    pub backoff: BackoffPolicy,
}

impl Default for RetryPolicy {
    /// 3 attempts over the default backoff schedule.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least 1.
    pub fn new(max_attempts: u32, backoff: BackoffPolicy) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Returns the (jittered) delay to sleep after failed attempt `attempt`
    /// (1-indexed), before attempt `attempt + 1`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.next(attempt.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::jitter::JitterPolicy;

    #[test]
    fn attempt_budget_is_at_least_one() {
        let policy = RetryPolicy::new(0, BackoffPolicy::default());
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn delays_follow_the_backoff_schedule() {
        let policy = RetryPolicy::new(
            5,
            BackoffPolicy {
                first: Duration::from_millis(500),
                max: Duration::from_secs(3),
                factor: 2.0,
                jitter: JitterPolicy::None,
            },
        );

        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_secs(1));
        assert_eq!(policy.delay_after(3), Duration::from_secs(2));
        // capped
        assert_eq!(policy.delay_after(4), Duration::from_secs(3));
    }
}
