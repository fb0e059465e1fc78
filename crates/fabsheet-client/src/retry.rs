//! Bounded retry schedule for mutating requests

use std::time::Duration;

/// Retry schedule applied to mutating calls.
///
/// Attempt `n` (zero-based) sleeps `base_delay * 2^(n-1)` first, capped at
/// `max_delay`; attempt 0 runs immediately. Reads are never retried.
/// Mutations retry only on transport failures and 429/5xx answers, and every
/// attempt of one logical mutation reuses the same idempotency key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Sleep to take before the given zero-based attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2_u32.saturating_pow(attempt - 1);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_attempt_never_sleeps() {
        assert_eq!(RetryPolicy::default().delay_for(0), Duration::ZERO);
    }

    #[test]
    fn test_delays_double_until_the_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_secs(1));
        assert_eq!(policy.delay_for(3), Duration::from_secs(2));
        assert_eq!(policy.delay_for(4), Duration::from_secs(4));
        assert_eq!(policy.delay_for(5), Duration::from_secs(5));
        assert_eq!(policy.delay_for(30), Duration::from_secs(5));
    }

    #[test]
    fn test_none_makes_exactly_one_attempt() {
        assert_eq!(RetryPolicy::none().max_attempts, 1);
    }
}
