use std::time::Duration;

/// Retry behavior for the market-data gateway.
///
/// Two independent policies live here:
/// - transient connectivity failures get exponential backoff:
///   `min(max_delay, initial_delay * multiplier^n)` before attempt n+2,
///   up to `max_attempts` attempts total;
/// - provider-side service errors (rate limits etc.) get a fixed
///   `provider_cooldown` sleep, up to `max_provider_attempts` attempts.
///
/// The cooldown used to be unbounded in an earlier variant of this bot,
/// which could block a cycle forever on a dead API key. Bounding it turns
/// that hang into a surfaced error.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
    pub max_attempts: u32,
    pub provider_cooldown: Duration,
    pub max_provider_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            multiplier: 2,
            max_delay: Duration::from_secs(4),
            max_attempts: 5,
            provider_cooldown: Duration::from_secs(60),
            max_provider_attempts: 3,
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after failed attempt `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .initial_delay
            .saturating_mul(self.multiplier.saturating_pow(attempt.saturating_sub(1)));
        exp.min(self.max_delay)
    }

    /// The full sleep sequence a fully-failing request would see.
    /// One fewer entry than `max_attempts`: no sleep after the last attempt.
    pub fn backoff_sequence(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|a| self.backoff_delay(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_increases_exponentially_then_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(4), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_sequence_matches_attempt_budget() {
        let policy = RetryPolicy::default();
        let seq = policy.backoff_sequence();
        assert_eq!(
            seq,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(4),
            ]
        );
    }

    #[test]
    fn test_custom_policy_sequence() {
        let policy = RetryPolicy {
            initial_delay: Duration::from_millis(10),
            multiplier: 3,
            max_delay: Duration::from_millis(50),
            max_attempts: 4,
            ..RetryPolicy::default()
        };
        assert_eq!(
            policy.backoff_sequence(),
            vec![
                Duration::from_millis(10),
                Duration::from_millis(30),
                Duration::from_millis(50),
            ]
        );
    }

    #[test]
    fn test_default_cooldown_is_one_minute() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.provider_cooldown, Duration::from_secs(60));
        assert_eq!(policy.max_provider_attempts, 3);
    }
}
