//! Exponential backoff policy with symmetric jitter.

use std::time::Duration;

/// Stateless backoff policy.
///
/// `delay(attempt)` is a pure function of the attempt index and the
/// policy's fields: `min(base * multiplier^attempt, max)` with a uniform
/// jitter of ±`jitter_fraction`, clamped to be non-negative.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Delay before the first retry, pre-jitter
    pub base_delay: Duration,
    /// Upper bound on the pre-jitter delay
    pub max_delay: Duration,
    /// Growth factor between consecutive attempts
    pub multiplier: f64,
    /// Jitter spread as a fraction of the computed delay
    pub jitter_fraction: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            jitter_fraction: 0.1,
        }
    }
}

impl BackoffPolicy {
    /// Computes the wait before retry number `attempt` (0-indexed).
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as f64;
        let max = self.max_delay.as_millis() as f64;
        let raw = (base * self.multiplier.powi(attempt as i32)).min(max);

        let spread = raw * self.jitter_fraction;
        let jitter = rand::random::<f64>() * spread * 2.0 - spread;

        Duration::from_millis((raw + jitter).max(0.0) as u64)
    }

    /// No-op: the policy keeps no state across calls.
    ///
    /// Retained so policy handles can be swapped with stateful
    /// implementations without touching call sites.
    pub fn reset(&self) {}
}
