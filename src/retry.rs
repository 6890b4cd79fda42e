// retry.rs
use rand::Rng;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::errors::TrendError;

/// Bounded retry for network-shaped failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Backoff grows by this much per attempt.
    pub backoff_step_secs: u64,
    pub max_backoff_secs: u64,
    pub jitter_max_millis: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step_secs: 2,
            max_backoff_secs: 10,
            jitter_max_millis: 2_000,
        }
    }
}

impl RetryPolicy {
    #[cfg(test)]
    /// No waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff_step_secs: 0,
            max_backoff_secs: 0,
            jitter_max_millis: 0,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = std::cmp::min(
            self.backoff_step_secs.saturating_mul(attempt as u64),
            self.max_backoff_secs,
        );
        let jitter = if self.jitter_max_millis == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.jitter_max_millis)
        };
        Duration::from_secs(base) + Duration::from_millis(jitter)
    }
}

/// Run `op` until it succeeds, fails with a non-transient error, or the
/// attempt budget is spent.
pub fn with_retry<T, F>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, TrendError>
where
    F: FnMut() -> Result<T, TrendError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let start = Instant::now();

        match op() {
            Ok(value) => {
                debug!(label, attempt, elapsed = ?start.elapsed(), "attempt succeeded");
                return Ok(value);
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    label,
                    attempt,
                    elapsed = ?start.elapsed(),
                    retry_in = ?delay,
                    error = %e,
                    "attempt failed, retrying"
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => {
                warn!(label, attempt, error = %e, "giving up");
                return Err(e);
            }
        }
    }
}
