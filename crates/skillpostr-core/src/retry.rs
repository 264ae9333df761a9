//! Fixed-attempt, fixed-delay polling.
//!
//! Used to wait out the window in which a freshly created session is not yet
//! visible. The policy turns that race into a bounded worst-case latency of
//! `(max_attempts - 1) * delay`.

use std::{future::Future, time::Duration};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total number of probes, including the first. Values below 1 are treated
  /// as 1.
  pub max_attempts: u32,
  /// Pause between two consecutive probes.
  pub delay:        Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: Self::DEFAULT_ATTEMPTS,
      delay:        Self::DEFAULT_DELAY,
    }
  }
}

/// The result of [`RetryPolicy::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polled<T> {
  pub value:    Option<T>,
  /// How many probes actually ran.
  pub attempts: u32,
}

impl RetryPolicy {
  pub const DEFAULT_ATTEMPTS: u32 = 5;
  pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

  pub fn new(max_attempts: u32, delay: Duration) -> Self {
    Self { max_attempts, delay }
  }

  fn attempts(&self) -> u32 { self.max_attempts.max(1) }

  /// Longest total time spent sleeping when every probe comes back empty.
  pub fn worst_case_wait(&self) -> Duration {
    self.delay * (self.attempts() - 1)
  }

  /// Run `probe` until it yields a value or the attempts are spent.
  ///
  /// `probe` receives the 1-based attempt number. The delay is slept between
  /// attempts only, never after the last one.
  pub async fn poll<T, F, Fut>(&self, mut probe: F) -> Polled<T>
  where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
  {
    let attempts = self.attempts();
    for attempt in 1..=attempts {
      if let Some(value) = probe(attempt).await {
        return Polled { value: Some(value), attempts: attempt };
      }
      if attempt < attempts {
        debug!(attempt, max_attempts = attempts, delay = ?self.delay, "probe empty; waiting");
        tokio::time::sleep(self.delay).await;
      }
    }
    Polled { value: None, attempts }
  }
}
