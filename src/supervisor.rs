// src/supervisor.rs

//! Retry-vs-abort policy for role loops, and the cancellable sleep every loop
//! suspends on.

use crate::error::{ErrorKind, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(100);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(5);

/// How many times, and how patiently, a role is restarted after a
/// recoverable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  pub max_retries: u32,
  pub initial_backoff: Duration,
  pub max_backoff: Duration,
}

impl RetryPolicy {
  /// Stop on the first failure of any kind.
  pub const fn never() -> Self {
    Self {
      max_retries: 0,
      initial_backoff: DEFAULT_INITIAL_BACKOFF,
      max_backoff: DEFAULT_MAX_BACKOFF,
    }
  }

  pub const fn retries(max_retries: u32) -> Self {
    Self {
      max_retries,
      initial_backoff: DEFAULT_INITIAL_BACKOFF,
      max_backoff: DEFAULT_MAX_BACKOFF,
    }
  }

  pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
    self.initial_backoff = initial;
    self.max_backoff = max.max(initial);
    self
  }

  /// Delay before retry number `attempt` (1-based): the initial backoff
  /// doubled per attempt, capped at `max_backoff`.
  pub fn backoff(&self, attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(31);
    self
      .initial_backoff
      .checked_mul(1u32 << shift)
      .map_or(self.max_backoff, |d| d.min(self.max_backoff))
  }

  /// `backoff` plus up to 10% random jitter.
  fn jittered_backoff(&self, attempt: u32) -> Duration {
    let base = self.backoff(attempt);
    let max_jitter = (base.as_millis() / 10) as u64;
    if max_jitter == 0 {
      return base;
    }
    base + Duration::from_millis(rand::rng().random_range(0..=max_jitter))
  }
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self::never()
  }
}

/// Sleeps for `duration` unless `token` is cancelled first.
/// Returns `false` when cancelled.
pub async fn pause(token: &CancellationToken, duration: Duration) -> bool {
  tokio::select! {
    _ = token.cancelled() => false,
    _ = tokio::time::sleep(duration) => true,
  }
}

/// Runs `body` until it returns `Ok`, a fatal error, or the retry budget and
/// the token allow no further attempt.
///
/// Each attempt gets a fresh future from `body`, so a role rebuilds its socket
/// on every restart.
pub async fn supervise<F, Fut>(name: &str, token: &CancellationToken, policy: RetryPolicy, mut body: F) -> Result<()>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<()>>,
{
  let mut attempt = 0u32;
  loop {
    let err = match body().await {
      Ok(()) => {
        tracing::debug!(role = name, "role finished");
        return Ok(());
      }
      Err(e) => e,
    };

    if err.kind() == ErrorKind::Fatal {
      tracing::error!(role = name, error = %err, detail = ?err, "role failed with fatal error");
      return Err(err);
    }
    if token.is_cancelled() {
      tracing::debug!(role = name, error = %err, "role error after shutdown requested; not retrying");
      return Ok(());
    }
    if attempt >= policy.max_retries {
      tracing::error!(
        role = name,
        error = %err,
        detail = ?err,
        retries = attempt,
        "role failed; retry budget exhausted"
      );
      return Err(err);
    }

    attempt += 1;
    let delay = policy.jittered_backoff(attempt);
    tracing::warn!(role = name, error = %err, attempt, ?delay, "recoverable failure; restarting role");
    if !pause(token, delay).await {
      return Ok(());
    }
  }
}
