//! Bounded retries and rate-limit pacing for outbound requests.
//!
//! [`RetryState`] is a pure state machine: it is fed the outcome of each attempt and
//! answers whether to finish, sleep and retry, or give up. [`RetryPolicy`] drives it
//! against a real request and additionally tracks the cooldown that spaces out
//! requests once the remaining API quota runs low. The cooldown outlives a single
//! request, so one policy is shared by every request of a scan.

use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::EnrichableExt;

const LOG_TARGET: &str = "     retry";

/// Snapshot of the API quota, as reported alongside a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// The outcome of a single request attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    /// The request succeeded. An empty result set is also a success: it marks the end of the data.
    Data(T, Option<Quota>),

    /// The quota is exhausted until the given instant.
    RateLimited(DateTime<Utc>),

    /// A network-level failure that may go away on its own.
    Transient(ohno::AppError),

    /// A failure that retrying will not fix.
    Fatal(ohno::AppError),
}

/// What to do after an attempt.
#[derive(Debug)]
pub enum Step<T> {
    Finish(T),
    Sleep(Duration),
    GiveUp(ohno::AppError),
}

/// Tuning knobs for [`RetryPolicy`].
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Attempts allowed per request. Waiting out a rate limit does not count as an attempt.
    pub max_attempts: u32,

    /// Constant delay between attempts after a transient failure.
    pub backoff: Duration,

    /// Extra time to wait past the announced quota reset, to absorb clock offset.
    pub reset_padding: Duration,

    /// Upper bound on a single wait for a quota reset.
    pub max_reset_wait: Duration,

    /// Remaining quota at or below which requests get spaced out.
    pub low_water_mark: u32,

    /// Length of the window the quota limit applies to.
    pub quota_window: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            backoff: Duration::from_secs(15),
            reset_padding: Duration::from_secs(10),
            max_reset_wait: Duration::from_secs(3600),
            low_water_mark: 10,
            quota_window: Duration::from_secs(3600),
        }
    }
}

impl RetryConfig {
    /// How long to wait for a quota reset announced for `reset_at`.
    #[must_use]
    pub fn reset_wait(&self, reset_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        let until_reset = (reset_at - now).to_std().unwrap_or(Duration::ZERO);
        until_reset.min(self.max_reset_wait) + self.reset_padding
    }
}

/// Retry bookkeeping for one request.
#[derive(Debug, Clone)]
pub struct RetryState {
    config: RetryConfig,
    attempts: u32,
}

impl RetryState {
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self { config, attempts: 0 }
    }

    /// Number of attempts counted against the cap so far.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Classify the outcome of an attempt against `target` and decide the next step.
    pub fn advance<T>(&mut self, attempt: Attempt<T>, now: DateTime<Utc>, target: &str) -> Step<T> {
        match attempt {
            Attempt::Data(value, _) => Step::Finish(value),

            Attempt::RateLimited(reset_at) => {
                let wait = self.config.reset_wait(reset_at, now);
                log::warn!(
                    target: LOG_TARGET,
                    "Rate limit exhausted while requesting {target}, waiting until {}",
                    (now + wait).with_timezone(&chrono::Local).format("%T")
                );
                Step::Sleep(wait)
            }

            Attempt::Fatal(e) => Step::GiveUp(e.enrich_with(|| format!("requesting {target}"))),

            Attempt::Transient(e) => {
                self.attempts += 1;
                if self.attempts >= self.config.max_attempts {
                    let attempts = self.attempts;
                    return Step::GiveUp(e.enrich_with(|| format!("giving up on {target} after {attempts} attempts")));
                }

                log::debug!(
                    target: LOG_TARGET,
                    "Attempt {} for {target} failed, retrying in {}s: {e:#}",
                    self.attempts,
                    self.config.backoff.as_secs()
                );
                Step::Sleep(self.config.backoff)
            }
        }
    }
}

/// How requests are held back while the quota runs low. Both variants end at `until`,
/// when the quota resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cooldown {
    /// Leave `delay` between consecutive requests.
    Spacing { delay: Duration, until: DateTime<Utc> },

    /// Hold every request until the quota resets.
    Exhausted { until: DateTime<Utc> },
}

/// Executes requests with bounded retries while pacing them against the API quota.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    cooldown: Option<Cooldown>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self { config, cooldown: None }
    }

    /// Delay to apply before a request issued at `now`.
    ///
    /// A cooldown whose quota window has already reset is dropped, even if no request
    /// reported a fresh quota in the meantime.
    pub fn cooldown(&mut self, now: DateTime<Utc>) -> Duration {
        let Some(cooldown) = self.cooldown else {
            return Duration::ZERO;
        };

        let (Cooldown::Spacing { until, .. } | Cooldown::Exhausted { until }) = cooldown;
        if now >= until {
            log::debug!(target: LOG_TARGET, "Quota window reset, no longer slowing down");
            self.cooldown = None;
            return Duration::ZERO;
        }

        match cooldown {
            Cooldown::Spacing { delay, .. } => delay,
            Cooldown::Exhausted { until } => (until - now).to_std().unwrap_or(Duration::ZERO),
        }
    }

    /// Update the cooldown from the quota reported by the latest response.
    pub fn observe(&mut self, quota: &Quota, now: DateTime<Utc>) {
        self.cooldown = if quota.remaining == 0 {
            let wait = self.config.reset_wait(quota.reset_at, now);
            Some(Cooldown::Exhausted { until: now + wait })
        } else if quota.remaining <= self.config.low_water_mark {
            Some(Cooldown::Spacing {
                delay: self.config.quota_window / quota.limit.max(1),
                until: quota.reset_at,
            })
        } else {
            None
        };

        if self.cooldown.is_some() {
            log::debug!(
                target: LOG_TARGET,
                "{} requests left in quota, slowing down until {}",
                quota.remaining,
                quota.reset_at.with_timezone(&chrono::Local).format("%T")
            );
        }
    }

    /// Run `send` until it produces data, the error is fatal, or the attempts run out.
    pub async fn execute<T, F, Fut>(&mut self, target: &str, mut send: F) -> crate::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let mut state = RetryState::new(self.config);

        loop {
            let cooldown = self.cooldown(Utc::now());
            if !cooldown.is_zero() {
                tokio::time::sleep(cooldown).await;
            }

            let attempt = send().await;
            let now = Utc::now();

            if let Attempt::Data(_, Some(quota)) = &attempt {
                self.observe(quota, now);
            }

            match state.advance(attempt, now, target) {
                Step::Finish(value) => return Ok(value),
                Step::Sleep(delay) => tokio::time::sleep(delay).await,
                Step::GiveUp(e) => return Err(e),
            }
        }
    }
}
