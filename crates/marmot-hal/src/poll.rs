//! Polling policy and the clock it sleeps on.
//!
//! Job runners wait between status queries through a [`Clock`] so that
//! tests can drive the loop with a [`ManualClock`] instead of real time.
//! [`PollPolicy`] carries the retry delay plus the optional attempt and
//! deadline limits; with neither limit set the loop polls until the
//! remote side reports a terminal state.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::{HalError, HalResult};

/// Default delay between status queries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Time source and sleep primitive used by poll loops.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that advances only when slept on.
///
/// Every call to [`Clock::sleep`] returns immediately, records the
/// requested duration and moves `now()` forward by it.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    /// Create a clock starting at the current instant.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Durations slept so far, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Total simulated time elapsed.
    pub fn elapsed(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}

/// How a runner waits for a remote job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    retry_delay: Duration,
    max_attempts: Option<u32>,
    deadline: Option<Duration>,
}

impl PollPolicy {
    /// Create a policy with the given delay between status queries.
    ///
    /// Returns a configuration error if the delay is zero.
    pub fn new(retry_delay: Duration) -> HalResult<Self> {
        if retry_delay.is_zero() {
            return Err(HalError::Configuration(format!(
                "The specified retry delay needs to be positive. Got {}.",
                retry_delay.as_secs_f64()
            )));
        }
        Ok(Self {
            retry_delay,
            max_attempts: None,
            deadline: None,
        })
    }

    /// Create a policy from a delay in seconds.
    pub fn from_secs_f64(secs: f64) -> HalResult<Self> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(HalError::Configuration(format!(
                "The specified retry delay needs to be positive. Got {secs}."
            )));
        }
        Self::new(positive_duration(secs, "retry delay")?)
    }

    /// Give up after `attempts` status queries.
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Give up once `deadline` has elapsed since submission.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Delay between status queries.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Attempt limit, if any.
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Deadline, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Whether another status query is allowed after `attempts` queries
    /// and `elapsed` time since submission.
    pub fn allows(&self, attempts: u32, elapsed: Duration) -> bool {
        if self.max_attempts.is_some_and(|max| attempts >= max) {
            return false;
        }
        if self.deadline.is_some_and(|d| elapsed >= d) {
            return false;
        }
        true
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
            deadline: None,
        }
    }
}

/// Convert seconds into a [`Duration`], rejecting values it cannot hold.
pub(crate) fn positive_duration(secs: f64, what: &str) -> HalResult<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| HalError::Configuration(format!("Invalid {what} of {secs} seconds: {e}")))
}
