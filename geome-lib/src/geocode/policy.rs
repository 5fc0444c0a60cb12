use std::{
    cell::Cell,
    thread,
    time::{Duration, Instant},
};

use slog::{warn, Logger};

use super::Error;

/// How often and how patiently a failed lookup is retried.
///
/// Only transient failures (see [`Error::is_transient`]) are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Pause after the given failed attempt, counting from 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .checked_pow(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(Duration::MAX)
    }

    pub fn run<T>(
        &self,
        logger: &Logger,
        mut op: impl FnMut() -> Result<T, Error>,
        mut sleep: impl FnMut(Duration),
    ) -> Result<T, Error> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(logger, "geocoding attempt failed, retrying";
                        "attempt" => attempt,
                        "delay_ms" => delay.as_millis() as u64,
                        "error" => %e);
                    sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Keeps consecutive requests at least `min_interval` apart.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last: Cell<Option<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        // public Nominatim allows one request per second
        Self::new(Duration::from_secs(1))
    }
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: Cell::new(None),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// How long a request issued at `now` has to wait.
    pub fn delay(&self, now: Instant) -> Duration {
        match self.last.get() {
            Some(last) => self
                .min_interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    pub fn record(&self, at: Instant) {
        self.last.set(Some(at));
    }

    /// Blocks until a request may go out and marks it as sent.
    pub fn wait(&self) {
        let delay = self.delay(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.record(Instant::now());
    }
}
