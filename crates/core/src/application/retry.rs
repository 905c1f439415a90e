// Retry logic: bounded retries with jittered backoff for transient fetch failures
use super::constants::{DEFAULT_MAX_RETRIES, RETRY_BACKOFF};
use crate::port::{DelayRange, Pacer};
use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Pause for the backoff, then try again
    Retry,
    /// Give up and surface the last error
    Failed,
}

/// Retry policy shared by page fetches, detail fetches and browser navigation
///
/// `max_retries` counts retries after the first attempt, so a budget of 5 allows
/// 6 requests. Only errors accepted by the caller's predicate are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: DelayRange,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, RETRY_BACKOFF)
    }
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, backoff: DelayRange) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff(&self) -> DelayRange {
        self.backoff
    }

    /// Decide what follows a failed attempt (`attempt` is 0-based)
    pub fn should_retry(&self, attempt: u32, retryable: bool) -> RetryDecision {
        if retryable && attempt < self.max_retries {
            RetryDecision::Retry
        } else {
            RetryDecision::Failed
        }
    }

    /// Run `op` until it succeeds, fails permanently, or the budget is spent
    ///
    /// `op` receives the 0-based attempt number.
    pub async fn run<T, E, F, Fut>(
        &self,
        pacer: &dyn Pacer,
        is_retryable: impl Fn(&E) -> bool,
        mut op: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            let error = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            let retryable = is_retryable(&error);
            match self.should_retry(attempt, retryable) {
                RetryDecision::Retry => {
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %error,
                        "Transient failure, retrying after backoff"
                    );
                    pacer.pause(self.backoff).await;
                    attempt += 1;
                }
                RetryDecision::Failed => {
                    if retryable {
                        warn!(
                            attempts = attempt + 1,
                            error = %error,
                            "Max retry attempts reached"
                        );
                    }
                    return Err(error);
                }
            }
        }
    }
}
