//! Exponential backoff for node submission.
//!
//! A transaction is bound to one node at freeze time, so retries always go
//! back to that same node. [`RetryConfig`] decides how often and how long to
//! wait; [`RetryExecutor`] drives the loop.
//!
//! # Example
//!
//! ```rust
//! use hedera_rust_sdk::retry::RetryConfig;
//! use hedera_rust_sdk::HederaConfig;
//! use std::time::Duration;
//!
//! let retry = RetryConfig::builder()
//!     .max_retries(5)
//!     .initial_backoff(Duration::from_millis(100))
//!     .max_backoff(Duration::from_secs(4))
//!     .jitter(false)
//!     .build();
//!
//! let config = HederaConfig::testnet().with_retry(retry);
//! assert_eq!(config.retry_config().max_retries, 5);
//! ```

use crate::error::{HederaError, HederaResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// How a submission is retried against its node.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Resubmissions after the first attempt (0 = fail fast).
    pub max_retries: u32,
    /// Wait before the first resubmission.
    pub initial_backoff: Duration,
    /// Upper bound on any single wait.
    pub max_backoff: Duration,
    /// Growth factor of the wait per attempt.
    pub multiplier: f64,
    /// Whether to randomize each wait.
    pub jitter: bool,
    /// Fraction of the wait that jitter may add or remove (0.0 to 1.0).
    pub jitter_factor: f64,
    /// Gateway HTTP statuses treated as a transient node failure.
    pub retryable_http_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(8),
            multiplier: 2.0,
            jitter: true,
            jitter_factor: 0.5,
            // timeout, rate limit, 5xx
            retryable_http_statuses: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Starts from the defaults.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder {
            config: Self::default(),
        }
    }

    /// One attempt, no resubmission.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Many short waits; suited to a local node.
    pub fn aggressive() -> Self {
        Self {
            max_retries: 6,
            initial_backoff: Duration::from_millis(50),
            max_backoff: Duration::from_secs(2),
            multiplier: 1.5,
            jitter_factor: 0.3,
            ..Default::default()
        }
    }

    /// Few long waits; suited to mainnet.
    pub fn conservative() -> Self {
        Self {
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            ..Default::default()
        }
    }

    /// The wait before resubmission number `retry` (1-based). Zero for 0.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let wait = self
            .initial_backoff
            .mul_f64(self.multiplier.max(1.0).powi(exponent).min(f64::from(u32::MAX)))
            .min(self.max_backoff);

        if !self.jitter {
            return wait;
        }
        // Uniform in [1 - factor, 1 + factor].
        let spread = self.jitter_factor.clamp(0.0, 1.0);
        let scale = 1.0 + spread * (2.0 * rand::random::<f64>() - 1.0);
        wait.mul_f64(scale)
    }

    /// True for transport failures worth resubmitting: connection errors,
    /// timeouts and the configured gateway statuses.
    ///
    /// Precheck statuses are classified separately by
    /// [`ResponseStatus::class`](crate::status::ResponseStatus::class).
    pub fn is_retryable_error(&self, error: &HederaError) -> bool {
        match error {
            HederaError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            HederaError::Channel { .. } => true,
            HederaError::Api { status_code, .. } => {
                self.retryable_http_statuses.contains(status_code)
            }
            _ => false,
        }
    }
}

/// Adjusts a [`RetryConfig`] field by field.
#[derive(Debug, Clone)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    /// Sets the number of resubmissions.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Sets the first wait.
    pub fn initial_backoff(mut self, backoff: Duration) -> Self {
        self.config.initial_backoff = backoff;
        self
    }

    /// Sets the longest wait.
    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.config.max_backoff = backoff;
        self
    }

    /// Sets the growth factor.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.config.multiplier = multiplier;
        self
    }

    /// Enables or disables jitter.
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.config.jitter = jitter;
        self
    }

    /// Sets the jitter factor, clamped to 0.0..=1.0.
    pub fn jitter_factor(mut self, factor: f64) -> Self {
        self.config.jitter_factor = factor.clamp(0.0, 1.0);
        self
    }

    /// Replaces the gateway statuses that count as transient.
    pub fn retryable_http_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.config.retryable_http_statuses = statuses;
        self
    }

    /// Finishes the config.
    pub fn build(self) -> RetryConfig {
        self.config
    }
}

/// Runs an attempt repeatedly until it succeeds, fails for good or the
/// budget is spent.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Creates an executor following `config`.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the config.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Retries transport errors the config considers transient.
    pub async fn execute<F, Fut, T>(&self, attempt: F) -> HederaResult<T>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = HederaResult<T>>,
    {
        self.execute_with_predicate(attempt, |error| self.config.is_retryable_error(error))
            .await
    }

    /// Retries every error for which `should_retry` holds.
    ///
    /// `attempt` receives the 1-based attempt number and runs at most
    /// `max_retries + 1` times. Once the budget is spent the last error is
    /// returned unchanged.
    pub async fn execute_with_predicate<F, Fut, T, P>(
        &self,
        attempt: F,
        should_retry: P,
    ) -> HederaResult<T>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = HederaResult<T>>,
        P: Fn(&HederaError) -> bool,
    {
        let mut number = 1;
        loop {
            let error = match attempt(number).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            if number > self.config.max_retries || !should_retry(&error) {
                return Err(error);
            }

            let wait = self.config.backoff(number);
            debug!(
                attempt = number,
                wait_ms = wait.as_millis() as u64,
                error = %error.sanitized_message(),
                "attempt failed, backing off"
            );
            sleep(wait).await;
            number += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ResponseStatus;
    use crate::types::{AccountId, Timestamp, TransactionId};
    use parking_lot::Mutex;
    use tokio::time::Instant;

    fn fixed(max_retries: u32) -> RetryConfig {
        RetryConfig::builder()
            .max_retries(max_retries)
            .initial_backoff(Duration::from_millis(100))
            .max_backoff(Duration::from_secs(1))
            .jitter(false)
            .build()
    }

    fn busy(attempts: u32) -> HederaError {
        HederaError::NodeUnavailable {
            node: AccountId::from_num(3),
            transaction_id: TransactionId::new(AccountId::from_num(2), Timestamp::new(1, 0)),
            attempts,
            last_status: Some(ResponseStatus::Busy),
        }
    }

    #[test]
    fn test_presets() {
        assert_eq!(RetryConfig::default().max_retries, 3);
        assert_eq!(RetryConfig::no_retry().max_retries, 0);
        assert!(RetryConfig::aggressive().initial_backoff < RetryConfig::default().initial_backoff);
        assert_eq!(
            RetryConfig::conservative().max_backoff,
            Duration::from_secs(30)
        );
        let clamped = RetryConfig::builder().jitter_factor(4.0).build();
        assert!((clamped.jitter_factor - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let config = fixed(10);
        let waits: Vec<_> = (0..6).map(|n| config.backoff(n).as_millis()).collect();
        assert_eq!(waits, vec![0, 100, 200, 400, 800, 1_000]);
        assert_eq!(config.backoff(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn test_jittered_backoff_stays_in_band() {
        let config = RetryConfig::builder()
            .initial_backoff(Duration::from_secs(1))
            .jitter_factor(0.5)
            .build();
        for _ in 0..50 {
            let wait = config.backoff(1);
            assert!(wait >= Duration::from_millis(500));
            assert!(wait <= Duration::from_millis(1_500));
        }
    }

    #[test]
    fn test_transient_transport_errors() {
        let config = RetryConfig::default();
        assert!(config.is_retryable_error(&HederaError::api(503, "unavailable")));
        assert!(!config.is_retryable_error(&HederaError::api(400, "bad request")));
        assert!(config.is_retryable_error(&HederaError::channel(AccountId::from_num(3), "reset")));
        assert!(!config.is_retryable_error(&HederaError::NotFrozen));

        let strict = RetryConfig::builder().retryable_http_statuses(vec![]).build();
        assert!(!strict.is_retryable_error(&HederaError::api(503, "unavailable")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_numbers_and_waits() {
        let executor = RetryExecutor::new(fixed(3));
        let seen = Mutex::new(Vec::new());
        let start = Instant::now();

        let result = executor
            .execute_with_predicate(
                |n| {
                    seen.lock().push(n);
                    async move {
                        if n < 3 {
                            Err(busy(n))
                        } else {
                            Ok(n)
                        }
                    }
                },
                |err| matches!(err, HederaError::NodeUnavailable { .. }),
            )
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhausted_returns_last_error() {
        let executor = RetryExecutor::new(fixed(2));
        let result: HederaResult<()> = executor
            .execute_with_predicate(|n| async move { Err(busy(n)) }, |_| true)
            .await;

        assert!(matches!(
            result,
            Err(HederaError::NodeUnavailable { attempts: 3, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let executor = RetryExecutor::new(fixed(5));
        let calls = Mutex::new(0);
        let start = Instant::now();

        let result: HederaResult<()> = executor
            .execute(|_| {
                *calls.lock() += 1;
                async { Err(HederaError::api(400, "bad request")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*calls.lock(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_config_makes_one_attempt() {
        let executor = RetryExecutor::new(RetryConfig::no_retry());
        let calls = Mutex::new(0);
        let result: HederaResult<()> = executor
            .execute(|_| {
                *calls.lock() += 1;
                async { Err(HederaError::api(503, "unavailable")) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(*calls.lock(), 1);
    }
}
