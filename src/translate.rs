//! # Best-Effort Translation
//!
//! Imported recipes may be translated before parsing. The translation
//! service is external and unreliable, so every call goes through
//! [`ResilientTranslator`]:
//!
//! - each attempt is bounded by a timeout
//! - failed attempts are retried with exponential backoff plus random jitter
//! - repeated failures open a [`CircuitBreaker`] that fails fast until it resets
//!
//! Translation never blocks an import: [`ResilientTranslator::translate_or_original`]
//! hands back the input text on any failure.

use async_trait::async_trait;
use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout, Instant};

/// Errors a translation attempt can end with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("Translation failed: {0}")]
    Failed(String),

    #[error("Translation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Translation circuit breaker is open")]
    CircuitOpen,
}

/// A `translate(text) -> text` capability.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &str;

    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// Recovery configuration for translation calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Maximum number of retry attempts after the first call
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single call in seconds
    pub operation_timeout_secs: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_retry_delay_ms: 1000,  // 1 second
            max_retry_delay_ms: 10000,  // 10 seconds
            operation_timeout_secs: 30, // 30 seconds
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
        }
    }
}

impl RecoveryConfig {
    /// Backoff before retry number `attempt` (1-based), without jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self
            .base_retry_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_retry_delay_ms);
        Duration::from_millis(delay)
    }
}

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker for translation calls
///
/// # State Machine
///
/// - **Closed**: Normal operation, requests pass through
/// - **Open**: Failure threshold exceeded, requests fail fast
/// - **Reset**: After `circuit_breaker_reset_secs` the next request is let through
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: RecoveryConfig,
}

impl CircuitBreaker {
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether requests are currently blocked.
    ///
    /// Resets to closed once the reset timeout has elapsed.
    pub fn is_open(&self) -> bool {
        let mut state = self.lock();
        if state.failure_count < self.config.circuit_breaker_threshold {
            return false;
        }

        if let Some(last_time) = state.last_failure {
            if last_time.elapsed() < Duration::from_secs(self.config.circuit_breaker_reset_secs) {
                return true; // Circuit is still open
            }
        }

        info!("Circuit breaker reset after cool-down");
        *state = BreakerState::default();
        false
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.failure_count += 1;
        state.last_failure = Some(Instant::now());
        if state.failure_count == self.config.circuit_breaker_threshold {
            warn!(
                "Circuit breaker opened after {} consecutive failures",
                state.failure_count
            );
        }
    }

    pub fn record_success(&self) {
        *self.lock() = BreakerState::default();
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }
}

/// Wraps a [`Translator`] with timeout, retry and circuit breaking.
pub struct ResilientTranslator<T: ?Sized> {
    config: RecoveryConfig,
    breaker: CircuitBreaker,
    inner: Box<T>,
}

impl<T: Translator + ?Sized> ResilientTranslator<T> {
    pub fn new(inner: Box<T>, config: RecoveryConfig) -> Self {
        Self {
            breaker: CircuitBreaker::new(config.clone()),
            config,
            inner,
        }
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Translate with retries, reporting the final error.
    pub async fn try_translate(&self, text: &str) -> Result<String, TranslateError> {
        if self.breaker.is_open() {
            debug!("Skipping '{}' translation: circuit open", self.inner.name());
            return Err(TranslateError::CircuitOpen);
        }

        let limit = Duration::from_secs(self.config.operation_timeout_secs);
        let mut last_error = TranslateError::Failed("no attempt made".to_string());

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let base = self.config.backoff_delay(attempt);
                let jitter_cap = (base.as_millis() as u64 / 4).max(1);
                let jitter = rand::thread_rng().gen_range(0..jitter_cap);
                let delay = base + Duration::from_millis(jitter);
                debug!(
                    "Retrying '{}' translation in {:?} (attempt {}/{})",
                    self.inner.name(),
                    delay,
                    attempt + 1,
                    self.config.max_retries + 1
                );
                sleep(delay).await;
            }

            let result = match timeout(limit, self.inner.translate(text)).await {
                Ok(result) => result,
                Err(_) => Err(TranslateError::Timeout(limit)),
            };

            match result {
                Ok(translated) => {
                    self.breaker.record_success();
                    return Ok(translated);
                }
                Err(e) => {
                    warn!("Translation with '{}' failed: {}", self.inner.name(), e);
                    self.breaker.record_failure();
                    last_error = e;
                    if self.breaker.is_open() {
                        return Err(TranslateError::CircuitOpen);
                    }
                }
            }
        }

        Err(last_error)
    }

    /// Translate, falling back to the original text on any failure.
    pub async fn translate_or_original(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        match self.try_translate(text).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("Keeping original text after translation error: {}", e);
                text.to_string()
            }
        }
    }
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for ResilientTranslator<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        self.try_translate(text).await
    }
}
