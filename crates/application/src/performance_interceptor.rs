use std::future::Future;
use std::time::{Duration, Instant};

use bazaar_core::AppResult;
use tracing::{info, warn};

/// Measures wall-clock duration of wrapped calls and emits it as a log line.
#[derive(Debug, Clone, Default)]
pub struct PerformanceInterceptor {
    slow_threshold: Option<Duration>,
}

impl PerformanceInterceptor {
    /// Creates an interceptor that emits every timing at `info`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits timings at or above `threshold` at `warn` instead of `info`.
    #[must_use]
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = Some(threshold);
        self
    }

    /// Times any call.
    pub async fn time<T, F, Fut>(&self, operation: &str, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let (value, elapsed) = measure(call).await;
        self.emit(operation, elapsed, "completed");
        value
    }

    /// Times a fallible call, labelling the outcome.
    ///
    /// The timing is emitted before an error is handed back to the caller.
    pub async fn time_result<T, F, Fut>(&self, operation: &str, call: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let (outcome, elapsed) = measure(call).await;
        let label = if outcome.is_ok() { "success" } else { "failure" };
        self.emit(operation, elapsed, label);
        outcome
    }

    fn emit(&self, operation: &str, elapsed: Duration, outcome: &str) {
        let elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let elapsed_ms = elapsed.as_secs_f64() * 1_000.0;

        if self.is_slow(elapsed) {
            warn!(
                target: "bazaar::performance",
                operation,
                outcome,
                elapsed_ms,
                elapsed_us,
                "slow operation"
            );
        } else {
            info!(
                target: "bazaar::performance",
                operation,
                outcome,
                elapsed_ms,
                elapsed_us,
                "operation timed"
            );
        }
    }

    fn is_slow(&self, elapsed: Duration) -> bool {
        self.slow_threshold
            .is_some_and(|threshold| elapsed >= threshold)
    }
}

async fn measure<T, F, Fut>(call: F) -> (T, Duration)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let started = Instant::now();
    let value = call().await;
    (value, started.elapsed())
}
