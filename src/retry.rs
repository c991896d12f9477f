//! Caller-side retry policy. The pipeline itself never retries; callers opt in here.

use std::time::Duration;

use crate::classify::ClassifiedError;
use crate::pipeline::Pipeline;
use crate::request::FeatureRequest;
use crate::results::ValidatedResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 200,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Exponential backoff: base * 2^attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(1u64 << attempt.min(16)))
    }

    /// Re-issue the whole request while the failure is retryable and attempts remain.
    pub async fn run(
        &self,
        pipeline: &Pipeline,
        request: &FeatureRequest,
    ) -> Result<ValidatedResult, ClassifiedError> {
        let mut attempt = 0;
        loop {
            match pipeline.run(request).await {
                Ok(result) => return Ok(result),
                Err(err) if err.retryable && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    tracing::info!(
                        "{} is retryable; attempt {} of {} in {}ms",
                        err.kind,
                        attempt + 2,
                        self.max_retries + 1,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
