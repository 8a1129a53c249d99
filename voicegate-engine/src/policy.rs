use crate::traits::GenerationAdapter;
use std::time::Duration;
use thiserror::Error;
use voicegate_core::config::GenerationPolicyConfig;
use voicegate_core::prompt::GenerationRequest;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation failed: {0:#}")]
    Adapter(anyhow::Error),
}

/// Bounded timeout plus a small number of retries with exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self::from(&GenerationPolicyConfig::default())
    }
}

impl From<&GenerationPolicyConfig> for GenerationPolicy {
    fn from(cfg: &GenerationPolicyConfig) -> Self {
        Self {
            timeout: Duration::from_millis(cfg.timeout_ms),
            max_retries: cfg.max_retries,
            backoff: Duration::from_millis(cfg.retry_backoff_ms),
        }
    }
}

impl GenerationPolicy {
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1 << attempt.min(16))
    }

    pub async fn run(
        &self,
        adapter: &dyn GenerationAdapter,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let mut attempt = 0;
        loop {
            let err = match tokio::time::timeout(self.timeout, adapter.generate(request)).await {
                Ok(Ok(text)) => return Ok(text),
                Ok(Err(e)) => GenerationError::Adapter(e),
                Err(_) => GenerationError::Timeout(self.timeout),
            };

            if attempt >= self.max_retries {
                return Err(err);
            }
            let wait = self.backoff_for(attempt);
            log::warn!(
                "generation attempt {} failed, retrying in {wait:?}: {err}",
                attempt + 1
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}
