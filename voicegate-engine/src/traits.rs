use async_trait::async_trait;
use thiserror::Error;
use voicegate_core::prompt::GenerationRequest;

/// Text-generation backend.
///
/// Implementations should decode greedily so that identical requests reproduce identical
/// output; the dialogue relies on that for recorded-fixture tests.
#[async_trait]
pub trait GenerationAdapter: Send + Sync {
    /// Returns the raw completion text, including any function-call markers.
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String>;
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no speech was recognized")]
    NoSpeech,

    #[error("speech recognition failed: {0}")]
    Recognition(String),

    #[error("input device error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// Waits for the next utterance. `Ok(None)` means the input has ended.
    async fn capture_utterance(&self) -> Result<Option<String>, CaptureError>;
}

#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speaks `text`, cutting off whatever is currently being spoken.
    async fn speak(&self, text: &str) -> anyhow::Result<()>;

    /// Stops the current utterance, if any. Safe to call repeatedly.
    fn cancel(&self);
}
