use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use voicegate_engine::traits::{CaptureError, SpeechInput, SpeechOutput};

/// Typed lines on stdin stand in for recognized speech.
pub struct StdinInput {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

#[async_trait::async_trait]
impl SpeechInput for StdinInput {
    async fn capture_utterance(&self) -> Result<Option<String>, CaptureError> {
        let mut lines = self.lines.lock().await;
        Ok(lines.next_line().await?)
    }
}

/// "Speaks" through the log so the screen only carries the conversation.
#[derive(Debug, Default)]
pub struct LoggedVoice;

#[async_trait::async_trait]
impl SpeechOutput for LoggedVoice {
    async fn speak(&self, text: &str) -> anyhow::Result<()> {
        log::info!("speak: {text}");
        Ok(())
    }

    // A log line completes as soon as it is written; there is nothing to cut off.
    fn cancel(&self) {}
}
