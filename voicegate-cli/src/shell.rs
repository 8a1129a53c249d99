use std::io::Write;

use anyhow::Context;
use voicegate_core::messages::{CAPTURE_FAILED, GREETING, echo_user_input};
use voicegate_core::types::{StageInfo, VerificationStage};
use voicegate_engine::dialogue::VerificationDialogue;
use voicegate_engine::traits::{CaptureError, SpeechInput, SpeechOutput};

/// Consecutive input-device failures after which the shell gives up.
const MAX_DEVICE_ERRORS: u32 = 3;

fn show_stage(screen: &mut impl Write, info: StageInfo) -> anyhow::Result<()> {
    writeln!(screen, "== {} | {}", info.title, info.expected_action).context("write to screen")
}

fn show(screen: &mut impl Write, text: &str) -> anyhow::Result<()> {
    writeln!(screen, "{text}").context("write to screen")
}

async fn say(voice: &dyn SpeechOutput, text: &str) {
    // Speech is best-effort; the text is always on screen too.
    if let Err(e) = voice.speak(text).await {
        log::warn!("speech output failed: {e:#}");
    }
}

/// Runs turns until verification completes or input ends. Returns the final stage.
pub async fn run_shell(
    dialogue: &mut VerificationDialogue,
    input: &dyn SpeechInput,
    voice: &dyn SpeechOutput,
    screen: &mut impl Write,
) -> anyhow::Result<VerificationStage> {
    show_stage(screen, dialogue.stage_info())?;
    say(voice, GREETING).await;

    let mut device_errors = 0;
    while dialogue.stage_info().accepts_input {
        let utterance = match input.capture_utterance().await {
            Ok(Some(text)) => text,
            Ok(None) => break,
            Err(e) => {
                log::error!("speech recognition error: {e}");
                if matches!(e, CaptureError::Io(_)) {
                    device_errors += 1;
                    if device_errors >= MAX_DEVICE_ERRORS {
                        log::error!("input device keeps failing; stopping");
                        break;
                    }
                }
                show(screen, CAPTURE_FAILED)?;
                say(voice, CAPTURE_FAILED).await;
                continue;
            }
        };
        device_errors = 0;
        let utterance = utterance.trim();
        if utterance.is_empty() {
            continue;
        }

        log::info!("user input: {utterance}");
        show(screen, &echo_user_input(utterance))?;

        let turn = dialogue.handle_input(utterance).await?;
        show(screen, &turn.display_text)?;
        if let Some(spoken) = turn.spoken_text.as_deref() {
            say(voice, spoken).await;
        }
        if turn.advanced() {
            show_stage(screen, turn.stage.info())?;
        }
        log::debug!("status: {}", turn.status);
    }

    voice.cancel();
    Ok(dialogue.stage())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use voicegate_core::messages::{LANGUAGE_ACCEPTED, NO_PIN_FOUND, PIN_ACCEPTED};
    use voicegate_core::prompt::GenerationRequest;
    use voicegate_engine::policy::GenerationPolicy;
    use voicegate_engine::traits::GenerationAdapter;

    struct ScriptedInput(Mutex<VecDeque<Result<Option<String>, CaptureError>>>);

    impl ScriptedInput {
        fn new(items: Vec<Result<Option<&str>, CaptureError>>) -> Self {
            Self(Mutex::new(
                items
                    .into_iter()
                    .map(|r| r.map(|o| o.map(String::from)))
                    .collect(),
            ))
        }
    }

    #[async_trait::async_trait]
    impl SpeechInput for ScriptedInput {
        async fn capture_utterance(&self) -> Result<Option<String>, CaptureError> {
            self.0.lock().unwrap().pop_front().unwrap_or(Ok(None))
        }
    }

    #[derive(Default)]
    struct RecordingVoice {
        spoken: Mutex<Vec<String>>,
        cancels: Mutex<u32>,
    }

    #[async_trait::async_trait]
    impl SpeechOutput for RecordingVoice {
        async fn speak(&self, text: &str) -> anyhow::Result<()> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn cancel(&self) {
            *self.cancels.lock().unwrap() += 1;
        }
    }

    struct KeywordModel {
        calls: Arc<Mutex<u32>>,
    }

    #[async_trait::async_trait]
    impl GenerationAdapter for KeywordModel {
        async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
            *self.calls.lock().unwrap() += 1;
            let u = &request.user_utterance;
            Ok(if u.contains("7979") {
                "<start_function_call>call:check_pin{pin:<escape>7979<escape>}<end_function_call>"
                    .into()
            } else if u.contains("Spanish") {
                "<start_function_call>call:check_language{language:<escape>Spanish<escape>}<end_function_call>"
                    .into()
            } else {
                "I am not sure.".into()
            })
        }
    }

    fn dialogue() -> (VerificationDialogue, Arc<Mutex<u32>>) {
        let calls = Arc::new(Mutex::new(0));
        let model = KeywordModel {
            calls: calls.clone(),
        };
        (
            VerificationDialogue::new(Arc::new(model), GenerationPolicy::default()),
            calls,
        )
    }

    #[tokio::test]
    async fn walks_through_both_steps() {
        let (mut d, calls) = dialogue();
        let input = ScriptedInput::new(vec![
            Ok(Some("   ")),
            Err(CaptureError::NoSpeech),
            Ok(Some("umm")),
            Ok(Some(" my pin is 7979 ")),
            Ok(Some("Spanish")),
            Ok(Some("never read")),
        ]);
        let voice = RecordingVoice::default();
        let mut screen = Vec::new();

        let stage = run_shell(&mut d, &input, &voice, &mut screen).await.unwrap();
        assert_eq!(stage, VerificationStage::Complete);
        // Blank input and capture errors never reach the model.
        assert_eq!(*calls.lock().unwrap(), 3);
        // Stops reading once complete.
        assert_eq!(input.0.lock().unwrap().len(), 1);

        let spoken = voice.spoken.lock().unwrap().clone();
        assert_eq!(
            spoken,
            vec![
                GREETING.to_string(),
                CAPTURE_FAILED.to_string(),
                NO_PIN_FOUND.to_string(),
                PIN_ACCEPTED.to_string(),
                LANGUAGE_ACCEPTED.to_string(),
            ]
        );
        assert_eq!(*voice.cancels.lock().unwrap(), 1);

        let screen = String::from_utf8(screen).unwrap();
        assert!(screen.starts_with("== PIN Verification | Speak a 4-digit PIN\n"));
        assert!(screen.contains("You said: \"my pin is 7979\"\n"));
        assert!(screen.contains("== Language Verification | Say \"Spanish\"\n"));
        assert!(screen.ends_with("== Complete | Access granted\n"));
    }

    fn device_error() -> Result<Option<&'static str>, CaptureError> {
        Err(CaptureError::Io(std::io::Error::other("bad fd")))
    }

    #[tokio::test]
    async fn repeated_device_errors_end_the_session() {
        let (mut d, calls) = dialogue();
        let input = ScriptedInput::new(vec![
            device_error(),
            device_error(),
            device_error(),
            Ok(Some("My pin is 7979")),
        ]);
        let voice = RecordingVoice::default();
        let mut screen = Vec::new();

        let stage = run_shell(&mut d, &input, &voice, &mut screen).await.unwrap();
        assert_eq!(stage, VerificationStage::PinVerification);
        assert_eq!(*calls.lock().unwrap(), 0);
        assert_eq!(input.0.lock().unwrap().len(), 1);
        // Two retry prompts; the third failure stops the loop.
        let spoken = voice.spoken.lock().unwrap().clone();
        assert_eq!(spoken, vec![GREETING, CAPTURE_FAILED, CAPTURE_FAILED]);
    }

    #[tokio::test]
    async fn occasional_device_errors_are_retried() {
        let (mut d, _) = dialogue();
        let input = ScriptedInput::new(vec![
            device_error(),
            device_error(),
            Ok(Some("My pin is 7979")),
            device_error(),
            device_error(),
            Ok(Some("Spanish")),
        ]);
        let voice = RecordingVoice::default();
        let mut screen = Vec::new();

        let stage = run_shell(&mut d, &input, &voice, &mut screen).await.unwrap();
        assert_eq!(stage, VerificationStage::Complete);
    }

    #[tokio::test]
    async fn end_of_input_keeps_current_stage() {
        let (mut d, _) = dialogue();
        let input = ScriptedInput::new(vec![Ok(Some("My pin is 7979"))]);
        let voice = RecordingVoice::default();
        let mut screen = Vec::new();

        let stage = run_shell(&mut d, &input, &voice, &mut screen).await.unwrap();
        assert_eq!(stage, VerificationStage::LanguageVerification);
    }
}
