use serde::{Deserialize, Serialize};
use std::time::Duration;
use voicegate_core::call::ParsedCall;
use voicegate_core::messages::{INPUT_IGNORED, STATUS_COMPLETE, STATUS_READY};
use voicegate_core::rules::ValidationOutcome;
use voicegate_core::types::VerificationStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnKind {
    /// A call was extracted and its rule ran.
    Validated(ValidationOutcome),
    /// The model produced no usable call for this stage.
    NoArgument,
    /// The generation backend failed or timed out.
    GenerationFailed,
    /// Verification was already complete.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TurnTimings {
    pub generation_ms: Option<u64>,
}

/// What a shell should show and say after one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub kind: TurnKind,
    pub display_text: String,
    // `None` when nothing should be spoken.
    pub spoken_text: Option<String>,
    pub previous_stage: VerificationStage,
    pub stage: VerificationStage,
    pub status: String,
    pub call: Option<ParsedCall>,
    pub timings: TurnTimings,
}

impl TurnOutcome {
    /// Text shown and spoken identically.
    pub(crate) fn said(
        kind: TurnKind,
        text: impl Into<String>,
        previous_stage: VerificationStage,
        stage: VerificationStage,
    ) -> Self {
        let text = text.into();
        Self {
            kind,
            display_text: text.clone(),
            spoken_text: Some(text),
            previous_stage,
            stage,
            status: status_for(stage).into(),
            call: None,
            timings: TurnTimings::default(),
        }
    }

    pub(crate) fn ignored(stage: VerificationStage) -> Self {
        Self {
            kind: TurnKind::Ignored,
            display_text: INPUT_IGNORED.into(),
            spoken_text: None,
            previous_stage: stage,
            stage,
            status: status_for(stage).into(),
            call: None,
            timings: TurnTimings::default(),
        }
    }

    pub(crate) fn with_call(mut self, call: Option<ParsedCall>) -> Self {
        self.call = call;
        self
    }

    pub(crate) fn with_generation_ms(mut self, generation_ms: u64) -> Self {
        self.timings.generation_ms = Some(generation_ms);
        self
    }

    pub fn advanced(&self) -> bool {
        self.stage != self.previous_stage
    }
}

pub fn status_for(stage: VerificationStage) -> &'static str {
    if stage.is_terminal() {
        STATUS_COMPLETE
    } else {
        STATUS_READY
    }
}

pub fn ms(d: Duration) -> u64 {
    d.as_millis().try_into().unwrap_or(u64::MAX)
}
