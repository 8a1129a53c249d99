use crate::policy::GenerationPolicy;
use crate::traits::GenerationAdapter;
use crate::turn::{TurnKind, TurnOutcome, ms};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use voicegate_core::call::parse_function_call;
use voicegate_core::messages::{
    GENERATION_FAILED, NO_LANGUAGE_FOUND, NO_PIN_FOUND, STATUS_PROCESSING_LANGUAGE,
    STATUS_PROCESSING_PIN,
};
use voicegate_core::prompt::build_generation_request;
use voicegate_core::rules::{self, RuleError};
use voicegate_core::tools::UnknownToolError;
use voicegate_core::types::{StageInfo, VerificationStage};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    UnknownTool(#[from] UnknownToolError),
}

/// The two-step verification conversation.
///
/// Owns the only mutable state of the flow. `handle_input` borrows it mutably, so a second
/// turn cannot start before the previous one has settled.
pub struct VerificationDialogue {
    stage: VerificationStage,
    last_user_input: Option<String>,
    adapter: Arc<dyn GenerationAdapter>,
    policy: GenerationPolicy,
}

impl VerificationDialogue {
    pub fn new(adapter: Arc<dyn GenerationAdapter>, policy: GenerationPolicy) -> Self {
        Self {
            stage: VerificationStage::default(),
            last_user_input: None,
            adapter,
            policy,
        }
    }

    pub fn stage(&self) -> VerificationStage {
        self.stage
    }

    pub fn stage_info(&self) -> StageInfo {
        self.stage.info()
    }

    pub fn last_user_input(&self) -> Option<&str> {
        self.last_user_input.as_deref()
    }

    pub async fn handle_input(&mut self, raw_user_text: &str) -> Result<TurnOutcome, EngineError> {
        self.handle_input_with_hook(raw_user_text, |_status| async {})
            .await
    }

    /// Same as `handle_input`, but reports a status line before the model is called.
    ///
    /// The hook is meant for UI progress and must be fast.
    pub async fn handle_input_with_hook<F, Fut>(
        &mut self,
        raw_user_text: &str,
        on_status: F,
    ) -> Result<TurnOutcome, EngineError>
    where
        F: Fn(&'static str) -> Fut,
        Fut: Future<Output = ()>,
    {
        let stage = self.stage;
        let Some(request) = build_generation_request(stage, raw_user_text)? else {
            log::info!("verification complete; ignoring input");
            return Ok(TurnOutcome::ignored(stage));
        };
        let expected = request.active_schema.name.clone();

        on_status(processing_status(stage)).await;

        let t0 = Instant::now();
        let generated = self.policy.run(self.adapter.as_ref(), &request).await;
        let generation_ms = ms(t0.elapsed());

        // Everything up to here leaves `self` untouched, so dropping this future mid-generation
        // is the same as never having received the input.
        self.last_user_input = Some(raw_user_text.to_string());

        let output = match generated {
            Ok(output) => output,
            Err(e) => {
                log::error!("generation failed at stage {}: {e}", stage.label());
                return Ok(
                    TurnOutcome::said(TurnKind::GenerationFailed, GENERATION_FAILED, stage, stage)
                        .with_generation_ms(generation_ms),
                );
            }
        };
        log::debug!("model output: {output}");

        let call = parse_function_call(&output, &expected);
        let result = match call.as_ref().map(rules::execute) {
            Some(Ok(result)) => result,
            Some(Err(RuleError::UnknownTool(e))) => return Err(e.into()),
            Some(Err(e @ RuleError::MissingArgument { .. })) => {
                log::warn!("{e}");
                return Ok(no_argument(stage)
                    .with_call(call)
                    .with_generation_ms(generation_ms));
            }
            None => return Ok(no_argument(stage).with_generation_ms(generation_ms)),
        };

        let next = if result.is_success() {
            stage.next()
        } else {
            stage
        };
        if next != stage {
            log::info!("verification stage: {:?} -> {:?}", stage, next);
            self.stage = next;
        }

        Ok(TurnOutcome::said(
            TurnKind::Validated(result.outcome),
            result.response_text,
            stage,
            next,
        )
        .with_call(call)
        .with_generation_ms(generation_ms))
    }
}

fn processing_status(stage: VerificationStage) -> &'static str {
    match stage {
        VerificationStage::LanguageVerification => STATUS_PROCESSING_LANGUAGE,
        _ => STATUS_PROCESSING_PIN,
    }
}

fn no_argument(stage: VerificationStage) -> TurnOutcome {
    let text = match stage {
        VerificationStage::LanguageVerification => NO_LANGUAGE_FOUND,
        _ => NO_PIN_FOUND,
    };
    TurnOutcome::said(TurnKind::NoArgument, text, stage, stage)
}
