use crate::tools::{ToolSchema, UnknownToolError, get_schema, tool_name_for_stage};
use crate::types::VerificationStage;
use serde::{Deserialize, Serialize};

const PIN_INSTRUCTION: &str = "You are a model that can do function calling with the following functions. Extract the PIN number from the user's input.
Example Session:
User: PIN is 7979
Model: <start_function_call>call:check_pin{pin:<escape>7979<escape>}<end_function_call>";

const LANGUAGE_INSTRUCTION: &str = "You are a model that can do function calling with the following functions. Extract the language name from the user's input.
Example Session:
User: I choose Spanish
Model: <start_function_call>call:check_language{language:<escape>Spanish<escape>}<end_function_call>";

/// Everything sent to the generation backend for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Developer/system instruction, including one worked example call.
    pub instruction: String,
    /// The user turn, already framed with the extraction ask.
    pub user_utterance: String,
    pub active_schema: ToolSchema,
}

/// Builds the request for `stage`; `None` once verification is complete.
pub fn build_generation_request(
    stage: VerificationStage,
    user_text: &str,
) -> Result<Option<GenerationRequest>, UnknownToolError> {
    let Some(tool) = tool_name_for_stage(stage) else {
        return Ok(None);
    };
    let schema = get_schema(tool)?;

    let (instruction, ask) = match stage {
        VerificationStage::PinVerification => (PIN_INSTRUCTION, "Extract the PIN number."),
        VerificationStage::LanguageVerification => {
            (LANGUAGE_INSTRUCTION, "Extract the language name.")
        }
        VerificationStage::Complete => return Ok(None),
    };

    Ok(Some(GenerationRequest {
        instruction: instruction.to_string(),
        user_utterance: format!("User said: \"{user_text}\". {ask}"),
        active_schema: schema.clone(),
    }))
}
