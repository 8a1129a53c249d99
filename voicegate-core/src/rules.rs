use crate::call::{ArgValue, ParsedCall};
use crate::messages::{LANGUAGE_ACCEPTED, LANGUAGE_REJECTED, PIN_ACCEPTED, PIN_REJECTED};
use crate::tools::{CHECK_LANGUAGE, CHECK_PIN, UnknownToolError, get_schema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const EXPECTED_PIN: &str = "7979";
const SUPPORTED_LANGUAGE: &str = "spanish";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    Success,
    Failure,
}

/// Result of running a validation rule.
///
/// `outcome` drives stage transitions; `response_text` is only ever shown/spoken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub response_text: String,
    pub outcome: ValidationOutcome,
}

impl ValidationResult {
    fn success(text: &str) -> Self {
        Self {
            response_text: text.to_string(),
            outcome: ValidationOutcome::Success,
        }
    }

    fn failure(text: &str) -> Self {
        Self {
            response_text: text.to_string(),
            outcome: ValidationOutcome::Failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == ValidationOutcome::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error(transparent)]
    UnknownTool(#[from] UnknownToolError),

    #[error("{tool}: missing required argument `{argument}`")]
    MissingArgument { tool: String, argument: String },
}

/// Exact comparison; no trimming or normalization.
pub fn check_pin(pin: &str) -> ValidationResult {
    log::info!("check_pin called with: {pin}");
    if pin == EXPECTED_PIN {
        ValidationResult::success(PIN_ACCEPTED)
    } else {
        ValidationResult::failure(PIN_REJECTED)
    }
}

/// Case- and surrounding-whitespace-insensitive.
pub fn check_language(language: &str) -> ValidationResult {
    log::info!("check_language called with: {language:?}");
    if language.trim().to_lowercase() == SUPPORTED_LANGUAGE {
        ValidationResult::success(LANGUAGE_ACCEPTED)
    } else {
        ValidationResult::failure(LANGUAGE_REJECTED)
    }
}

/// Runs the rule named by `call`, after checking its required arguments are present.
///
/// Both parameters are strings; a bare number or boolean (`{pin:7979}`) fails the rule
/// rather than being coerced.
pub fn execute(call: &ParsedCall) -> Result<ValidationResult, RuleError> {
    let schema = get_schema(&call.function_name)?;
    let required = |name: &str| {
        call.argument(name).ok_or_else(|| RuleError::MissingArgument {
            tool: schema.name.clone(),
            argument: name.to_string(),
        })
    };
    for param in schema.required_parameters() {
        required(param.name.as_str())?;
    }

    match call.function_name.as_str() {
        CHECK_PIN => Ok(match required("pin")? {
            ArgValue::Text(pin) => check_pin(pin),
            other => {
                log::info!("check_pin called with non-string value: {other}");
                ValidationResult::failure(PIN_REJECTED)
            }
        }),
        CHECK_LANGUAGE => Ok(match required("language")? {
            ArgValue::Text(language) => check_language(language),
            other => {
                log::info!("check_language called with non-string value: {other}");
                ValidationResult::failure(LANGUAGE_REJECTED)
            }
        }),
        other => Err(UnknownToolError(other.to_string()).into()),
    }
}
