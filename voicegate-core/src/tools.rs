use crate::types::VerificationStage;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::OnceLock;
use thiserror::Error;

pub const CHECK_PIN: &str = "check_pin";
pub const CHECK_LANGUAGE: &str = "check_language";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool: {0}")]
pub struct UnknownToolError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    // Always "string" for the verification tools.
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolReturn {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
    pub returns: ToolReturn,
}

impl ToolSchema {
    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }

    /// Renders the schema in the OpenAI `{"type":"function","function":{..}}` tool shape.
    pub fn to_openai_tool(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.parameters {
            properties.insert(
                p.name.clone(),
                json!({"type": p.kind, "description": p.description}),
            );
        }
        let required: Vec<&str> = self.required_parameters().map(|p| p.name.as_str()).collect();

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                },
                "return": {
                    "type": self.returns.kind,
                    "description": self.returns.description,
                },
            }
        })
    }
}

fn string_param(name: &str, description: &str) -> ToolParameter {
    ToolParameter {
        name: name.into(),
        kind: "string".into(),
        description: description.into(),
        required: true,
    }
}

fn registry() -> &'static [ToolSchema] {
    static TOOLS: OnceLock<Vec<ToolSchema>> = OnceLock::new();
    TOOLS.get_or_init(|| {
        vec![
            ToolSchema {
                name: CHECK_PIN.into(),
                description:
                    "Check if the provided PIN is correct. The PIN usually is a 4-digit number."
                        .into(),
                parameters: vec![string_param(
                    "pin",
                    "The PIN number (consisting of digits) to verify",
                )],
                returns: ToolReturn {
                    kind: "string".into(),
                    description: "Returns 'Please choose the language' if PIN is correct (7979), otherwise 'PIN is incorrect. Try again'".into(),
                },
            },
            ToolSchema {
                name: CHECK_LANGUAGE.into(),
                description: "Check if the provided language is supported.".into(),
                parameters: vec![string_param(
                    "language",
                    "The name of the language to verify",
                )],
                returns: ToolReturn {
                    kind: "string".into(),
                    description: "Returns 'Now I will connect to the interpreter' if language is Spanish, otherwise 'Please choose another language'".into(),
                },
            },
        ]
    })
}

pub fn all_schemas() -> &'static [ToolSchema] {
    registry()
}

pub fn get_schema(name: &str) -> Result<&'static ToolSchema, UnknownToolError> {
    registry()
        .iter()
        .find(|t| t.name == name)
        .ok_or_else(|| UnknownToolError(name.to_string()))
}

/// The single tool offered to the model in `stage`; `None` once verification is complete.
pub fn tool_name_for_stage(stage: VerificationStage) -> Option<&'static str> {
    match stage {
        VerificationStage::PinVerification => Some(CHECK_PIN),
        VerificationStage::LanguageVerification => Some(CHECK_LANGUAGE),
        VerificationStage::Complete => None,
    }
}

pub fn schema_for_stage(
    stage: VerificationStage,
) -> Result<Option<&'static ToolSchema>, UnknownToolError> {
    tool_name_for_stage(stage).map(get_schema).transpose()
}
