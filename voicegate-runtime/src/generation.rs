use anyhow::{Context, anyhow};
use serde_json::Value;
use voicegate_core::call::{ArgValue, START_MARKER, render_function_call};
use voicegate_core::config::GenerationSettings;
use voicegate_core::prompt::GenerationRequest;
use voicegate_engine::traits::GenerationAdapter;
use voicegate_providers::openai_compatible::{
    ChatMessage, CompletionOptions, OpenAiCompatibleChatConfig, build_chat_completions_request,
};
use voicegate_providers::parse::{ChatCompletion, StructuredToolCall, parse_openai_chat_completion};

/// Generation backed by an OpenAI-compatible chat-completions server.
#[derive(Clone)]
pub struct OpenAiCompatibleGenerationAdapter {
    settings: GenerationSettings,
    api_key: Option<String>,
}

impl std::fmt::Debug for OpenAiCompatibleGenerationAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleGenerationAdapter")
            .field("base_url", &self.settings.base_url)
            .field("model", &self.settings.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl OpenAiCompatibleGenerationAdapter {
    pub fn new(settings: GenerationSettings, api_key: Option<String>) -> Self {
        Self { settings, api_key }
    }

    fn options(&self) -> CompletionOptions {
        if self.settings.greedy {
            CompletionOptions::greedy(self.settings.max_new_tokens)
        } else {
            CompletionOptions {
                max_tokens: self.settings.max_new_tokens,
                temperature: 1.0,
            }
        }
    }
}

#[async_trait::async_trait]
impl GenerationAdapter for OpenAiCompatibleGenerationAdapter {
    async fn generate(&self, request: &GenerationRequest) -> anyhow::Result<String> {
        let cfg = OpenAiCompatibleChatConfig {
            base_url: self.settings.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.settings.model.clone(),
        };
        let messages = [
            ChatMessage::new("developer", &request.instruction),
            ChatMessage::new("user", &request.user_utterance),
        ];
        let tools = [request.active_schema.to_openai_tool()];

        let req = build_chat_completions_request(&cfg, &messages, &tools, self.options());
        let resp = voicegate_providers::runtime::execute(&req).await?;
        if !resp.is_success() {
            return Err(anyhow!(
                "OpenAI-compatible request failed: status={} body={}",
                resp.status,
                String::from_utf8_lossy(&resp.body)
            ));
        }

        let completion = parse_openai_chat_completion(&resp.body)?;
        completion_to_wire_text(completion)
    }
}

/// Reduces a completion to the raw text the function-call parser reads.
///
/// Servers with native tool parsing return `tool_calls` instead of marker text; the first one
/// is rendered back into the marker format.
fn completion_to_wire_text(completion: ChatCompletion) -> anyhow::Result<String> {
    if let Some(text) = completion.content.as_deref() {
        if text.contains(START_MARKER) || completion.tool_calls.is_empty() {
            return Ok(text.to_string());
        }
    }
    let call = completion
        .tool_calls
        .first()
        .ok_or_else(|| anyhow!("completion has neither content nor tool calls"))?;
    render_structured_call(call)
}

fn render_structured_call(call: &StructuredToolCall) -> anyhow::Result<String> {
    let raw = if call.arguments_json.trim().is_empty() {
        "{}"
    } else {
        call.arguments_json.as_str()
    };
    let args: serde_json::Map<String, Value> = serde_json::from_str(raw)
        .with_context(|| format!("decode arguments of tool call `{}`", call.name))?;

    let mut pairs = Vec::with_capacity(args.len());
    for (k, v) in &args {
        let value = match v {
            Value::Null => continue,
            Value::String(s) => ArgValue::Text(s.clone()),
            Value::Bool(b) => ArgValue::Bool(*b),
            Value::Number(n) => ArgValue::Number(n.to_string()),
            Value::Array(_) | Value::Object(_) => {
                return Err(anyhow!("tool call argument `{k}` is not a scalar"));
            }
        };
        pairs.push((k.as_str(), value));
    }
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    Ok(render_function_call(
        &call.name,
        pairs.iter().map(|(k, v)| (*k, v)),
    ))
}
