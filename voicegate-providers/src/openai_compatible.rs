use crate::request::{Body, HttpRequest};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiCompatibleChatConfig {
    pub base_url: String,
    // Local servers usually run without auth.
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Sampling knobs for a chat completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionOptions {
    pub fn greedy(max_tokens: u32) -> Self {
        Self {
            max_tokens,
            temperature: 0.0,
        }
    }
}

/// `tools` are full OpenAI tool objects (`{"type":"function","function":{..}}`).
pub fn build_chat_completions_request(
    cfg: &OpenAiCompatibleChatConfig,
    messages: &[ChatMessage],
    tools: &[Value],
    opts: CompletionOptions,
) -> HttpRequest {
    let url = join_url(&cfg.base_url, "/chat/completions");

    let mut payload = json!({
        "model": cfg.model,
        "messages": messages.iter().map(|m| json!({"role": m.role, "content": m.content})).collect::<Vec<_>>(),
        "max_tokens": opts.max_tokens,
        "temperature": opts.temperature,
        "stream": false,
    });
    if !tools.is_empty() {
        payload["tools"] = Value::Array(tools.to_vec());
    }

    let mut headers = vec![("Content-Type".into(), "application/json".into())];
    if let Some(key) = cfg.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        headers.push(("Authorization".into(), format!("Bearer {key}")));
    }

    HttpRequest {
        method: "POST".into(),
        url,
        headers,
        body: Body::Json(payload.to_string()),
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(api_key: Option<&str>) -> OpenAiCompatibleChatConfig {
        OpenAiCompatibleChatConfig {
            base_url: "http://localhost:8080/v1/".into(),
            api_key: api_key.map(String::from),
            model: "functiongemma-270m-it".into(),
        }
    }

    #[test]
    fn join_url_handles_trailing_slash() {
        assert_eq!(
            join_url("http://localhost:8080/v1/", "/chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(
            join_url("http://localhost:8080/v1", "chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn builds_greedy_request_with_tools() {
        let tool = json!({"type": "function", "function": {"name": "check_pin"}});
        let req = build_chat_completions_request(
            &cfg(Some("k")),
            &[
                ChatMessage::new("developer", "extract"),
                ChatMessage::new("user", "My pin is 7979"),
            ],
            &[tool],
            CompletionOptions::greedy(128),
        );

        assert_eq!(req.method, "POST");
        assert_eq!(req.url, "http://localhost:8080/v1/chat/completions");
        assert_eq!(req.header("authorization"), Some("Bearer k"));
        let Body::Json(s) = &req.body else {
            panic!("expected json");
        };
        let v: Value = serde_json::from_str(s).unwrap();
        assert_eq!(v["max_tokens"], 128);
        assert_eq!(v["temperature"], 0.0);
        assert_eq!(v["messages"][0]["role"], "developer");
        assert_eq!(v["tools"][0]["function"]["name"], "check_pin");
    }

    #[test]
    fn omits_auth_and_tools_when_absent() {
        let req = build_chat_completions_request(
            &cfg(Some("  ")),
            &[ChatMessage::new("user", "hi")],
            &[],
            CompletionOptions::greedy(16),
        );
        assert_eq!(req.header("authorization"), None);
        let Body::Json(s) = &req.body else {
            panic!("expected json");
        };
        assert!(!s.contains("\"tools\""));
    }
}
