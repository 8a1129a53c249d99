use anyhow::{Context, anyhow};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAiToolCall>,
}

#[derive(Debug, Deserialize)]
struct OpenAiToolCall {
    function: OpenAiFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAiFunction {
    name: String,
    // JSON object encoded as a string.
    #[serde(default)]
    arguments: String,
}

/// A tool call the server already extracted from the model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredToolCall {
    pub name: String,
    pub arguments_json: String,
}

/// First choice of a chat completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub tool_calls: Vec<StructuredToolCall>,
}

pub fn parse_openai_chat_completion(body: &[u8]) -> anyhow::Result<ChatCompletion> {
    let resp: OpenAiChatResponse = serde_json::from_slice(body).context("decode chat JSON")?;
    let message = resp
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| anyhow!("no choices in chat completion response"))?;

    let content = message.content.filter(|c| !c.is_empty());
    let tool_calls: Vec<StructuredToolCall> = message
        .tool_calls
        .into_iter()
        .map(|c| StructuredToolCall {
            name: c.function.name,
            arguments_json: c.function.arguments,
        })
        .collect();

    if content.is_none() && tool_calls.is_empty() {
        return Err(anyhow!("no content in chat completion response"));
    }
    Ok(ChatCompletion {
        content,
        tool_calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_content() {
        let body = br#"{"choices":[{"message":{"content":"<start_function_call>call:check_pin{pin:<escape>1<escape>}<end_function_call>"}}]}"#;
        let c = parse_openai_chat_completion(body).unwrap();
        assert!(c.content.unwrap().starts_with("<start_function_call>"));
        assert!(c.tool_calls.is_empty());
    }

    #[test]
    fn parses_structured_tool_calls() {
        let body = br#"{"choices":[{"message":{"content":null,"tool_calls":[{"id":"c1","type":"function","function":{"name":"check_pin","arguments":"{\"pin\":\"7979\"}"}}]}}]}"#;
        let c = parse_openai_chat_completion(body).unwrap();
        assert_eq!(c.content, None);
        assert_eq!(
            c.tool_calls,
            vec![StructuredToolCall {
                name: "check_pin".into(),
                arguments_json: r#"{"pin":"7979"}"#.into(),
            }]
        );
    }

    #[test]
    fn empty_message_errors() {
        assert!(parse_openai_chat_completion(br#"{"choices":[{"message":{}}]}"#).is_err());
        assert!(parse_openai_chat_completion(br#"{"choices":[]}"#).is_err());
        assert!(parse_openai_chat_completion(b"not json").is_err());
    }
}
