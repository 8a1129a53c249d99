use serde::{Deserialize, Serialize};

/// Settings for the text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    // OpenAI-compatible endpoint, e.g. a local llama.cpp or Ollama server.
    pub base_url: String,
    pub model: String,

    pub max_new_tokens: u32,
    // Greedy decoding keeps outputs reproducible for identical prompts.
    #[serde(default = "default_greedy")]
    pub greedy: bool,
}

fn default_greedy() -> bool {
    true
}

/// Timeout and retry policy around a single generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPolicyConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for GenerationPolicyConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 1,
            retry_backoff_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub generation: GenerationSettings,
    #[serde(default)]
    pub policy: GenerationPolicyConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_sections_default_when_missing() {
        let raw = r#"{"generation":{"base_url":"http://localhost:8080/v1","model":"functiongemma","max_new_tokens":64}}"#;
        let cfg: AppConfig = serde_json::from_str(raw).unwrap();
        assert!(cfg.generation.greedy);
        assert_eq!(cfg.policy, GenerationPolicyConfig::default());
    }

    #[test]
    fn config_carries_no_secret_fields() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"generation":{"base_url":"u","model":"m","max_new_tokens":8},"api_key_present":true}"#,
        )
        .unwrap();
        let written = serde_json::to_value(&cfg).unwrap();
        assert_eq!(
            written.as_object().unwrap().keys().collect::<Vec<_>>(),
            ["generation", "policy"]
        );
    }
}
