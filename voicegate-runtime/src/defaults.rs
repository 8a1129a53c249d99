use voicegate_core::config::{AppConfig, GenerationPolicyConfig, GenerationSettings};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";
pub const DEFAULT_MODEL: &str = "functiongemma-270m-it";
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 128;

pub fn default_generation_settings() -> GenerationSettings {
    GenerationSettings {
        base_url: DEFAULT_BASE_URL.into(),
        model: DEFAULT_MODEL.into(),
        max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
        greedy: true,
    }
}

pub fn default_app_config() -> AppConfig {
    AppConfig {
        generation: default_generation_settings(),
        policy: GenerationPolicyConfig::default(),
    }
}
