use std::sync::Arc;

use voicegate_core::config::AppConfig;
use voicegate_engine::dialogue::VerificationDialogue;
use voicegate_engine::policy::GenerationPolicy;
use voicegate_engine::traits::GenerationAdapter;

use crate::generation::OpenAiCompatibleGenerationAdapter;

/// Build a ready-to-run dialogue from config.
///
/// The API key is passed separately since it is never stored in the config file.
pub fn build_dialogue_from_config(cfg: &AppConfig, api_key: Option<String>) -> VerificationDialogue {
    let adapter: Arc<dyn GenerationAdapter> = Arc::new(OpenAiCompatibleGenerationAdapter::new(
        cfg.generation.clone(),
        api_key,
    ));
    log::info!(
        "generation backend: {} (model {})",
        cfg.generation.base_url,
        cfg.generation.model
    );
    VerificationDialogue::new(adapter, GenerationPolicy::from(&cfg.policy))
}
