use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use voicegate_runtime::config_store::ConfigStore;
use voicegate_runtime::runtime_engine::build_dialogue_from_config;

mod console;
mod shell;

use console::{LoggedVoice, StdinInput};

const DEFAULT_CONFIG_PATH: &str = "voicegate.json";

fn init_logging() {
    // Library crates log through `log`; the subscriber's log bridge picks those up.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    // Type each utterance on its own line. Env vars override the config file:
    // VOICEGATE_CONFIG, VOICEGATE_LLM_BASE_URL, VOICEGATE_LLM_MODEL, VOICEGATE_LLM_API_KEY.
    let config_path = env_nonempty("VOICEGATE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let store = ConfigStore::at_path(config_path);
    let mut cfg = store
        .load_or_init()
        .with_context(|| format!("load config from {}", store.path().display()))?;

    if let Some(url) = env_nonempty("VOICEGATE_LLM_BASE_URL") {
        cfg.generation.base_url = url;
    }
    if let Some(model) = env_nonempty("VOICEGATE_LLM_MODEL") {
        cfg.generation.model = model;
    }
    let api_key = env_nonempty("VOICEGATE_LLM_API_KEY");

    let mut dialogue = build_dialogue_from_config(&cfg, api_key);

    let input = StdinInput::new();
    let voice = LoggedVoice;
    let mut screen = std::io::stdout();
    let stage = shell::run_shell(&mut dialogue, &input, &voice, &mut screen).await?;

    log::info!("session ended at stage {}", stage.label());
    Ok(())
}
