use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use voicegate_core::config::AppConfig;

use crate::defaults::default_app_config;

/// JSON config file holding the generation backend and timeout policy.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<AppConfig> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read config: {}", self.path.display()))?;
        let cfg: AppConfig = serde_json::from_slice(&bytes).context("decode config JSON")?;
        Ok(cfg)
    }

    /// Loads the file if it exists. On first run the built-in defaults are written out so the
    /// backend and timeouts can be edited afterwards.
    pub fn load_or_init(&self) -> anyhow::Result<AppConfig> {
        if self.path.exists() {
            return self.load();
        }
        log::info!("no config at {}; using defaults", self.path.display());
        let cfg = default_app_config();
        self.save(&cfg)?;
        log::info!("wrote default config to {}", self.path.display());
        Ok(cfg)
    }

    /// Writes `cfg` next to the target and renames it into place, so a crash mid-write never
    /// leaves a truncated config behind.
    pub fn save(&self, cfg: &AppConfig) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(cfg).context("encode config JSON")?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create config directory: {}", dir.display()))?;

        let mut staged = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("stage config in {}", dir.display()))?;
        staged.write_all(&json).context("write staged config")?;
        staged
            .persist(&self.path)
            .with_context(|| format!("replace config: {}", self.path.display()))?;
        Ok(())
    }
}
