use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use orchestrator::LlmConfig;
use serde::{Deserialize, Serialize};

pub const AGENTFLOW_DIR: &str = ".agentflow";
pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_DB_NAME: &str = "agentflow.db";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_API_KEY: &str = "dummy-key";

/// Contents of `.agentflow/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentflowConfig {
    pub server: ServerConfig,
    pub llm: LlmSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        let defaults = LlmConfig::default();
        Self {
            base_url: defaults.base_url,
            model: defaults.model,
            max_tokens: defaults.max_tokens,
        }
    }
}

impl AgentflowConfig {
    /// Read the config file, falling back to defaults when it does not exist.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Fully resolved runtime settings: file values overridden by the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: AgentflowConfig,
    pub api_key: String,
    pub database_url: String,
}

impl Settings {
    pub fn load(workdir: &Path) -> Result<Self> {
        let config = AgentflowConfig::read(&config_path(workdir))?;
        Ok(Self::resolve(config, workdir, |key| std::env::var(key).ok()))
    }

    /// Apply `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL` and `DATABASE_URL`.
    pub fn resolve(
        mut config: AgentflowConfig,
        workdir: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        if let Some(base_url) = env("OPENAI_BASE_URL") {
            config.llm.base_url = base_url;
        }
        if let Some(model) = env("OPENAI_MODEL") {
            config.llm.model = model;
        }

        let database_url = env("DATABASE_URL")
            .unwrap_or_else(|| format!("sqlite:{}", database_path(workdir).display()));

        Self {
            config,
            api_key: env("OPENAI_API_KEY").unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            database_url,
        }
    }

    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.api_key.clone(),
            base_url: self.config.llm.base_url.clone(),
            model: self.config.llm.model.clone(),
            max_tokens: self.config.llm.max_tokens,
        }
    }
}

pub fn agentflow_dir(workdir: &Path) -> PathBuf {
    workdir.join(AGENTFLOW_DIR)
}

pub fn config_path(workdir: &Path) -> PathBuf {
    agentflow_dir(workdir).join(CONFIG_FILE)
}

pub fn database_path(workdir: &Path) -> PathBuf {
    agentflow_dir(workdir).join(DEFAULT_DB_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AgentflowConfig::read(&config_path(dir.path())).unwrap();
        assert_eq!(config, AgentflowConfig::default());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(agentflow_dir(dir.path())).unwrap();
        let path = config_path(dir.path());

        let mut config = AgentflowConfig::default();
        config.server.port = 8080;
        config.write(&path).unwrap();

        assert_eq!(AgentflowConfig::read(&path).unwrap().server.port, 8080);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AgentflowConfig = toml::from_str("[llm]\nmodel = \"local-model\"\n").unwrap();
        assert_eq!(config.llm.model, "local-model");
        assert_eq!(config.llm.max_tokens, 8192);
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_environment_overrides_file() {
        let workdir = Path::new("/work");
        let settings = Settings::resolve(
            AgentflowConfig::default(),
            workdir,
            env_from(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
                ("OPENAI_MODEL", "llama3"),
                ("DATABASE_URL", "sqlite::memory:"),
            ]),
        );

        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.database_url, "sqlite::memory:");
        let llm = settings.llm_config();
        assert_eq!(llm.base_url, "http://localhost:11434/v1");
        assert_eq!(llm.model, "llama3");
    }

    #[test]
    fn test_environment_defaults() {
        let workdir = Path::new("/work");
        let settings = Settings::resolve(AgentflowConfig::default(), workdir, env_from(&[]));

        assert_eq!(settings.api_key, "dummy-key");
        assert_eq!(settings.database_url, "sqlite:/work/.agentflow/agentflow.db");
    }
}
