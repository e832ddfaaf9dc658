use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::catalog::Persona;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_output")]
    pub output_folder: String,

    /// Catalog key of the host persona ("wit", "herald", "lark", "glitch").
    #[serde(default = "default_persona")]
    pub persona: String,

    pub assistant: AssistantConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AssistantConfig {
    /// May be left empty in the file; OPENAI_API_KEY is consulted as a fallback.
    #[serde(default)]
    pub api_key: String,

    /// Remote assistant id. Filled in by the setup flow on first run.
    #[serde(default)]
    pub assistant_id: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_poll_timeout_seconds")]
    pub poll_timeout_seconds: u64,
}

fn default_output() -> String {
    "output".to_string()
}
fn default_persona() -> String {
    "wit".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-4-turbo-preview".to_string()
}
fn default_poll_interval_ms() -> u64 {
    500
}
fn default_poll_timeout_seconds() -> u64 {
    120
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            assistant_id: None,
            base_url: default_base_url(),
            model: default_model(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_seconds: default_poll_timeout_seconds(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Path::new("config.yml");
        if !path.exists() {
            anyhow::bail!("config.yml not found. Please create one.");
        }

        let content = fs::read_to_string(path).context("Failed to read config.yml")?;
        let config: Config =
            serde_yaml_ng::from_str(&content).context("Failed to parse config.yml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write("config.yml", content).context("Failed to write config.yml")?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }

    /// API credential, from the file or the environment. Generation is not
    /// attempted without one; the caller surfaces setup guidance instead.
    pub fn resolve_api_key(&self) -> Result<String> {
        if !self.assistant.api_key.trim().is_empty() {
            return Ok(self.assistant.api_key.trim().to_string());
        }
        if let Ok(key) = env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                return Ok(key.trim().to_string());
            }
        }
        anyhow::bail!(
            "No API key configured. Set assistant.api_key in config.yml \
             or export OPENAI_API_KEY."
        )
    }

    pub fn resolve_assistant_id(&self) -> Option<String> {
        if let Some(id) = &self.assistant.assistant_id {
            if !id.trim().is_empty() {
                return Some(id.trim().to_string());
            }
        }
        env::var("OPENAI_ASSISTANT_ID")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_string())
    }

    /// Unknown persona keys are a construction-time error, not a silent
    /// fallback.
    pub fn resolve_persona(&self) -> Result<Persona> {
        Persona::from_key(&self.persona)
            .with_context(|| format!("Unknown persona '{}' in config.yml", self.persona))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
assistant:
  api_key: "sk-test"
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.output_folder, "output");
        assert_eq!(config.persona, "wit");
        assert_eq!(config.assistant.api_key, "sk-test");
        assert_eq!(config.assistant.base_url, "https://api.openai.com/v1");
        assert_eq!(config.assistant.poll_interval_ms, 500);
        assert_eq!(config.assistant.poll_timeout_seconds, 120);
        assert!(config.assistant.assistant_id.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
output_folder: stories
persona: glitch
assistant:
  api_key: "sk-test"
  assistant_id: "asst_123"
  base_url: "https://example.test/v1"
  model: "gpt-4o"
  poll_interval_ms: 250
  poll_timeout_seconds: 30
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.output_folder, "stories");
        assert_eq!(config.resolve_persona().unwrap(), Persona::Glitch);
        assert_eq!(config.resolve_assistant_id().as_deref(), Some("asst_123"));
        assert_eq!(config.assistant.poll_interval_ms, 250);
    }

    #[test]
    fn test_unknown_persona_rejected() {
        let yaml = r#"
persona: nobody
assistant:
  api_key: "sk-test"
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(config.resolve_persona().is_err());
    }

    #[test]
    fn test_roundtrip_preserves_assistant_id() {
        let mut config: Config = serde_yaml_ng::from_str("assistant: {}\n").unwrap();
        config.assistant.assistant_id = Some("asst_new".to_string());
        let serialized = serde_yaml_ng::to_string(&config).unwrap();
        let reparsed: Config = serde_yaml_ng::from_str(&serialized).unwrap();
        assert_eq!(reparsed.assistant.assistant_id.as_deref(), Some("asst_new"));
    }
}
