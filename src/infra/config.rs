// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub provider: ProviderConfig,
}

/// Defaults for a run. The CLI layer copies these into a
/// `RunConfiguration` and applies flag overrides on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_simulate")]
    pub simulate: bool,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_iteration_delay_ms")]
    pub iteration_delay_ms: u64,
    #[serde(default = "default_budget_usd")]
    pub budget_usd: f64,
    #[serde(default = "default_unit_cost_usd")]
    pub unit_cost_usd: f64,
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

fn default_simulate() -> bool {
    AgentConfig::default().simulate
}

fn default_max_iterations() -> u32 {
    AgentConfig::default().max_iterations
}

fn default_iteration_delay_ms() -> u64 {
    AgentConfig::default().iteration_delay_ms
}

fn default_budget_usd() -> f64 {
    AgentConfig::default().budget_usd
}

fn default_unit_cost_usd() -> f64 {
    AgentConfig::default().unit_cost_usd
}

fn default_call_timeout_secs() -> u64 {
    AgentConfig::default().call_timeout_secs
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            simulate: false,
            max_iterations: 10,
            iteration_delay_ms: 2000,
            budget_usd: 1.0,
            unit_cost_usd: 0.04,
            call_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Which provider implementation to use.
    pub kind: String,
    /// Vision model for decision and assessment calls.
    pub model: String,
    /// Image model for synthesis calls.
    pub image_model: String,
    pub base_url: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: "openai".into(),
            model: "gpt-4o".into(),
            image_model: "dall-e-3".into(),
            base_url: None,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
