//! Agent configuration

use riskflow_core::error::Result;
use riskflow_core::Thresholds;
use serde::{Deserialize, Serialize};

fn default_ollama_url() -> String {
    "http://localhost:11434/api/chat".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_history_limit() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

/// Settings for the agent role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Reasoning service chat endpoint
    #[serde(default = "default_ollama_url")]
    pub llm_url: String,

    /// Model identifier passed to the reasoning service
    #[serde(default = "default_model")]
    pub model: String,

    /// Reasoning-call timeout, milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum prior alerts per subject in a history window
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Whether to call the reasoning service at all; when false every alert
    /// takes the policy fallback
    #[serde(default = "default_true")]
    pub llm_enabled: bool,

    /// Fallback policy thresholds, independent of the worker's
    #[serde(default)]
    pub fallback_thresholds: Thresholds,

    /// Optional JSON policy file overriding `fallback_thresholds`
    #[serde(default)]
    pub fallback_policy_file: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            llm_url: default_ollama_url(),
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            history_limit: default_history_limit(),
            llm_enabled: true,
            fallback_thresholds: Thresholds::default(),
            fallback_policy_file: None,
        }
    }
}

impl AgentSettings {
    /// Validate settings at startup; inconsistent fallback thresholds are
    /// fatal, exactly like the worker's.
    pub fn validate(&self) -> Result<()> {
        self.fallback_thresholds.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(AgentSettings::default().validate().is_ok());
    }

    #[test]
    fn test_bad_fallback_thresholds_fatal() {
        let s: AgentSettings = serde_json::from_str(
            r#"{"fallback_thresholds":{"tau":0.9,"tau_high":0.2}}"#,
        )
        .unwrap();
        assert!(s.validate().is_err());
    }
}
