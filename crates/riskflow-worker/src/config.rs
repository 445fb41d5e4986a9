//! Stream worker configuration

use crate::error::Result;
use riskflow_core::Thresholds;
use serde::{Deserialize, Serialize};

fn default_model_api() -> String {
    "http://localhost:8001".to_string()
}

fn default_rules_api() -> String {
    "http://localhost:8002".to_string()
}

fn default_timeout_ms() -> u64 {
    2_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_feature_window() -> usize {
    10
}

/// Settings for the stream-worker role.
///
/// Deserializable from the pipeline config file; every field has an
/// environment-compatible default matching the original deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Base URL of the model-scoring service
    #[serde(default = "default_model_api")]
    pub model_api: String,

    /// Base URL of the rule-evaluation service
    #[serde(default = "default_rules_api")]
    pub rules_api: String,

    /// Baseline decision thresholds
    #[serde(default)]
    pub thresholds: Thresholds,

    /// Per-external-call timeout, milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry budget per external call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Ring-buffer depth for per-entity rolling feature state
    #[serde(default = "default_feature_window")]
    pub feature_window: usize,

    /// Drop events whose score cannot be obtained after retries, instead of
    /// proceeding with a degraded score of 0.0
    #[serde(default)]
    pub drop_unscorable: bool,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            model_api: default_model_api(),
            rules_api: default_rules_api(),
            thresholds: Thresholds::default(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            feature_window: default_feature_window(),
            drop_unscorable: false,
        }
    }
}

impl WorkerSettings {
    /// Validate settings at startup. An inconsistent threshold pair is fatal.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(WorkerSettings::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_fatal() {
        let settings: WorkerSettings = serde_json::from_str(
            r#"{"thresholds":{"tau":0.9,"tau_high":0.5}}"#,
        )
        .unwrap();
        assert!(settings.validate().is_err());
    }
}
