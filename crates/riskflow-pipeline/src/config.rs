//! Pipeline configuration

use riskflow_agent::AgentSettings;
use riskflow_worker::WorkerSettings;
use serde::{Deserialize, Serialize};

fn default_database_url() -> String {
    "sqlite://data/riskflow.db".to_string()
}

/// Top-level pipeline configuration: both roles plus the shared store and
/// the event source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Stream-worker settings
    #[serde(default)]
    pub worker: WorkerSettings,

    /// Agent settings
    #[serde(default)]
    pub agent: AgentSettings,

    /// SQLite URL for the alert/recommendation store; `:memory:` works for
    /// throwaway runs
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// JSONL file of transaction events to replay into the pipeline
    #[serde(default)]
    pub events_file: Option<String>,

    /// Replay rate in events per second; 0 replays as fast as possible
    #[serde(default)]
    pub replay_rate: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            worker: WorkerSettings::default(),
            agent: AgentSettings::default(),
            database_url: default_database_url(),
            events_file: None,
            replay_rate: 0.0,
        }
    }
}

impl PipelineSettings {
    /// Load configuration: `config/riskflow.*` file if present, then
    /// `RISKFLOW_`-prefixed environment variables, else defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/riskflow").required(false))
            .add_source(config::Environment::with_prefix("RISKFLOW").separator("__"))
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(_) => {
                tracing::info!("No config file found, using default configuration");
                Ok(Self::default())
            }
        }
    }

    /// Validate both roles' settings; any inconsistency is fatal at startup.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.worker.validate()?;
        self.agent.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let settings = PipelineSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.worker.thresholds.tau, 0.75);
        assert_eq!(settings.agent.history_limit, 5);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let settings: PipelineSettings = serde_json::from_str(
            r#"{"worker":{"thresholds":{"tau":0.6,"tau_high":0.8}},
                "database_url":"sqlite::memory:"}"#,
        )
        .unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.worker.thresholds.tau, 0.6);
        assert_eq!(settings.agent.model, "llama3.1:8b");
    }
}
