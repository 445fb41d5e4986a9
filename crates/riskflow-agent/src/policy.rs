//! Deterministic policy fallback
//!
//! The safety net behind the reasoning service: a pure, total decision
//! function with its own threshold configuration, guaranteed to produce a
//! recommendation even with the reasoning service fully disabled.

use riskflow_core::{Alert, Decision, KeySignal, Provenance, Recommendation, Thresholds};
use serde::{Deserialize, Serialize};

/// How many feature signals the synthesized rationale calls out
const KEY_SIGNAL_COUNT: usize = 3;

/// Fallback policy configuration, independent of the worker's thresholds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Deterministic threshold-based decision used when the reasoning service is
/// unavailable or returns invalid output.
#[derive(Debug, Clone)]
pub struct PolicyFallback {
    thresholds: Thresholds,
}

impl PolicyFallback {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Load from a JSON policy file; missing or unreadable files fall back
    /// to the defaults, an inconsistent threshold pair does not.
    pub fn from_config_file(path: &std::path::Path) -> riskflow_core::error::Result<Self> {
        let config = std::fs::read_to_string(path)
            .ok()
            .and_then(|raw| serde_json::from_str::<PolicyConfig>(&raw).ok())
            .unwrap_or_default();
        config.thresholds.validate()?;
        Ok(Self::new(config.thresholds))
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Decide for an alert. Same shape as the baseline decision, with one
    /// extra trigger: two or more fired rules escalate to block.
    fn decide(&self, score: f64, fired_count: usize) -> Decision {
        if score >= self.thresholds.tau_high || fired_count >= 2 {
            Decision::Block
        } else if score >= self.thresholds.tau || fired_count >= 1 {
            Decision::StepUp
        } else {
            Decision::Allow
        }
    }

    /// Produce the full fallback recommendation for an alert.
    ///
    /// Pure and total: this path must never fail, whatever the alert looks
    /// like. The rationale names the threshold that was crossed.
    pub fn recommend(&self, alert: &Alert) -> Recommendation {
        let decision = self.decide(alert.score, alert.reasons.len());
        let rationale = format!(
            "score={:.2}; rules={:?}; tau={:.2} tau_high={:.2}",
            alert.score, alert.reasons, self.thresholds.tau, self.thresholds.tau_high
        );
        let key_signals = alert
            .features
            .iter()
            .take(KEY_SIGNAL_COUNT)
            .map(|(name, value)| KeySignal {
                name: name.clone(),
                value: *value,
            })
            .collect();
        let actions = if decision.is_escalated() {
            vec!["manual_review_queue".to_string()]
        } else {
            vec!["none".to_string()]
        };
        Recommendation {
            decision,
            rationale,
            key_signals,
            actions,
            provenance: Provenance::PolicyFallback,
        }
    }
}

impl Default for PolicyFallback {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}
