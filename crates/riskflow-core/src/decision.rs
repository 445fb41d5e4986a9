//! Baseline decision function and threshold configuration
//!
//! `decide` is a pure, total function of a risk score, the number of fired
//! rules, and a `Thresholds` pair. The same shape backs two independently
//! configured call sites: the stream worker's baseline decision and the
//! agent's policy fallback.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Escalation decision for a transaction.
///
/// The variants form a total escalation order: `Allow < StepUp < Block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    StepUp,
    Block,
}

impl Decision {
    /// True for decisions that escalate the event to the agent pipeline
    pub fn is_escalated(&self) -> bool {
        matches!(self, Decision::StepUp | Decision::Block)
    }

    /// Wire/storage representation (`allow`, `step_up`, `block`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::StepUp => "step_up",
            Decision::Block => "block",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Decision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "allow" => Ok(Decision::Allow),
            "step_up" => Ok(Decision::StepUp),
            "block" => Ok(Decision::Block),
            other => Err(CoreError::InvalidValue(format!(
                "unknown decision: {other}"
            ))),
        }
    }
}

/// Decision threshold pair.
///
/// `tau` is the step-up threshold, `tau_high` the block threshold. A pair
/// with `tau_high < tau` is rejected at startup rather than at decision time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub tau: f64,
    pub tau_high: f64,
}

impl Thresholds {
    pub fn new(tau: f64, tau_high: f64) -> Result<Self> {
        let t = Self { tau, tau_high };
        t.validate()?;
        Ok(t)
    }

    /// Check internal consistency. Fatal-at-startup on failure.
    pub fn validate(&self) -> Result<()> {
        if !self.tau.is_finite() || !self.tau_high.is_finite() {
            return Err(CoreError::InvalidConfiguration(format!(
                "non-finite thresholds: tau={} tau_high={}",
                self.tau, self.tau_high
            )));
        }
        if self.tau_high < self.tau {
            return Err(CoreError::InvalidConfiguration(format!(
                "tau_high ({}) must be >= tau ({})",
                self.tau_high, self.tau
            )));
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            tau: 0.75,
            tau_high: 0.90,
        }
    }
}

/// Baseline decision: block on high score, step up on moderate score or any
/// fired rule, allow otherwise.
///
/// Rule firings alone are sufficient to reach `StepUp` but never `Block`;
/// only the score crossing `tau_high` blocks. Deterministic and total, with
/// no hidden state.
pub fn decide(score: f64, fired_count: usize, thresholds: &Thresholds) -> Decision {
    if score >= thresholds.tau_high {
        Decision::Block
    } else if score >= thresholds.tau || fired_count >= 1 {
        Decision::StepUp
    } else {
        Decision::Allow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Threshold validation
    // ========================================================================

    #[test]
    fn test_inverted_thresholds_rejected() {
        assert!(Thresholds::new(0.9, 0.75).is_err());
    }

    #[test]
    fn test_equal_thresholds_allowed() {
        assert!(Thresholds::new(0.8, 0.8).is_ok());
    }

    // ========================================================================
    // Decision policy
    // ========================================================================

    #[test]
    fn test_score_above_tau_with_rule_steps_up() {
        // score >= tau, below tau_high; a fired rule reinforces but does
        // not escalate to block
        let t = Thresholds::new(0.75, 0.90).unwrap();
        assert_eq!(decide(0.86, 1, &t), Decision::StepUp);
    }

    #[test]
    fn test_score_above_tau_high_blocks() {
        let t = Thresholds::new(0.75, 0.90).unwrap();
        assert_eq!(decide(0.95, 0, &t), Decision::Block);
    }

    #[test]
    fn test_rules_alone_step_up_never_block() {
        let t = Thresholds::new(0.75, 0.90).unwrap();
        assert_eq!(decide(0.1, 1, &t), Decision::StepUp);
        assert_eq!(decide(0.1, 10, &t), Decision::StepUp);
    }

    #[test]
    fn test_low_score_no_rules_allows() {
        let t = Thresholds::new(0.75, 0.90).unwrap();
        assert_eq!(decide(0.2, 0, &t), Decision::Allow);
    }

    #[test]
    fn test_deterministic() {
        let t = Thresholds::default();
        for _ in 0..10 {
            assert_eq!(decide(0.86, 1, &t), decide(0.86, 1, &t));
        }
    }

    #[test]
    fn test_monotone_in_score() {
        // Raising the score while holding rules fixed never de-escalates
        let t = Thresholds::new(0.5, 0.8).unwrap();
        for fired in [0usize, 1, 3] {
            let mut prev = Decision::Allow;
            for i in 0..=100 {
                let d = decide(i as f64 / 100.0, fired, &t);
                assert!(d >= prev, "decision regressed at score {}", i);
                prev = d;
            }
        }
    }

    #[test]
    fn test_escalation_order() {
        assert!(Decision::Allow < Decision::StepUp);
        assert!(Decision::StepUp < Decision::Block);
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&Decision::StepUp).unwrap(),
            r#""step_up""#
        );
        let d: Decision = serde_json::from_str(r#""block""#).unwrap();
        assert_eq!(d, Decision::Block);
    }
}
