//! Score and rule-evaluation results

use serde::{Deserialize, Serialize};

/// One ranked feature contribution explaining a score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    /// Feature name
    pub feature: String,
    /// Signed contribution to the score
    pub contribution: f64,
}

/// Result returned by the model-scoring service.
///
/// Immutable once received. The score has already been range-checked by the
/// scoring client; `top_factors` is the service's ranking, kept in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Risk score in [0, 1]
    pub score: f64,

    /// Ranked feature contributions, highest impact first
    #[serde(default)]
    pub top_factors: Vec<FactorContribution>,
}

impl ScoreResult {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            top_factors: Vec::new(),
        }
    }

    pub fn with_top_factors(mut self, top_factors: Vec<FactorContribution>) -> Self {
        self.top_factors = top_factors;
        self
    }
}

/// Result returned by the rule-evaluation service.
///
/// Fired rule identifiers are semantically a set, reported as an ordered
/// sequence for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    /// Identifiers of rules that fired
    #[serde(default)]
    pub fired: Vec<String>,
}

impl RuleResult {
    pub fn new(fired: Vec<String>) -> Self {
        Self { fired }
    }

    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }
}
