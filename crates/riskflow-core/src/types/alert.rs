//! Alert record emitted for escalated transactions

use crate::decision::Decision;
use crate::types::{FactorContribution, FeatureVector, TransactionEvent};
use serde::{Deserialize, Serialize};

/// A high-risk alert: one escalated transaction packaged with everything the
/// agent needs to review it.
///
/// Created exactly once per event whose baseline decision is `StepUp` or
/// `Block`, immutable afterwards, and keyed by the originating `txn_id` so
/// downstream writes can be idempotent upserts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Originating transaction identifier (alert key)
    pub txn_id: String,
    pub user_id: String,
    pub merchant: String,
    pub amount: f64,

    /// Event timestamp, when the event carried one
    #[serde(default)]
    pub ts: Option<String>,

    /// Model risk score
    pub score: f64,

    /// Ranked feature contributions from the scoring service
    #[serde(default)]
    pub top_factors: Vec<FactorContribution>,

    /// Fired rule identifiers
    #[serde(default)]
    pub reasons: Vec<String>,

    /// Baseline decision that triggered the alert
    pub baseline_decision: Decision,

    /// Step-up threshold in force when the alert was raised
    pub threshold: f64,

    /// Feature vector the score was computed from
    pub features: FeatureVector,

    /// Ground-truth labels passed through verbatim when present
    #[serde(default)]
    pub label_is_fraud: Option<i64>,
    #[serde(default)]
    pub label_is_flagged: Option<i64>,
}

impl Alert {
    /// Build an alert from an event and its pipeline outputs.
    pub fn from_event(
        event: &TransactionEvent,
        features: FeatureVector,
        score: f64,
        top_factors: Vec<FactorContribution>,
        reasons: Vec<String>,
        baseline_decision: Decision,
        threshold: f64,
    ) -> Self {
        Self {
            txn_id: event.txn_id.clone(),
            user_id: event.user_id.clone(),
            merchant: event.merchant.clone(),
            amount: event.amount,
            ts: event.ts.clone(),
            score,
            top_factors,
            reasons,
            baseline_decision,
            threshold,
            features,
            label_is_fraud: event.label_is_fraud,
            label_is_flagged: event.label_is_flagged,
        }
    }
}

/// Compact view of a prior alert, used in history windows and prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub txn_id: String,
    pub score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

impl From<&Alert> for AlertSummary {
    fn from(alert: &Alert) -> Self {
        Self {
            txn_id: alert.txn_id.clone(),
            score: alert.score,
            reasons: alert.reasons.clone(),
            ts: alert.ts.clone(),
        }
    }
}
