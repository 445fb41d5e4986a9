//! Prompt construction for the reasoning service

use riskflow_core::{Alert, HistoryWindow};
use serde_json::json;

/// System instructions sent with every reasoning request.
///
/// The contract it describes is enforced separately by the strict decoder;
/// the model following it is a hope, not an assumption.
pub const SYSTEM_PROMPT: &str = "\
You are a fraud-review analyst. You receive one high-risk transaction alert \
and a short history of prior alerts for the same user and merchant. Respond \
with a single JSON object and nothing else, with exactly these fields: \
\"decision\" (one of \"allow\", \"step_up\", \"block\"), \"rationale\" \
(one or two sentences), \"key_signals\" (array of {\"name\", \"value\"} \
pairs), and \"actions\" (array of short strings). Base your decision only on \
the data provided.";

/// Build the user payload: alert summary plus bounded history.
pub fn build_user_payload(alert: &Alert, history: &HistoryWindow) -> String {
    json!({
        "alert": alert,
        "history": history,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskflow_core::{Decision, FeatureVector};

    #[test]
    fn test_payload_contains_alert_and_history() {
        let alert = Alert {
            txn_id: "t1".to_string(),
            user_id: "u1".to_string(),
            merchant: "m1".to_string(),
            amount: 10.0,
            ts: None,
            score: 0.8,
            top_factors: vec![],
            reasons: vec![],
            baseline_decision: Decision::StepUp,
            threshold: 0.75,
            features: FeatureVector::new(),
            label_is_fraud: None,
            label_is_flagged: None,
        };
        let payload = build_user_payload(&alert, &HistoryWindow::default());
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["alert"]["txn_id"], "t1");
        assert!(value["history"]["user_recent"].as_array().unwrap().is_empty());
    }
}
