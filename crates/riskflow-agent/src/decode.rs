//! Strict decoder for reasoning-service output
//!
//! The reasoning service returns free-form text that is *expected* to contain
//! a JSON object. This module either produces a fully validated payload or a
//! rejection reason; there is no partial or best-effort acceptance.

use riskflow_core::{Decision, KeySignal};
use serde::Deserialize;
use std::fmt;

/// Maximum length for a single suggested action
const MAX_ACTION_LEN: usize = 120;

/// Why a reasoning response was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// No JSON object found in the response text
    NoJsonObject,
    /// JSON parse or schema failure (unknown decision value lands here)
    Schema(String),
    /// Rationale missing or blank
    EmptyRationale,
    /// An action item is empty or longer than the allowed bound
    BadAction(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NoJsonObject => write!(f, "no JSON object in response"),
            RejectReason::Schema(msg) => write!(f, "schema violation: {msg}"),
            RejectReason::EmptyRationale => write!(f, "empty rationale"),
            RejectReason::BadAction(action) => write!(f, "bad action item: {action:?}"),
        }
    }
}

/// Validated payload decoded from a reasoning response
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationPayload {
    #[serde(alias = "decision_recommendation")]
    pub decision: Decision,
    pub rationale: String,
    #[serde(default)]
    pub key_signals: Vec<KeySignal>,
    #[serde(default)]
    pub actions: Vec<String>,
}

/// Find the first balanced JSON object in free-form text.
///
/// Models wrap their JSON in prose or code fences often enough that taking
/// the raw text as-is would reject many otherwise valid responses. Balancing
/// braces (outside string literals) is enough; real validation happens in
/// the parse step.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode and strictly validate a reasoning response.
pub fn decode_recommendation(
    text: &str,
) -> std::result::Result<RecommendationPayload, RejectReason> {
    let raw = extract_json_object(text).ok_or(RejectReason::NoJsonObject)?;

    let payload: RecommendationPayload =
        serde_json::from_str(raw).map_err(|e| RejectReason::Schema(e.to_string()))?;

    if payload.rationale.trim().is_empty() {
        return Err(RejectReason::EmptyRationale);
    }
    for action in &payload.actions {
        if action.trim().is_empty() || action.len() > MAX_ACTION_LEN {
            return Err(RejectReason::BadAction(action.clone()));
        }
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_payload_accepted() {
        let text = r#"{"decision":"step_up","rationale":"velocity spike",
                       "key_signals":[{"name":"user_txn_prev10","value":9.0}],
                       "actions":["manual_review_queue"]}"#;
        let payload = decode_recommendation(text).unwrap();
        assert_eq!(payload.decision, Decision::StepUp);
        assert_eq!(payload.actions, vec!["manual_review_queue"]);
    }

    #[test]
    fn test_json_inside_prose_accepted() {
        let text = "Sure! Here is my analysis:\n```json\n{\"decision\":\"allow\",\"rationale\":\"benign pattern\"}\n```\nHope that helps.";
        let payload = decode_recommendation(text).unwrap();
        assert_eq!(payload.decision, Decision::Allow);
    }

    #[test]
    fn test_non_json_rejected() {
        assert_eq!(
            decode_recommendation("I think you should block this one."),
            Err(RejectReason::NoJsonObject)
        );
    }

    #[test]
    fn test_unknown_decision_value_rejected() {
        // "hold" is not a valid decision; must reject, never coerce
        let text = r#"{"decision":"hold","rationale":"looks odd"}"#;
        assert!(matches!(
            decode_recommendation(text),
            Err(RejectReason::Schema(_))
        ));
    }

    #[test]
    fn test_missing_rationale_rejected() {
        let text = r#"{"decision":"block"}"#;
        assert!(matches!(
            decode_recommendation(text),
            Err(RejectReason::Schema(_))
        ));
    }

    #[test]
    fn test_blank_rationale_rejected() {
        let text = r#"{"decision":"block","rationale":"   "}"#;
        assert_eq!(decode_recommendation(text), Err(RejectReason::EmptyRationale));
    }

    #[test]
    fn test_overlong_action_rejected() {
        let long = "x".repeat(200);
        let text = format!(r#"{{"decision":"block","rationale":"r","actions":["{long}"]}}"#);
        assert!(matches!(
            decode_recommendation(&text),
            Err(RejectReason::BadAction(_))
        ));
    }

    #[test]
    fn test_unknown_extra_field_rejected() {
        let text = r#"{"decision":"allow","rationale":"r","confidence":0.9}"#;
        assert!(matches!(
            decode_recommendation(text),
            Err(RejectReason::Schema(_))
        ));
    }

    #[test]
    fn test_braces_inside_strings_balanced() {
        let text = r#"prefix {"decision":"allow","rationale":"looks like {normal} usage"} suffix"#;
        assert!(decode_recommendation(text).is_ok());
    }
}
