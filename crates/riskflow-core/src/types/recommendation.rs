//! Final recommendation record

use crate::decision::Decision;
use serde::{Deserialize, Serialize};

/// Where a recommendation came from.
///
/// `PolicyFallback` whenever the reasoning service was unreachable, timed
/// out, or returned output failing validation. An invalid structured response
/// is never persisted as `Reasoned`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Reasoned,
    PolicyFallback,
}

/// One numeric signal the recommendation calls out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySignal {
    pub name: String,
    pub value: f64,
}

/// The agent's final, auditable decision for one alert.
///
/// Created exactly once per alert and persisted keyed by the alert's
/// `txn_id`; a redelivered alert overwrites rather than duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Recommended decision
    pub decision: Decision,

    /// Free-text rationale; always non-empty
    pub rationale: String,

    /// Signals the decision leaned on
    #[serde(default)]
    pub key_signals: Vec<KeySignal>,

    /// Suggested follow-up actions, in order
    #[serde(default)]
    pub actions: Vec<String>,

    /// Reasoned vs policy-fallback origin
    pub provenance: Provenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_wire_format() {
        assert_eq!(
            serde_json::to_string(&Provenance::PolicyFallback).unwrap(),
            r#""policy_fallback""#
        );
        assert_eq!(
            serde_json::to_string(&Provenance::Reasoned).unwrap(),
            r#""reasoned""#
        );
    }
}
