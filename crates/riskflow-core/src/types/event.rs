//! Transaction event record

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// A single ingested transaction event.
///
/// Created by ingestion and never mutated afterwards. `txn_id` is unique and
/// keys every downstream record (alerts, recommendations), which is what makes
/// idempotent persistence possible under at-least-once delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    /// Unique transaction identifier
    pub txn_id: String,

    /// Originating user
    pub user_id: String,

    /// Counterparty (destination account treated as merchant/beneficiary)
    pub merchant: String,

    /// Monetary amount
    pub amount: f64,

    /// Event timestamp, RFC 3339
    #[serde(default)]
    pub ts: Option<String>,

    /// Hour index since dataset epoch; preferred over `ts` when present
    #[serde(default)]
    pub ts_step: Option<i64>,

    /// Transaction type (e.g. TRANSFER, CASH_OUT); opaque to the pipeline
    #[serde(default)]
    pub txn_type: Option<String>,

    /// Originator balances before/after the transaction
    #[serde(default)]
    pub oldbalance_org: Option<f64>,
    #[serde(default)]
    pub newbalance_orig: Option<f64>,

    /// Counterparty balances before/after the transaction
    #[serde(default)]
    pub oldbalance_dest: Option<f64>,
    #[serde(default)]
    pub newbalance_dest: Option<f64>,

    /// Device/card/network identifiers when the ingestion layer provides them
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,

    /// Ground-truth fraud label, when the source dataset carries one.
    /// Passed through verbatim for later evaluation; never used for scoring.
    #[serde(default)]
    pub label_is_fraud: Option<i64>,

    /// Dataset-flagged-fraud label, same treatment as `label_is_fraud`
    #[serde(default)]
    pub label_is_flagged: Option<i64>,
}

impl TransactionEvent {
    /// Validate the required fields of an ingested event.
    ///
    /// A malformed event is rejected with a typed input error; callers count
    /// the rejection and move on, they never retry it.
    pub fn validate(&self) -> Result<()> {
        if self.txn_id.is_empty() {
            return Err(CoreError::MalformedEvent("empty txn_id".to_string()));
        }
        if self.user_id.is_empty() {
            return Err(CoreError::MalformedEvent("empty user_id".to_string()));
        }
        if self.merchant.is_empty() {
            return Err(CoreError::MalformedEvent("empty merchant".to_string()));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(CoreError::MalformedEvent(format!(
                "invalid amount: {}",
                self.amount
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> TransactionEvent {
        serde_json::from_str(
            r#"{"txn_id":"t1","user_id":"u1","merchant":"m1","amount":120.5}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_minimal_event_is_valid() {
        assert!(event().validate().is_ok());
    }

    #[test]
    fn test_missing_txn_id_rejected() {
        let mut e = event();
        e.txn_id = String::new();
        assert!(matches!(e.validate(), Err(CoreError::MalformedEvent(_))));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut e = event();
        e.amount = -1.0;
        assert!(e.validate().is_err());
    }

    #[test]
    fn test_labels_roundtrip() {
        let json = r#"{"txn_id":"t1","user_id":"u1","merchant":"m1","amount":1.0,
                       "label_is_fraud":1,"label_is_flagged":0}"#;
        let e: TransactionEvent = serde_json::from_str(json).unwrap();
        assert_eq!(e.label_is_fraud, Some(1));
        assert_eq!(e.label_is_flagged, Some(0));
    }
}
