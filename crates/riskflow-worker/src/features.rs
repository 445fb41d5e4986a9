//! Online feature computation with per-entity rolling state

use chrono::{DateTime, Datelike, Timelike, Utc};
use dashmap::DashMap;
use riskflow_core::{FeatureVector, TransactionEvent};
use std::collections::VecDeque;

/// Default ring-buffer depth for per-entity velocity state
pub const DEFAULT_WINDOW: usize = 10;

/// Online feature computer with bounded per-entity velocity state.
///
/// Rolling state is two concurrent maps (user, merchant) of fixed-depth ring
/// buffers holding recent event steps. The `DashMap` entry API serializes
/// updates per key, so concurrent events for different subjects never
/// contend and events for the same subject never race.
pub struct FeatureComputer {
    window: usize,
    user_history: DashMap<String, VecDeque<i64>>,
    merchant_history: DashMap<String, VecDeque<i64>>,
}

impl FeatureComputer {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Create with a custom ring-buffer depth
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(1),
            user_history: DashMap::new(),
            merchant_history: DashMap::new(),
        }
    }

    /// Derive the hour-index step from an RFC 3339 timestamp.
    ///
    /// Out-of-order or unparseable timestamps clamp to 0 rather than fail;
    /// derived time features must tolerate whatever the transport delivers.
    pub fn derive_step(ts: Option<&str>) -> i64 {
        let Some(ts) = ts else { return 0 };
        match DateTime::parse_from_rfc3339(ts) {
            Ok(dt) => {
                let dt = dt.with_timezone(&Utc);
                let day0 = dt.ordinal0() as i64;
                day0 * 24 + dt.hour() as i64
            }
            Err(_) => 0,
        }
    }

    /// Compute the feature vector for one event, updating rolling state.
    ///
    /// Pure given the rolling state; the state update (appending this event's
    /// step to both entity ring buffers) is the only side effect. The
    /// velocity features count events seen *before* this one.
    pub fn compute(&self, event: &TransactionEvent) -> FeatureVector {
        let step = event
            .ts_step
            .unwrap_or_else(|| Self::derive_step(event.ts.as_deref()));
        let amount = if event.amount.is_finite() {
            event.amount.max(0.0)
        } else {
            0.0
        };

        let user_prev = self.push_step(&self.user_history, &event.user_id, step);
        let merchant_prev = self.push_step(&self.merchant_history, &event.merchant, step);

        let ip_mismatch = event
            .ip
            .as_deref()
            .map(|ip| ip.starts_with("10."))
            .unwrap_or(false);

        let mut features = FeatureVector::new();
        features.set("amount", amount);
        features.set("log_amount", amount.ln_1p());
        features.set("hour_mod_24", (step.rem_euclid(24)) as f64);
        features.set("user_txn_prev10", user_prev as f64);
        features.set("merchant_txn_prev10", merchant_prev as f64);
        features.set("ip_country_mismatch", if ip_mismatch { 1.0 } else { 0.0 });
        features
    }

    /// Append a step to one entity's ring buffer, returning the count of
    /// previously seen events.
    fn push_step(&self, map: &DashMap<String, VecDeque<i64>>, key: &str, step: i64) -> usize {
        let mut entry = map.entry(key.to_string()).or_default();
        let prev = entry.len();
        if entry.len() == self.window {
            entry.pop_front();
        }
        entry.push_back(step);
        prev
    }

    /// Number of distinct users with rolling state
    pub fn tracked_users(&self) -> usize {
        self.user_history.len()
    }
}

impl Default for FeatureComputer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(txn: &str, user: &str, merchant: &str, amount: f64) -> TransactionEvent {
        serde_json::from_value(serde_json::json!({
            "txn_id": txn, "user_id": user, "merchant": merchant, "amount": amount,
        }))
        .unwrap()
    }

    #[test]
    fn test_feature_set_shape() {
        let fc = FeatureComputer::new();
        let fv = fc.compute(&event("t1", "u1", "m1", 100.0));
        assert_eq!(fv.get("amount"), Some(100.0));
        assert_eq!(fv.get("log_amount"), Some(100.0f64.ln_1p()));
        assert_eq!(fv.get("user_txn_prev10"), Some(0.0));
        assert_eq!(fv.get("merchant_txn_prev10"), Some(0.0));
        assert_eq!(fv.get("ip_country_mismatch"), Some(0.0));
    }

    #[test]
    fn test_velocity_counts_prior_events() {
        let fc = FeatureComputer::new();
        for i in 0..3 {
            let fv = fc.compute(&event(&format!("t{i}"), "u1", "m1", 10.0));
            assert_eq!(fv.get("user_txn_prev10"), Some(i as f64));
        }
    }

    #[test]
    fn test_velocity_bounded_by_window() {
        let fc = FeatureComputer::with_window(5);
        for i in 0..20 {
            let fv = fc.compute(&event(&format!("t{i}"), "u1", "m1", 10.0));
            assert!(fv.get("user_txn_prev10").unwrap() <= 5.0);
        }
    }

    #[test]
    fn test_private_ip_flags_mismatch() {
        let fc = FeatureComputer::new();
        let mut e = event("t1", "u1", "m1", 5.0);
        e.ip = Some("10.4.4.1".to_string());
        assert_eq!(fc.compute(&e).get("ip_country_mismatch"), Some(1.0));
        e.ip = Some("192.168.0.1".to_string());
        e.txn_id = "t2".to_string();
        assert_eq!(fc.compute(&e).get("ip_country_mismatch"), Some(0.0));
    }

    #[test]
    fn test_ts_step_preferred_over_ts() {
        let fc = FeatureComputer::new();
        let mut e = event("t1", "u1", "m1", 5.0);
        e.ts_step = Some(26);
        e.ts = Some("2025-08-01T05:00:00Z".to_string());
        assert_eq!(fc.compute(&e).get("hour_mod_24"), Some(2.0));
    }

    #[test]
    fn test_garbage_timestamp_clamps_to_zero() {
        assert_eq!(FeatureComputer::derive_step(Some("not-a-time")), 0);
        assert_eq!(FeatureComputer::derive_step(None), 0);
    }

    #[test]
    fn test_hour_from_ts() {
        let step = FeatureComputer::derive_step(Some("2025-08-02T03:00:00Z"));
        assert_eq!(step % 24, 3);
    }

    #[test]
    fn test_negative_amount_clamped() {
        let fc = FeatureComputer::new();
        let fv = fc.compute(&event("t1", "u1", "m1", -50.0));
        assert_eq!(fv.get("amount"), Some(0.0));
        assert_eq!(fv.get("log_amount"), Some(0.0));
    }
}
