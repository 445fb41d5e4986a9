//! Stream worker pipeline
//!
//! One continuous per-event pipeline: validate → features → score + rules →
//! baseline decision → telemetry (always) + alert (escalated only).

use crate::clients::{RuleClient, ScoringClient};
use crate::config::WorkerSettings;
use crate::error::{Result, WorkerError};
use crate::features::FeatureComputer;
use crate::sink::{EventSink, TelemetryRecord, TOPIC_ALERTS, TOPIC_SCORES};
use riskflow_core::{decide, Alert, RuleResult, ScoreResult, TransactionEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Counters for events the pipeline could not fully process
#[derive(Debug, Default)]
pub struct WorkerCounters {
    /// Malformed events rejected (never retried)
    pub rejected_inputs: AtomicU64,
    /// Events dropped as unscorable (when `drop_unscorable` is set)
    pub dropped_unscorable: AtomicU64,
    /// Events processed with a degraded score or empty rule set
    pub degraded: AtomicU64,
}

/// The stream-worker role: consumes raw events, emits telemetry and alerts.
pub struct StreamWorker {
    settings: WorkerSettings,
    features: FeatureComputer,
    scoring: Arc<dyn ScoringClient>,
    rules: Arc<dyn RuleClient>,
    sink: Arc<dyn EventSink>,
    counters: WorkerCounters,
}

impl StreamWorker {
    pub fn new(
        settings: WorkerSettings,
        scoring: Arc<dyn ScoringClient>,
        rules: Arc<dyn RuleClient>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        settings.validate()?;
        let features = FeatureComputer::with_window(settings.feature_window);
        Ok(Self {
            settings,
            features,
            scoring,
            rules,
            sink,
            counters: WorkerCounters::default(),
        })
    }

    pub fn counters(&self) -> &WorkerCounters {
        &self.counters
    }

    /// Process one raw JSON payload from the transport.
    ///
    /// Returns the alert when the event escalated. Malformed input and
    /// dropped-unscorable events return `Ok(None)`: both are acknowledged,
    /// counted, and never retried.
    pub async fn handle(&self, payload: serde_json::Value) -> Result<Option<Alert>> {
        let event: TransactionEvent = match serde_json::from_value(payload) {
            Ok(event) => event,
            Err(err) => {
                self.counters.rejected_inputs.fetch_add(1, Ordering::Relaxed);
                warn!(error = %err, "rejecting malformed event");
                return Ok(None);
            }
        };
        if let Err(err) = event.validate() {
            self.counters.rejected_inputs.fetch_add(1, Ordering::Relaxed);
            warn!(txn_id = %event.txn_id, error = %err, "rejecting invalid event");
            return Ok(None);
        }
        self.process(&event).await
    }

    /// Process one validated event end to end.
    pub async fn process(&self, event: &TransactionEvent) -> Result<Option<Alert>> {
        let started = Instant::now();
        let features = self.features.compute(event);

        let score_result = match self.scoring.score(&features).await {
            Ok(result) => result,
            Err(err) => {
                if self.settings.drop_unscorable {
                    self.counters
                        .dropped_unscorable
                        .fetch_add(1, Ordering::Relaxed);
                    warn!(txn_id = %event.txn_id, error = %err, "dropping unscorable event");
                    return Ok(None);
                }
                self.counters.degraded.fetch_add(1, Ordering::Relaxed);
                warn!(txn_id = %event.txn_id, error = %err, "scoring failed, degrading to 0.0");
                ScoreResult::new(0.0)
            }
        };

        let rule_result = match self.rules.evaluate(&features).await {
            Ok(result) => result,
            Err(err) => {
                self.counters.degraded.fetch_add(1, Ordering::Relaxed);
                warn!(txn_id = %event.txn_id, error = %err, "rule evaluation failed, assuming none fired");
                RuleResult::default()
            }
        };

        let decision = decide(
            score_result.score,
            rule_result.fired_count(),
            &self.settings.thresholds,
        );
        debug!(txn_id = %event.txn_id, score = score_result.score,
               fired = rule_result.fired_count(), %decision, "baseline decision");

        // Telemetry goes out for every event, before and independent of
        // alert construction.
        let telemetry = TelemetryRecord {
            txn_id: event.txn_id.clone(),
            user_id: event.user_id.clone(),
            merchant: event.merchant.clone(),
            amount: event.amount,
            features: features.clone(),
            score: score_result.score,
            decision,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        self.sink
            .publish(TOPIC_SCORES, serde_json::to_value(&telemetry)?)
            .await?;

        if !decision.is_escalated() {
            return Ok(None);
        }

        let alert = Alert::from_event(
            event,
            features,
            score_result.score,
            score_result.top_factors,
            rule_result.fired,
            decision,
            self.settings.thresholds.tau,
        );
        match self.sink.publish(TOPIC_ALERTS, serde_json::to_value(&alert)?).await {
            Ok(()) => Ok(Some(alert)),
            Err(err) => {
                // Telemetry is already out; surface the alert failure so the
                // transport can redeliver the event.
                warn!(txn_id = %alert.txn_id, error = %err, "alert emission failed");
                Err(WorkerError::Emit(format!(
                    "alert for {}: {err}",
                    alert.txn_id
                )))
            }
        }
    }

    /// Consume raw payloads from a channel until it closes.
    pub async fn run(&self, mut events: mpsc::UnboundedReceiver<serde_json::Value>) {
        info!("stream worker consuming raw events");
        let mut processed = 0u64;
        while let Some(payload) = events.recv().await {
            if let Err(err) = self.handle(payload).await {
                warn!(error = %err, "event left unacknowledged for redelivery");
            }
            processed += 1;
        }
        info!(processed, "event channel closed, worker stopping");
    }
}
