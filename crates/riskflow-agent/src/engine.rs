//! Recommendation engine state machine
//!
//! Per alert: `Requested → Reasoned` when the reasoning service answers in
//! time with a payload passing strict validation, `Requested → Fallback` on
//! any other outcome, then `Persisted` once the store write is acknowledged
//! and the recommendation emitted. The fallback leg is pure and total, so a
//! well-formed alert always reaches `Persisted`.

use crate::decode::decode_recommendation;
use crate::emit::RecommendationEmitter;
use crate::error::Result;
use crate::llm::{LlmClient, LlmRequest};
use crate::policy::PolicyFallback;
use crate::prompt::{build_user_payload, SYSTEM_PROMPT};
use riskflow_core::{Alert, HistoryWindow, Provenance, Recommendation};
use riskflow_store::AlertStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Two-outcome result of deliberating over one alert.
///
/// Callers handle both arms uniformly: both carry a complete recommendation
/// and both get persisted.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The reasoning service produced a valid structured decision
    Reasoned(Recommendation),
    /// Any failure on the reasoning path; deterministic policy applied
    Fallback(Recommendation),
}

impl Outcome {
    pub fn into_recommendation(self) -> Recommendation {
        match self {
            Outcome::Reasoned(rec) | Outcome::Fallback(rec) => rec,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback(_))
    }
}

/// The agent's recommendation engine.
pub struct RecommendationEngine {
    /// Reasoning client; `None` runs fallback-only
    llm: Option<Arc<dyn LlmClient>>,
    model: String,
    fallback: PolicyFallback,
    store: Arc<dyn AlertStore>,
    emitter: Arc<dyn RecommendationEmitter>,
    history_limit: u32,
}

impl RecommendationEngine {
    pub fn new(
        llm: Option<Arc<dyn LlmClient>>,
        model: impl Into<String>,
        fallback: PolicyFallback,
        store: Arc<dyn AlertStore>,
        emitter: Arc<dyn RecommendationEmitter>,
        history_limit: u32,
    ) -> Self {
        Self {
            llm,
            model: model.into(),
            fallback,
            store,
            emitter,
            history_limit,
        }
    }

    /// Deliberate over one alert: reasoning service if available, policy
    /// fallback on any failure. Never fails.
    pub async fn deliberate(&self, alert: &Alert, history: &HistoryWindow) -> Outcome {
        let Some(llm) = &self.llm else {
            return Outcome::Fallback(self.fallback.recommend(alert));
        };

        let request = LlmRequest::new(
            SYSTEM_PROMPT.to_string(),
            build_user_payload(alert, history),
            self.model.clone(),
        )
        .with_temperature(0.2);

        let response = match llm.chat(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(txn_id = %alert.txn_id, provider = llm.name(), error = %err,
                      "reasoning call failed, taking policy fallback");
                return Outcome::Fallback(self.fallback.recommend(alert));
            }
        };

        match decode_recommendation(&response.content) {
            Ok(payload) => {
                debug!(txn_id = %alert.txn_id, decision = %payload.decision, "reasoned decision");
                Outcome::Reasoned(Recommendation {
                    decision: payload.decision,
                    rationale: payload.rationale,
                    key_signals: payload.key_signals,
                    actions: payload.actions,
                    provenance: Provenance::Reasoned,
                })
            }
            Err(reason) => {
                warn!(txn_id = %alert.txn_id, %reason,
                      "reasoning response rejected, taking policy fallback");
                Outcome::Fallback(self.fallback.recommend(alert))
            }
        }
    }

    /// Process one alert end to end: record it, fetch history, deliberate,
    /// persist the recommendation, then emit it.
    ///
    /// Idempotent under redelivery: both writes are upserts keyed by the
    /// alert's txn_id. Only store/emit failures propagate, leaving the alert
    /// unacknowledged for redelivery.
    pub async fn handle(&self, alert: &Alert) -> Result<Recommendation> {
        self.store.upsert_alert(alert).await?;

        // A history read failure degrades to an empty window; the reasoning
        // path must stay available without history.
        let history = match self
            .store
            .recent(
                Some(&alert.user_id),
                Some(&alert.merchant),
                self.history_limit,
            )
            .await
        {
            Ok(window) => window,
            Err(err) => {
                warn!(txn_id = %alert.txn_id, error = %err, "history fetch failed, proceeding without");
                HistoryWindow::default()
            }
        };

        let outcome = self.deliberate(alert, &history).await;
        let recommendation = outcome.into_recommendation();

        // Persist first; emit only once the write is acknowledged.
        self.store
            .save_recommendation(&alert.txn_id, &recommendation)
            .await?;
        self.emitter.emit(&alert.txn_id, &recommendation).await?;

        Ok(recommendation)
    }

    /// Consume alert payloads from a channel until it closes.
    pub async fn run(&self, mut alerts: mpsc::UnboundedReceiver<serde_json::Value>) {
        info!("agent consuming high-risk alerts");
        while let Some(payload) = alerts.recv().await {
            let alert: Alert = match serde_json::from_value(payload) {
                Ok(alert) => alert,
                Err(err) => {
                    warn!(error = %err, "discarding malformed alert");
                    continue;
                }
            };
            if let Err(err) = self.handle(&alert).await {
                warn!(txn_id = %alert.txn_id, error = %err,
                      "alert left unacknowledged for redelivery");
            }
        }
        info!("alert channel closed, agent stopping");
    }
}
