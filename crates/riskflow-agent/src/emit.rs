//! Final recommendation emission

use crate::error::{AgentError, Result};
use async_trait::async_trait;
use riskflow_core::Recommendation;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Logical channel final recommendations are published on
pub const TOPIC_RECOMMENDATIONS: &str = "analyst.recommendations";

/// Publishes final recommendations for downstream consumers.
///
/// Called only after the store write was acknowledged; emit-before-persist
/// would let an observer see a recommendation with no durable record.
#[async_trait]
pub trait RecommendationEmitter: Send + Sync {
    async fn emit(&self, txn_id: &str, rec: &Recommendation) -> Result<()>;
}

/// Mock emitter that records emissions for test verification
#[derive(Default)]
pub struct MockEmitter {
    emitted: Arc<Mutex<Vec<(String, Recommendation)>>>,
    fail: bool,
}

impl MockEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every emit (crash-between-steps testing)
    pub fn failing() -> Self {
        Self {
            emitted: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn emitted(&self) -> Vec<(String, Recommendation)> {
        self.emitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationEmitter for MockEmitter {
    async fn emit(&self, txn_id: &str, rec: &Recommendation) -> Result<()> {
        if self.fail {
            return Err(AgentError::Emit("mock emit failure".to_string()));
        }
        self.emitted
            .lock()
            .unwrap()
            .push((txn_id.to_string(), rec.clone()));
        Ok(())
    }
}

/// Emitter publishing onto an in-process tokio channel.
///
/// Each envelope carries the logical topic name, so consumers reading a
/// shared channel can tell recommendation traffic apart.
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<serde_json::Value>,
}

impl ChannelEmitter {
    pub fn new(tx: mpsc::UnboundedSender<serde_json::Value>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl RecommendationEmitter for ChannelEmitter {
    async fn emit(&self, txn_id: &str, rec: &Recommendation) -> Result<()> {
        let payload = json!({
            "topic": TOPIC_RECOMMENDATIONS,
            "txn_id": txn_id,
            "recommendation": rec,
        });
        self.tx
            .send(payload)
            .map_err(|_| AgentError::Emit("recommendation channel closed".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskflow_core::{Decision, Provenance};

    fn rec() -> Recommendation {
        Recommendation {
            decision: Decision::StepUp,
            rationale: "elevated score".to_string(),
            key_signals: vec![],
            actions: vec!["manual_review_queue".to_string()],
            provenance: Provenance::Reasoned,
        }
    }

    #[tokio::test]
    async fn test_channel_emitter_tags_topic() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let emitter = ChannelEmitter::new(tx);
        emitter.emit("t1", &rec()).await.unwrap();
        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope["topic"], TOPIC_RECOMMENDATIONS);
        assert_eq!(envelope["txn_id"], "t1");
        assert_eq!(envelope["recommendation"]["decision"], "step_up");
    }

    #[tokio::test]
    async fn test_channel_emitter_closed_channel_is_emit_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let emitter = ChannelEmitter::new(tx);
        let err = emitter.emit("t1", &rec()).await.unwrap_err();
        assert!(matches!(err, AgentError::Emit(_)));
    }
}
