//! Outbound event sinks
//!
//! The worker publishes JSON payloads to named topics through the
//! `EventSink` trait. The in-process implementation routes topics onto tokio
//! channels; the mock records everything published for test verification.

use crate::error::{Result, WorkerError};
use async_trait::async_trait;
use riskflow_core::{Decision, FeatureVector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Topic carrying one telemetry record per processed event
pub const TOPIC_SCORES: &str = "fraud.scores";
/// Topic carrying alerts for escalated events
pub const TOPIC_ALERTS: &str = "alerts.high_risk";

/// Lower-weight record emitted for every event, escalated or not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub txn_id: String,
    pub user_id: String,
    pub merchant: String,
    pub amount: f64,
    /// Feature vector the score was computed from
    pub features: FeatureVector,
    pub score: f64,
    pub decision: Decision,
    /// Wall-clock processing time for the event, milliseconds
    pub elapsed_ms: u64,
}

/// Sink for publishing JSON payloads to a named topic
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<()>;
}

/// A message recorded by [`MockSink`]
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Mock sink that records published messages for test verification
#[derive(Default)]
pub struct MockSink {
    published: Arc<Mutex<Vec<PublishedMessage>>>,
    /// Topics for which publish should fail (alert-failure testing)
    failing_topics: Vec<String>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any publish to the given topic
    pub fn failing_on(topic: &str) -> Self {
        Self {
            published: Arc::new(Mutex::new(Vec::new())),
            failing_topics: vec![topic.to_string()],
        }
    }

    /// All messages published so far
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    /// Messages published to one topic
    pub fn published_to(&self, topic: &str) -> Vec<serde_json::Value> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.topic == topic)
            .map(|m| m.payload.clone())
            .collect()
    }
}

#[async_trait]
impl EventSink for MockSink {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<()> {
        if self.failing_topics.iter().any(|t| t == topic) {
            return Err(WorkerError::Emit(format!("mock failure on {topic}")));
        }
        self.published.lock().unwrap().push(PublishedMessage {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }
}

/// Sink routing topics onto in-process tokio channels.
///
/// Topics without a registered channel are dropped silently, mirroring a
/// queue nobody has declared interest in.
#[derive(Default, Clone)]
pub struct ChannelSink {
    routes: HashMap<String, mpsc::UnboundedSender<serde_json::Value>>,
}

impl ChannelSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a topic onto a channel
    pub fn with_route(mut self, topic: &str, tx: mpsc::UnboundedSender<serde_json::Value>) -> Self {
        self.routes.insert(topic.to_string(), tx);
        self
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<()> {
        if let Some(tx) = self.routes.get(topic) {
            tx.send(payload)
                .map_err(|_| WorkerError::Emit(format!("{topic}: channel closed")))?;
        }
        Ok(())
    }
}
