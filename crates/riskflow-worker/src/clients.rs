//! Scoring and rule-evaluation service clients
//!
//! Both services take a feature vector and answer synchronously; both clients
//! apply a bounded timeout, a small retry budget with backoff, and strict
//! response-shape validation. A malformed response is classified exactly like
//! a transport failure: a hard error surfaced to the caller.

use crate::error::{Result, WorkerError};
use crate::retry::{with_retries, RetryPolicy};
use async_trait::async_trait;
use riskflow_core::{FactorContribution, FeatureVector, RuleResult, ScoreResult};
use serde_json::json;
use std::time::Duration;

/// Client for the model-scoring service
#[async_trait]
pub trait ScoringClient: Send + Sync {
    /// Score a feature vector, returning the risk score and top factors
    async fn score(&self, features: &FeatureVector) -> Result<ScoreResult>;
}

/// Client for the rule-evaluation service
#[async_trait]
pub trait RuleClient: Send + Sync {
    /// Evaluate rules against a feature vector, returning fired rule ids
    async fn evaluate(&self, features: &FeatureVector) -> Result<RuleResult>;
}

/// Map a reqwest error onto the transient/hard taxonomy
fn classify(err: reqwest::Error) -> WorkerError {
    if err.is_timeout() || err.is_connect() {
        WorkerError::Transient(err.to_string())
    } else {
        WorkerError::Hard(err.to_string())
    }
}

/// Classify an HTTP status: 5xx is transient, anything else non-success is hard
fn classify_status(context: &str, status: reqwest::StatusCode, body: &str) -> WorkerError {
    if status.is_server_error() {
        WorkerError::Transient(format!("{context}: server error {status}"))
    } else {
        WorkerError::Hard(format!("{context}: unexpected status {status}: {body}"))
    }
}

/// HTTP client for the scoring service (`POST {base}/score`)
pub struct HttpScoringClient {
    base_url: String,
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpScoringClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, policy: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkerError::Hard(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
            policy,
        })
    }

    async fn score_once(&self, features: &FeatureVector) -> Result<ScoreResult> {
        let resp = self
            .client
            .post(format!("{}/score", self.base_url))
            .json(&json!({ "features": features }))
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        let body = resp.text().await.map_err(classify)?;
        if !status.is_success() {
            return Err(classify_status("scoring service", status, &body));
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| WorkerError::Hard(format!("scoring service: invalid JSON: {e}")))?;

        // Minimal schema: score numeric and in range; top factors optional
        let score = value
            .get("score")
            .and_then(|s| s.as_f64())
            .ok_or_else(|| WorkerError::Hard("scoring service: missing numeric score".to_string()))?;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(WorkerError::Hard(format!(
                "scoring service: score out of range: {score}"
            )));
        }

        let top_factors = value
            .pointer("/explanation/top_factors")
            .cloned()
            .map(serde_json::from_value::<Vec<FactorContribution>>)
            .transpose()
            .map_err(|e| WorkerError::Hard(format!("scoring service: bad top_factors: {e}")))?
            .unwrap_or_default();

        Ok(ScoreResult::new(score).with_top_factors(top_factors))
    }
}

#[async_trait]
impl ScoringClient for HttpScoringClient {
    async fn score(&self, features: &FeatureVector) -> Result<ScoreResult> {
        with_retries("score", &self.policy, || self.score_once(features)).await
    }
}

/// HTTP client for the rule service (`POST {base}/eval`)
pub struct HttpRuleClient {
    base_url: String,
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl HttpRuleClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, policy: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkerError::Hard(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
            policy,
        })
    }

    async fn evaluate_once(&self, features: &FeatureVector) -> Result<RuleResult> {
        let resp = self
            .client
            .post(format!("{}/eval", self.base_url))
            .json(&json!({ "features": features }))
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        let body = resp.text().await.map_err(classify)?;
        if !status.is_success() {
            return Err(classify_status("rule service", status, &body));
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| WorkerError::Hard(format!("rule service: invalid JSON: {e}")))?;

        // Minimal schema: fired must be an array of strings
        let fired = value
            .get("fired")
            .cloned()
            .map(serde_json::from_value::<Vec<String>>)
            .transpose()
            .map_err(|e| WorkerError::Hard(format!("rule service: bad fired list: {e}")))?
            .unwrap_or_default();

        Ok(RuleResult::new(fired))
    }
}

#[async_trait]
impl RuleClient for HttpRuleClient {
    async fn evaluate(&self, features: &FeatureVector) -> Result<RuleResult> {
        with_retries("eval", &self.policy, || self.evaluate_once(features)).await
    }
}

/// Mock scoring client for tests
pub struct MockScoringClient {
    result: std::result::Result<ScoreResult, String>,
}

impl MockScoringClient {
    /// Always return the given score
    pub fn with_score(score: f64) -> Self {
        Self {
            result: Ok(ScoreResult::new(score)),
        }
    }

    /// Always fail with a hard error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
        }
    }
}

#[async_trait]
impl ScoringClient for MockScoringClient {
    async fn score(&self, _features: &FeatureVector) -> Result<ScoreResult> {
        self.result
            .clone()
            .map_err(WorkerError::Hard)
    }
}

/// Mock rule client for tests
pub struct MockRuleClient {
    result: std::result::Result<RuleResult, String>,
}

impl MockRuleClient {
    /// Always return the given fired rule ids
    pub fn with_fired(fired: Vec<&str>) -> Self {
        Self {
            result: Ok(RuleResult::new(
                fired.into_iter().map(String::from).collect(),
            )),
        }
    }

    /// Always fail with a hard error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
        }
    }
}

#[async_trait]
impl RuleClient for MockRuleClient {
    async fn evaluate(&self, _features: &FeatureVector) -> Result<RuleResult> {
        self.result
            .clone()
            .map_err(WorkerError::Hard)
    }
}
