//! Riskflow stream worker - the first pipeline role
//!
//! Consumes raw transaction events, computes online features against rolling
//! per-entity state, obtains a model score and rule firings from external
//! services, produces a deterministic baseline decision, and emits telemetry
//! for every event plus an alert for escalated ones.

pub mod clients;
pub mod config;
pub mod error;
pub mod features;
pub mod retry;
pub mod sink;
pub mod worker;

pub use clients::{
    HttpRuleClient, HttpScoringClient, MockRuleClient, MockScoringClient, RuleClient,
    ScoringClient,
};
pub use config::WorkerSettings;
pub use error::{Result, WorkerError};
pub use features::FeatureComputer;
pub use sink::{ChannelSink, EventSink, MockSink, TelemetryRecord};
pub use worker::StreamWorker;
