//! Riskflow Core - shared types and decision logic for the fraud pipeline
//!
//! This crate provides the fundamental types used across the Riskflow
//! workspace:
//! - Transaction events and derived feature vectors
//! - Score and rule-evaluation results
//! - Alerts, history windows, and recommendations
//! - The baseline decision function and its threshold configuration
//! - Core error types

pub mod decision;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use decision::{decide, Decision, Thresholds};
pub use error::CoreError;
pub use types::{
    Alert, AlertSummary, FactorContribution, FeatureVector, HistoryWindow, KeySignal, Provenance,
    Recommendation, RuleResult, ScoreResult, TransactionEvent,
};
