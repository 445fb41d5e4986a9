//! Domain types for the Riskflow pipeline
//!
//! This module contains the records flowing between the two pipeline roles:
//! - Transaction events and feature vectors (worker input)
//! - Score and rule results (external service output)
//! - Alerts and history windows (worker → agent)
//! - Recommendations (agent output)

pub mod alert;
pub mod event;
pub mod feature;
pub mod history;
pub mod recommendation;
pub mod score;

pub use alert::{Alert, AlertSummary};
pub use event::TransactionEvent;
pub use feature::FeatureVector;
pub use history::HistoryWindow;
pub use recommendation::{KeySignal, Provenance, Recommendation};
pub use score::{FactorContribution, RuleResult, ScoreResult};
