//! Store trait definitions

use crate::error::Result;
use async_trait::async_trait;
use riskflow_core::{Alert, HistoryWindow, Recommendation};

/// Durable store for alerts and their recommendations.
///
/// Both writes are upserts keyed by `txn_id`: repeating a write overwrites
/// the prior row rather than duplicating or conflicting.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Record an alert (idempotent)
    async fn upsert_alert(&self, alert: &Alert) -> Result<()>;

    /// Record the recommendation for an alert (idempotent)
    async fn save_recommendation(&self, txn_id: &str, rec: &Recommendation) -> Result<()>;

    /// Fetch the stored recommendation for an alert, if any
    async fn get_recommendation(&self, txn_id: &str) -> Result<Option<Recommendation>>;

    /// Bounded, most-recent-first window of prior alerts for the given
    /// subjects. Empty for first-seen subjects; never an error.
    async fn recent(
        &self,
        user_id: Option<&str>,
        merchant: Option<&str>,
        limit: u32,
    ) -> Result<HistoryWindow>;
}
