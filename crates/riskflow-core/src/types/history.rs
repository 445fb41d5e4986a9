//! Bounded history window for a subject

use crate::types::AlertSummary;
use serde::{Deserialize, Serialize};

/// A short, bounded window of prior alerts for the subjects of one alert.
///
/// Most-recent-first, recomputed per recommendation-engine invocation and
/// never cached beyond it. Empty windows are the expected steady state for
/// new subjects, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryWindow {
    /// Recent alerts for the originating user
    #[serde(default)]
    pub user_recent: Vec<AlertSummary>,

    /// Recent alerts for the counterparty
    #[serde(default)]
    pub merchant_recent: Vec<AlertSummary>,
}

impl HistoryWindow {
    pub fn is_empty(&self) -> bool {
        self.user_recent.is_empty() && self.merchant_recent.is_empty()
    }
}
