//! In-memory store implementation
//!
//! Used by tests and by local runs that do not need durability. Shares the
//! `AlertStore` contract with the SQLite implementation, including upsert
//! semantics and bounded most-recent-first history.

use crate::error::Result;
use crate::traits::AlertStore;
use async_trait::async_trait;
use riskflow_core::{Alert, AlertSummary, HistoryWindow, Recommendation};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    /// Alerts in insertion order; an upsert replaces in place
    alerts: Vec<Alert>,
    recommendations: HashMap<String, Recommendation>,
}

/// In-memory alert store
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored alerts
    pub fn alert_count(&self) -> usize {
        self.inner.lock().unwrap().alerts.len()
    }

    /// Number of stored recommendations
    pub fn recommendation_count(&self) -> usize {
        self.inner.lock().unwrap().recommendations.len()
    }
}

fn recent_matching<'a>(
    alerts: impl Iterator<Item = &'a Alert>,
    limit: u32,
) -> Vec<AlertSummary> {
    let mut matched: Vec<&Alert> = alerts.collect();
    // Most-recent-first by timestamp, matching the SQL `ORDER BY ts DESC`
    matched.sort_by(|a, b| b.ts.cmp(&a.ts));
    matched
        .into_iter()
        .take(limit as usize)
        .map(AlertSummary::from)
        .collect()
}

#[async_trait]
impl AlertStore for MemoryStore {
    async fn upsert_alert(&self, alert: &Alert) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner.alerts.iter_mut().find(|a| a.txn_id == alert.txn_id) {
            *existing = alert.clone();
        } else {
            inner.alerts.push(alert.clone());
        }
        Ok(())
    }

    async fn save_recommendation(&self, txn_id: &str, rec: &Recommendation) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .recommendations
            .insert(txn_id.to_string(), rec.clone());
        Ok(())
    }

    async fn get_recommendation(&self, txn_id: &str) -> Result<Option<Recommendation>> {
        Ok(self.inner.lock().unwrap().recommendations.get(txn_id).cloned())
    }

    async fn recent(
        &self,
        user_id: Option<&str>,
        merchant: Option<&str>,
        limit: u32,
    ) -> Result<HistoryWindow> {
        let inner = self.inner.lock().unwrap();
        let mut window = HistoryWindow::default();
        if let Some(user_id) = user_id {
            window.user_recent = recent_matching(
                inner.alerts.iter().filter(|a| a.user_id == user_id),
                limit,
            );
        }
        if let Some(merchant) = merchant {
            window.merchant_recent = recent_matching(
                inner.alerts.iter().filter(|a| a.merchant == merchant),
                limit,
            );
        }
        Ok(window)
    }
}
