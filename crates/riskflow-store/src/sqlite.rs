//! SQLite store implementation

use crate::error::{Result, StoreError};
use crate::traits::AlertStore;
use async_trait::async_trait;
use chrono::Utc;
use riskflow_core::{Alert, AlertSummary, HistoryWindow, Recommendation};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

/// SQLite-backed alert store (sqlx).
///
/// Feature vectors, fired rules, and recommendations are stored as JSON text
/// columns; everything queried on gets its own column.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) a database at the given path or URL.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        tracing::debug!(url, "opened alert store");
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// In-memory database, one connection so all queries see the same data.
    /// Intended for tests and local runs without a data directory.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create tables if they do not exist (idempotent)
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS alerts(
                txn_id TEXT PRIMARY KEY,
                ts TEXT,
                user_id TEXT NOT NULL,
                merchant TEXT NOT NULL,
                amount REAL NOT NULL,
                score REAL NOT NULL,
                reasons TEXT NOT NULL,
                threshold REAL NOT NULL,
                baseline_decision TEXT NOT NULL,
                features TEXT NOT NULL,
                top_factors TEXT NOT NULL,
                label_is_fraud INTEGER,
                label_is_flagged INTEGER
            )"#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS recommendations(
                txn_id TEXT PRIMARY KEY REFERENCES alerts(txn_id),
                recommendation TEXT NOT NULL,
                created_at TEXT NOT NULL
            )"#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_user ON alerts(user_id, ts)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_alerts_merchant ON alerts(merchant, ts)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn recent_for(
        &self,
        column: &str,
        value: &str,
        limit: u32,
    ) -> Result<Vec<AlertSummary>> {
        // column is one of two fixed identifiers, never user input
        let sql = format!(
            "SELECT txn_id, score, reasons, ts FROM alerts \
             WHERE {column} = ?1 ORDER BY ts DESC LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(value)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let reasons: String = row.get("reasons");
                Ok(AlertSummary {
                    txn_id: row.get("txn_id"),
                    score: row.get("score"),
                    reasons: serde_json::from_str(&reasons)
                        .map_err(|e| StoreError::Corrupt(format!("reasons column: {e}")))?,
                    ts: row.get("ts"),
                })
            })
            .collect()
    }
}

#[async_trait]
impl AlertStore for SqliteStore {
    async fn upsert_alert(&self, alert: &Alert) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO alerts(txn_id, ts, user_id, merchant, amount, score,
                                  reasons, threshold, baseline_decision, features,
                                  top_factors, label_is_fraud, label_is_flagged)
               VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
               ON CONFLICT(txn_id) DO UPDATE SET
                   ts = excluded.ts,
                   user_id = excluded.user_id,
                   merchant = excluded.merchant,
                   amount = excluded.amount,
                   score = excluded.score,
                   reasons = excluded.reasons,
                   threshold = excluded.threshold,
                   baseline_decision = excluded.baseline_decision,
                   features = excluded.features,
                   top_factors = excluded.top_factors,
                   label_is_fraud = excluded.label_is_fraud,
                   label_is_flagged = excluded.label_is_flagged"#,
        )
        .bind(&alert.txn_id)
        .bind(&alert.ts)
        .bind(&alert.user_id)
        .bind(&alert.merchant)
        .bind(alert.amount)
        .bind(alert.score)
        .bind(serde_json::to_string(&alert.reasons)?)
        .bind(alert.threshold)
        .bind(alert.baseline_decision.as_str())
        .bind(serde_json::to_string(&alert.features)?)
        .bind(serde_json::to_string(&alert.top_factors)?)
        .bind(alert.label_is_fraud)
        .bind(alert.label_is_flagged)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_recommendation(&self, txn_id: &str, rec: &Recommendation) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO recommendations(txn_id, recommendation, created_at)
               VALUES(?1, ?2, ?3)
               ON CONFLICT(txn_id) DO UPDATE SET
                   recommendation = excluded.recommendation,
                   created_at = excluded.created_at"#,
        )
        .bind(txn_id)
        .bind(serde_json::to_string(rec)?)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_recommendation(&self, txn_id: &str) -> Result<Option<Recommendation>> {
        let row = sqlx::query("SELECT recommendation FROM recommendations WHERE txn_id = ?1")
            .bind(txn_id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let raw: String = row.get("recommendation");
                let rec = serde_json::from_str(&raw)
                    .map_err(|e| StoreError::Corrupt(format!("recommendation column: {e}")))?;
                Ok(Some(rec))
            }
            None => Ok(None),
        }
    }

    async fn recent(
        &self,
        user_id: Option<&str>,
        merchant: Option<&str>,
        limit: u32,
    ) -> Result<HistoryWindow> {
        let mut window = HistoryWindow::default();
        if let Some(user_id) = user_id {
            window.user_recent = self.recent_for("user_id", user_id, limit).await?;
        }
        if let Some(merchant) = merchant {
            window.merchant_recent = self.recent_for("merchant", merchant, limit).await?;
        }
        Ok(window)
    }
}
