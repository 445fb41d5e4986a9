//! Integration tests for the alert store implementations
//!
//! Both backends must honor the same contract: idempotent upserts keyed by
//! txn_id, bounded most-recent-first history, and empty windows for
//! first-seen subjects.

use riskflow_core::{Alert, Decision, FeatureVector, Provenance, Recommendation};
use riskflow_store::{AlertStore, MemoryStore, SqliteStore};

fn alert(txn: &str, user: &str, merchant: &str, score: f64, ts: &str) -> Alert {
    Alert {
        txn_id: txn.to_string(),
        user_id: user.to_string(),
        merchant: merchant.to_string(),
        amount: 100.0,
        ts: Some(ts.to_string()),
        score,
        top_factors: vec![],
        reasons: vec!["velocity_user".to_string()],
        baseline_decision: Decision::StepUp,
        threshold: 0.75,
        features: FeatureVector::new(),
        label_is_fraud: None,
        label_is_flagged: None,
    }
}

fn recommendation(decision: Decision, rationale: &str) -> Recommendation {
    Recommendation {
        decision,
        rationale: rationale.to_string(),
        key_signals: vec![],
        actions: vec!["manual_review_queue".to_string()],
        provenance: Provenance::PolicyFallback,
    }
}

async fn exercise_upsert_idempotence(store: &dyn AlertStore) {
    let a = alert("t1", "u1", "m1", 0.8, "2025-08-01T10:00:00Z");
    store.upsert_alert(&a).await.unwrap();
    // Redelivery: same key, updated score
    let mut again = a.clone();
    again.score = 0.85;
    store.upsert_alert(&again).await.unwrap();

    let window = store.recent(Some("u1"), None, 10).await.unwrap();
    assert_eq!(window.user_recent.len(), 1, "upsert must not duplicate");
    assert_eq!(window.user_recent[0].score, 0.85);
}

async fn exercise_recommendation_overwrite(store: &dyn AlertStore) {
    store
        .upsert_alert(&alert("t2", "u2", "m2", 0.9, "2025-08-01T11:00:00Z"))
        .await
        .unwrap();
    store
        .save_recommendation("t2", &recommendation(Decision::StepUp, "first"))
        .await
        .unwrap();
    store
        .save_recommendation("t2", &recommendation(Decision::Block, "second"))
        .await
        .unwrap();

    let stored = store.get_recommendation("t2").await.unwrap().unwrap();
    assert_eq!(stored.decision, Decision::Block);
    assert_eq!(stored.rationale, "second");
}

async fn exercise_history_window(store: &dyn AlertStore) {
    for i in 0..8 {
        store
            .upsert_alert(&alert(
                &format!("h{i}"),
                "u3",
                "m3",
                0.5 + i as f64 / 100.0,
                &format!("2025-08-01T{:02}:00:00Z", i),
            ))
            .await
            .unwrap();
    }

    let window = store.recent(Some("u3"), Some("m3"), 5).await.unwrap();
    assert_eq!(window.user_recent.len(), 5, "window must stay bounded");
    assert_eq!(window.merchant_recent.len(), 5);
    // Most recent first
    assert_eq!(window.user_recent[0].txn_id, "h7");
    assert_eq!(window.user_recent[4].txn_id, "h3");
}

async fn exercise_empty_history(store: &dyn AlertStore) {
    let window = store.recent(Some("nobody"), Some("nowhere"), 5).await.unwrap();
    assert!(window.is_empty(), "first-seen subject must yield empty window");
    assert!(store.get_recommendation("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_store_contract() {
    let store = MemoryStore::new();
    exercise_empty_history(&store).await;
    exercise_upsert_idempotence(&store).await;
    exercise_recommendation_overwrite(&store).await;
    exercise_history_window(&store).await;
    assert_eq!(store.recommendation_count(), 1);
}

#[tokio::test]
async fn test_sqlite_store_contract() {
    let store = SqliteStore::in_memory().await.unwrap();
    exercise_empty_history(&store).await;
    exercise_upsert_idempotence(&store).await;
    exercise_recommendation_overwrite(&store).await;
    exercise_history_window(&store).await;
}

#[tokio::test]
async fn test_sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("riskflow.db");
    let url = format!("sqlite://{}", path.display());

    {
        let store = SqliteStore::new(&url).await.unwrap();
        store
            .upsert_alert(&alert("p1", "u9", "m9", 0.91, "2025-08-02T00:00:00Z"))
            .await
            .unwrap();
        store
            .save_recommendation("p1", &recommendation(Decision::Block, "persisted"))
            .await
            .unwrap();
    }

    let store = SqliteStore::new(&url).await.unwrap();
    let rec = store.get_recommendation("p1").await.unwrap().unwrap();
    assert_eq!(rec.rationale, "persisted");
    let window = store.recent(Some("u9"), None, 5).await.unwrap();
    assert_eq!(window.user_recent.len(), 1);
}
