//! Riskflow pipeline binary
//!
//! Runs both pipeline roles in one process, joined by in-process channels:
//! a JSONL replayer feeds raw events to the stream worker, escalated alerts
//! flow to the agent, and final recommendations are logged as they land.

mod config;
mod replay;

use crate::config::PipelineSettings;
use anyhow::{Context, Result};
use riskflow_agent::{
    ChannelEmitter, LlmClient, OllamaProvider, PolicyFallback, RecommendationEngine,
};
use riskflow_store::{AlertStore, SqliteStore};
use riskflow_worker::retry::RetryPolicy;
use riskflow_worker::sink::{TOPIC_ALERTS, TOPIC_SCORES};
use riskflow_worker::{ChannelSink, HttpRuleClient, HttpScoringClient, StreamWorker};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let settings = PipelineSettings::load()?;
    // Inconsistent thresholds are a startup error, never a runtime one
    settings.validate().context("invalid configuration")?;
    info!(
        worker_thresholds = ?settings.worker.thresholds,
        fallback_thresholds = ?settings.agent.fallback_thresholds,
        "configuration loaded"
    );

    let store = open_store(&settings.database_url).await?;

    // Channels joining the roles
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (alerts_tx, alerts_rx) = mpsc::unbounded_channel();
    let (scores_tx, mut scores_rx) = mpsc::unbounded_channel();
    let (recs_tx, mut recs_rx) = mpsc::unbounded_channel();

    // Stream worker role
    let timeout = Duration::from_millis(settings.worker.timeout_ms);
    let retry = RetryPolicy::new(settings.worker.max_retries, Duration::from_millis(100));
    let scoring = Arc::new(HttpScoringClient::new(
        settings.worker.model_api.clone(),
        timeout,
        retry,
    )?);
    let rules = Arc::new(HttpRuleClient::new(
        settings.worker.rules_api.clone(),
        timeout,
        retry,
    )?);
    let sink = Arc::new(
        ChannelSink::new()
            .with_route(TOPIC_ALERTS, alerts_tx)
            .with_route(TOPIC_SCORES, scores_tx),
    );
    let worker = StreamWorker::new(settings.worker.clone(), scoring, rules, sink)?;
    let worker_task = tokio::spawn(async move { worker.run(events_rx).await });

    // Agent role
    let llm: Option<Arc<dyn LlmClient>> = if settings.agent.llm_enabled {
        Some(Arc::new(OllamaProvider::new(
            settings.agent.llm_url.clone(),
            Duration::from_millis(settings.agent.timeout_ms),
        )?))
    } else {
        info!("reasoning service disabled, agent runs policy fallback only");
        None
    };
    let fallback = match &settings.agent.fallback_policy_file {
        Some(path) => PolicyFallback::from_config_file(Path::new(path))?,
        None => PolicyFallback::new(settings.agent.fallback_thresholds),
    };
    let engine = RecommendationEngine::new(
        llm,
        settings.agent.model.clone(),
        fallback,
        store,
        Arc::new(ChannelEmitter::new(recs_tx)),
        settings.agent.history_limit,
    );
    let agent_task = tokio::spawn(async move { engine.run(alerts_rx).await });

    // Telemetry and recommendation consumers
    let scores_task = tokio::spawn(async move {
        while let Some(record) = scores_rx.recv().await {
            debug!(telemetry = %record, "score record");
        }
    });
    let recs_task = tokio::spawn(async move {
        let mut count = 0u64;
        while let Some(rec) = recs_rx.recv().await {
            count += 1;
            info!(recommendation = %rec, "final recommendation");
        }
        info!(count, "recommendation channel closed");
    });

    // Feed events, then let everything drain: dropping each sender closes
    // the next stage's channel, so in-flight items complete instead of
    // being abandoned mid-write.
    match &settings.events_file {
        Some(path) => {
            replay::replay_file(Path::new(path), &events_tx, settings.replay_rate).await?;
        }
        None => info!("no events_file configured, nothing to replay"),
    }
    drop(events_tx);

    worker_task.await?;
    agent_task.await?;
    scores_task.await?;
    recs_task.await?;

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "riskflow=info,riskflow_worker=info,riskflow_agent=info,riskflow_store=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
    Ok(())
}

/// Open the configured store, creating the data directory when needed.
async fn open_store(database_url: &str) -> Result<Arc<dyn AlertStore>> {
    if database_url.contains(":memory:") {
        return Ok(Arc::new(SqliteStore::in_memory().await?));
    }
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent).ok();
        }
    }
    Ok(Arc::new(SqliteStore::new(database_url).await?))
}
