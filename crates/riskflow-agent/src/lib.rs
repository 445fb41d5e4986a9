//! Riskflow Agent - the second pipeline role
//!
//! Consumes high-risk alerts, enriches them with a short history window,
//! obtains a structured decision from an untrusted external reasoning
//! service, validates it strictly, and falls back to a deterministic policy
//! whenever that service is unavailable or returns malformed output. Every
//! well-formed alert ends with exactly one persisted recommendation.

pub mod config;
pub mod decode;
pub mod emit;
pub mod engine;
pub mod error;
pub mod llm;
pub mod policy;
pub mod prompt;

pub use config::AgentSettings;
pub use decode::{decode_recommendation, RecommendationPayload, RejectReason};
pub use emit::{ChannelEmitter, MockEmitter, RecommendationEmitter, TOPIC_RECOMMENDATIONS};
pub use engine::{Outcome, RecommendationEngine};
pub use error::{AgentError, Result};
pub use llm::{LlmClient, LlmRequest, LlmResponse, MockProvider, OllamaProvider};
pub use policy::PolicyFallback;
