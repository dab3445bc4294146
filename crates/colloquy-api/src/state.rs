//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the REST API.
//! Services are generic over repository/provider traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use colloquy_core::analysis::pipeline::AnalysisPipeline;
use colloquy_core::scenario::catalog::ScenarioCatalog;
use colloquy_core::session::service::SessionService;
use colloquy_core::turn::engine::TurnEngine;
use colloquy_infra::config::load_config;
use colloquy_infra::llm::anthropic::AnthropicProvider;
use colloquy_infra::paths::{resolve_data_dir, scenarios_dir};
use colloquy_infra::speech::transcriber::SpeechTranscriber;
use colloquy_infra::speech::voice::VoiceSynthesizer;
use colloquy_infra::sqlite::pool::DatabasePool;
use colloquy_infra::sqlite::session::SqliteSessionRepository;
use colloquy_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra
/// implementations.
pub type ConcreteSessionService = SessionService<SqliteSessionRepository>;
pub type ConcreteTurnEngine = TurnEngine<AnthropicProvider>;
pub type ConcreteAnalysisPipeline = AnalysisPipeline<SqliteSessionRepository, AnthropicProvider>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<ConcreteSessionService>,
    pub turn_engine: Arc<ConcreteTurnEngine>,
    pub analysis: ConcreteAnalysisPipeline,
    pub transcriber: Arc<SpeechTranscriber>,
    /// Absent when `COLLOQUY_VOICE_API_KEY` is not set.
    pub voice: Option<Arc<VoiceSynthesizer>>,
    /// SHA-256 hex of the staff bearer token; absent disables staff routes.
    pub staff_token_hash: Option<String>,
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, load the scenario
    /// catalog, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        // Initialize database
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("colloquy.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        // Scenario catalog: the data dir takes priority, with the
        // repo-local seed directory as a fallback for fresh installs.
        let mut catalog = ScenarioCatalog::load_from_dir(&scenarios_dir(&data_dir)).await;
        if catalog.is_empty() {
            catalog = ScenarioCatalog::load_from_dir(std::path::Path::new("scenarios")).await;
        }
        if catalog.is_empty() {
            warn!("Scenario catalog is empty; session creation will always 404");
        } else {
            info!(scenarios = catalog.len(), "Scenario catalog loaded");
        }

        // LLM provider, shared by the turn engine and the analysis pipeline.
        let api_key = match std::env::var("ANTHROPIC_API_KEY") {
            Ok(key) => SecretString::from(key),
            Err(_) => {
                warn!("ANTHROPIC_API_KEY not set; model calls will fail with auth errors");
                SecretString::from("")
            }
        };
        let provider = Arc::new(AnthropicProvider::new(api_key));

        let sessions = Arc::new(SessionService::new(
            SqliteSessionRepository::new(db_pool.clone()),
            catalog,
        ));
        let turn_engine = Arc::new(TurnEngine::new(
            Arc::clone(&provider),
            config.llm.model.clone(),
        ));
        let analysis = AnalysisPipeline::new(
            Arc::new(SqliteSessionRepository::new(db_pool.clone())),
            provider,
            config.llm.model.clone(),
        );

        let transcriber = Arc::new(SpeechTranscriber::new(&config.speech));

        let voice = std::env::var("COLLOQUY_VOICE_API_KEY")
            .ok()
            .map(|key| Arc::new(VoiceSynthesizer::new(SecretString::from(key), &config.voice)));
        if voice.is_none() {
            info!("COLLOQUY_VOICE_API_KEY not set; speech synthesis disabled");
        }

        let staff_token_hash = std::env::var("COLLOQUY_STAFF_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(|t| hash_token(&t));
        if staff_token_hash.is_none() {
            info!("COLLOQUY_STAFF_TOKEN not set; staff routes answer 503");
        }

        Ok(Self {
            sessions,
            turn_engine,
            analysis,
            transcriber,
            voice,
            staff_token_hash,
            config,
            data_dir,
            db_pool,
        })
    }
}

/// Compute the SHA-256 hash of a bearer token (lowercase hex).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{digest:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = hash_token("staff-secret");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("staff-secret"));
        assert_ne!(hash, hash_token("other-secret"));
    }
}
