mod agents;
mod config;
mod coral;
mod embeddings;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::coral::client::CoralClient;
use crate::coral::registry::{agents, ensure_agents_registered, list_agent_display_names};
use crate::embeddings::{EmbeddingProvider, MistralEmbeddings};
use crate::llm_client::{ChatModel, LlmClient};
use crate::routes::{build_router, cors_layer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting InternAI API v{}", env!("CARGO_PKG_VERSION"));

    let (llm, embeddings) = build_providers(&config);
    if llm.is_none() {
        warn!("MISTRAL_API_KEY not set; agents will serve fallback content");
    }

    info!("Agents: {}", list_agent_display_names().join(", "));
    register_agents(&config).await;

    let state = AppState::new(config.clone(), llm, embeddings);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Chat and embedding clients, present only when a Mistral key is configured.
fn build_providers(
    config: &Config,
) -> (Option<Arc<dyn ChatModel>>, Option<Arc<dyn EmbeddingProvider>>) {
    let Some(api_key) = config.mistral_api_key.clone() else {
        return (None, None);
    };
    let timeout = Duration::from_secs(config.llm_timeout_secs);

    let llm: Option<Arc<dyn ChatModel>> = match LlmClient::new(
        api_key.clone(),
        config.mistral_api_url.clone(),
        timeout,
        config.llm_max_attempts,
    ) {
        Ok(client) => {
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!("Could not build LLM client: {e}");
            None
        }
    };

    let embeddings: Option<Arc<dyn EmbeddingProvider>> =
        match MistralEmbeddings::new(api_key, config.mistral_api_url.clone(), timeout) {
            Ok(client) => {
                let client = client.with_batch_size(config.embedding_batch_size);
                info!("Embeddings client initialized (model: {})", embeddings::EMBEDDING_MODEL);
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!("Could not build embeddings client: {e}");
                None
            }
        };

    (llm, embeddings)
}

/// Registers the agents with Coral when it is configured. Never fails startup.
async fn register_agents(config: &Config) {
    let (Some(url), Some(key)) = (&config.coral_server_url, &config.coral_api_key) else {
        info!("Coral not configured; skipping agent registration");
        return;
    };

    let timeout = Duration::from_secs(config.llm_timeout_secs);
    match CoralClient::new(url, key.clone(), timeout) {
        Ok(coral) => {
            let ids = ensure_agents_registered(&coral, Path::new(&config.agent_cache_path)).await;
            info!(
                "Coral registration finished: {}/{} agents have ids",
                ids.len(),
                agents().len()
            );
        }
        Err(e) => warn!("Could not build Coral client: {e}"),
    }
}
