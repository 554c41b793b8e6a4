//! Axum route handlers for agent registration metadata.

use std::path::Path as FsPath;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use crate::coral::registry::{agents, get_agent_metadata, AgentCache, AgentSpec};
use crate::errors::AppError;
use crate::state::AppState;

/// GET /v1/agents
///
/// Lists the agents with the ids recorded in the local cache. Always 200;
/// `status` is `no_cache`, `cached` or `error`.
pub async fn handle_list_agents(State(state): State<AppState>) -> Json<Value> {
    let cache_path = FsPath::new(&state.config.agent_cache_path);

    match AgentCache::load(cache_path).await {
        Ok(None) => Json(json!({
            "agents": [],
            "status": "no_cache",
            "message": "No agents registered yet",
        })),
        Ok(Some(cache)) => {
            let listed: Vec<Value> = agents()
                .iter()
                .map(|agent| {
                    json!({
                        "key": agent.key,
                        "name": agent.name,
                        "id": cache.agent_ids.get(agent.key).map(String::as_str).unwrap_or_default(),
                    })
                })
                .collect();
            Json(json!({
                "count": listed.len(),
                "agents": listed,
                "status": "cached",
                "updated_at": cache.updated_at,
            }))
        }
        Err(e) => {
            warn!("Failed to load agent cache: {e:#}");
            Json(json!({
                "error": format!("Failed to load agents: {e}"),
                "agents": [],
                "status": "error",
            }))
        }
    }
}

/// GET /v1/agents/:key
pub async fn handle_get_agent(Path(key): Path<String>) -> Result<Json<AgentSpec>, AppError> {
    get_agent_metadata(&key)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Unknown agent: {key}")))
}
