use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::coral::registry::list_agent_names;
use crate::state::AppState;

const API_VERSION: &str = "1.0.0";

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "InternAI API",
        "version": API_VERSION,
        "description": "AI-powered internship matching and application assistance platform"
    }))
}

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "ok": true,
        "status": "healthy"
    }))
}

/// GET /api/info
/// Deployment environment, available agents and whether Coral is configured.
pub async fn api_info_handler(State(state): State<AppState>) -> Json<Value> {
    let coral_status = if state.config.coral_configured() {
        "configured"
    } else {
        "disconnected"
    };

    Json(json!({
        "api_version": API_VERSION,
        "environment": state.config.environment,
        "features": list_agent_names(),
        "coral_status": coral_status
    }))
}
