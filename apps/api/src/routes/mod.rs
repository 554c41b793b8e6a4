pub mod health;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::agents::handlers;
use crate::config::Config;
use crate::coral::handlers as coral_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/info", get(health::api_info_handler))
        // Public agent API
        .route("/v1/jobs/sample", get(handlers::handle_sample_jobs))
        .route("/v1/analyze", post(handlers::handle_analyze))
        .route("/v1/analyze/upload", post(handlers::handle_analyze_upload))
        .route("/v1/match", post(handlers::handle_match))
        .route("/v1/write", post(handlers::handle_write))
        .route("/v1/coach", post(handlers::handle_coach))
        // Endpoints invoked by the agent platform
        .route("/v1/local/cv_analyzer", post(handlers::handle_local_cv_analyzer))
        .route("/v1/local/job_scout", post(handlers::handle_local_job_scout))
        .route("/v1/local/matcher", post(handlers::handle_local_matcher))
        .route("/v1/local/app_writer", post(handlers::handle_local_app_writer))
        .route("/v1/local/coach", post(handlers::handle_local_coach))
        // Registration metadata
        .route("/v1/agents", get(coral_handlers::handle_list_agents))
        .route("/v1/agents/:key", get(coral_handlers::handle_get_agent))
        .with_state(state)
}

/// CORS for the configured origins with credentials. A `*` entry mirrors the request origin.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origin = if config.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring invalid CORS origin '{o}': {e}");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
