use std::path::Path;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::agents::job_scout::load_sample_jobs;
use crate::config::Config;
use crate::embeddings::EmbeddingProvider;
use crate::llm_client::ChatModel;
use crate::models::profile::JobItem;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Absent without `MISTRAL_API_KEY`; agents then serve their fallbacks.
    pub llm: Option<Arc<dyn ChatModel>>,
    pub embeddings: Option<Arc<dyn EmbeddingProvider>>,
    pub config: Config,
    /// Sample jobs, read from disk on first use and kept for the process lifetime.
    pub sample_jobs: Arc<OnceCell<Vec<JobItem>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        llm: Option<Arc<dyn ChatModel>>,
        embeddings: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Self {
        Self {
            llm,
            embeddings,
            config,
            sample_jobs: Arc::new(OnceCell::new()),
        }
    }

    pub fn chat_model(&self) -> Option<&dyn ChatModel> {
        self.llm.as_deref()
    }

    pub fn embedding_provider(&self) -> Option<&dyn EmbeddingProvider> {
        self.embeddings.as_deref()
    }

    pub async fn sample_jobs(&self) -> &[JobItem] {
        self.sample_jobs
            .get_or_init(|| load_sample_jobs(Path::new(&self.config.sample_jobs_path)))
            .await
    }
}
