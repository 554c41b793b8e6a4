/// Coral REST client: agent listing and registration.
///
/// Callers depend on `AgentPlatform` so registration can run against an
/// in-memory platform in tests.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const AGENTS_PATH: &str = "/api/v1/agents";

#[derive(Debug, Error)]
pub enum CoralError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Coral API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// An agent as known to the platform.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteAgent {
    #[serde(alias = "id")]
    pub agent_id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Registration payload for one agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRegistration<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub schema: &'a Value,
    pub endpoint: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<&'a Value>,
}

/// `GET /agents` may answer with a bare list or wrap it in `{"agents": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum AgentList {
    Bare(Vec<RemoteAgent>),
    Wrapped { agents: Vec<RemoteAgent> },
}

/// Operations the registry needs from an agent platform.
#[async_trait]
pub trait AgentPlatform: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<RemoteAgent>, CoralError>;

    async fn register_agent(
        &self,
        registration: &AgentRegistration<'_>,
    ) -> Result<RemoteAgent, CoralError>;
}

#[derive(Clone)]
pub struct CoralClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CoralClient {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, CoralError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, AGENTS_PATH, path)
    }

    async fn check(response: Response) -> Result<Response, CoralError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(CoralError::Api {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl AgentPlatform for CoralClient {
    async fn list_agents(&self) -> Result<Vec<RemoteAgent>, CoralError> {
        let response = self
            .client
            .get(self.url(""))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let agents = match Self::check(response).await?.json::<AgentList>().await? {
            AgentList::Bare(agents) | AgentList::Wrapped { agents } => agents,
        };
        debug!("Coral lists {} agents", agents.len());
        Ok(agents)
    }

    async fn register_agent(
        &self,
        registration: &AgentRegistration<'_>,
    ) -> Result<RemoteAgent, CoralError> {
        let response = self
            .client
            .post(self.url(""))
            .bearer_auth(&self.api_key)
            .json(registration)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
