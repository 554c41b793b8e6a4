//! Agent definitions and their registration with the Coral platform.
//!
//! Registration order per agent:
//! 1. an id already in the local cache is kept;
//! 2. otherwise a remote agent with the same display name is adopted;
//! 3. otherwise the agent is registered.
//!
//! Failures are logged and skipped; startup never aborts on Coral errors.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::coral::client::{AgentPlatform, AgentRegistration, RemoteAgent};

/// Static description of one agent exposed to the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSpec {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Value,
    pub endpoint: &'static str,
}

impl AgentSpec {
    fn registration(&self) -> AgentRegistration<'_> {
        AgentRegistration {
            name: self.name,
            description: self.description,
            schema: &self.schema,
            endpoint: self.endpoint,
            pricing: None,
        }
    }
}

/// The five InternAI agents, in registration order.
pub fn agents() -> &'static [AgentSpec] {
    static AGENTS: OnceLock<Vec<AgentSpec>> = OnceLock::new();
    AGENTS.get_or_init(|| {
        vec![
            AgentSpec {
                key: "cv_analyzer",
                name: "CV Analyzer",
                description: "Extracts skills & highlights from resume/LinkedIn.",
                schema: json!({
                    "input": {
                        "type": "object",
                        "properties": {"text": {"type": "string"}},
                        "required": ["text"]
                    },
                    "output": {
                        "type": "object",
                        "properties": {"skills": {"type": "array", "items": {"type": "string"}}}
                    }
                }),
                endpoint: "/v1/local/cv_analyzer",
            },
            AgentSpec {
                key: "job_scout",
                name: "Job Scout",
                description: "Returns curated internship listings.",
                schema: json!({
                    "input": {"type": "object", "properties": {"filters": {"type": "object"}}},
                    "output": {"type": "object", "properties": {"jobs": {"type": "array"}}}
                }),
                endpoint: "/v1/local/job_scout",
            },
            AgentSpec {
                key: "matcher",
                name: "Matcher",
                description: "Embeddings-based job matching.",
                schema: json!({
                    "input": {
                        "type": "object",
                        "properties": {"profile": {"type": "object"}, "jobs": {"type": "array"}},
                        "required": ["profile", "jobs"]
                    },
                    "output": {"type": "object", "properties": {"matches": {"type": "array"}}}
                }),
                endpoint: "/v1/local/matcher",
            },
            AgentSpec {
                key: "app_writer",
                name: "Application Writer",
                description: "Role/company-specific cover letter drafting.",
                schema: json!({
                    "input": {
                        "type": "object",
                        "properties": {"job": {"type": "object"}, "profile": {"type": "object"}},
                        "required": ["job", "profile"]
                    },
                    "output": {"type": "object", "properties": {"cover_letter": {"type": "string"}}}
                }),
                endpoint: "/v1/local/app_writer",
            },
            AgentSpec {
                key: "coach",
                name: "Interview Coach",
                description: "Q&A + tips for interviews.",
                schema: json!({
                    "input": {
                        "type": "object",
                        "properties": {"role": {"type": "string"}, "company": {"type": "string"}},
                        "required": ["role"]
                    },
                    "output": {
                        "type": "object",
                        "properties": {"questions": {"type": "array"}, "tips": {"type": "array"}}
                    }
                }),
                endpoint: "/v1/local/coach",
            },
        ]
    })
}

pub fn get_agent_metadata(key: &str) -> Option<&'static AgentSpec> {
    agents().iter().find(|agent| agent.key == key)
}

pub fn list_agent_names() -> Vec<&'static str> {
    agents().iter().map(|agent| agent.key).collect()
}

pub fn list_agent_display_names() -> Vec<&'static str> {
    agents().iter().map(|agent| agent.name).collect()
}

/// On-disk record of registered agent ids, keyed by agent key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentCache {
    #[serde(default)]
    pub agent_ids: BTreeMap<String, String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AgentCache {
    /// `Ok(None)` when the file does not exist; an error when it cannot be read or parsed.
    pub async fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading agent cache {}", path.display()))
            }
        };
        let cache = serde_json::from_str(&raw)
            .with_context(|| format!("parsing agent cache {}", path.display()))?;
        Ok(Some(cache))
    }

    pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
        let body = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, body)
            .await
            .with_context(|| format!("writing agent cache {}", path.display()))
    }
}

/// Makes sure every agent has a platform id and persists the result.
/// Returns the agent key → id map, which may be partial if registrations failed.
pub async fn ensure_agents_registered(
    platform: &dyn AgentPlatform,
    cache_path: &Path,
) -> BTreeMap<String, String> {
    let mut agent_ids = match AgentCache::load(cache_path).await {
        Ok(cache) => cache.unwrap_or_default().agent_ids,
        Err(e) => {
            warn!("Ignoring unreadable agent cache: {e:#}");
            BTreeMap::new()
        }
    };

    let remote: Vec<RemoteAgent> = platform.list_agents().await.unwrap_or_else(|e| {
        warn!("Could not fetch existing agents from Coral: {e}");
        vec![]
    });

    for agent in agents() {
        if let Some(id) = agent_ids.get(agent.key) {
            info!("Agent '{}' already cached with id {id}", agent.key);
            continue;
        }

        if let Some(existing) = remote.iter().find(|r| r.name == agent.name) {
            info!("Agent '{}' already exists on Coral with id {}", agent.name, existing.agent_id);
            agent_ids.insert(agent.key.to_string(), existing.agent_id.clone());
            continue;
        }

        match platform.register_agent(&agent.registration()).await {
            Ok(registered) => {
                info!("Registered agent '{}' with id {}", agent.key, registered.agent_id);
                agent_ids.insert(agent.key.to_string(), registered.agent_id);
            }
            Err(e) => warn!("Failed to register agent '{}': {e}", agent.key),
        }
    }

    let cache = AgentCache {
        agent_ids,
        updated_at: Some(Utc::now()),
    };
    if let Err(e) = cache.save(cache_path).await {
        warn!("Failed to save agent cache: {e:#}");
    }

    cache.agent_ids
}
