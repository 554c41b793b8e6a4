use anyhow::{Context, Result};

const MAX_LLM_ATTEMPTS: u32 = 5;

/// Application configuration loaded from environment variables.
/// Provider credentials are optional: without them every agent serves its fallback.
#[derive(Debug, Clone)]
pub struct Config {
    pub mistral_api_key: Option<String>,
    pub mistral_api_url: String,
    pub llm_max_attempts: u32,
    pub llm_timeout_secs: u64,
    pub embedding_batch_size: usize,
    pub coral_server_url: Option<String>,
    pub coral_api_key: Option<String>,
    pub agent_cache_path: String,
    pub sample_jobs_path: String,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            mistral_api_key: optional_env("MISTRAL_API_KEY"),
            mistral_api_url: env_or("MISTRAL_API_URL", "https://api.mistral.ai"),
            llm_max_attempts: bounded_attempts(&env_or("LLM_MAX_ATTEMPTS", "1"))?,
            llm_timeout_secs: env_or("LLM_TIMEOUT_SECS", "60")
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a number of seconds")?,
            embedding_batch_size: env_or("EMBEDDING_BATCH_SIZE", "100")
                .parse::<usize>()
                .context("EMBEDDING_BATCH_SIZE must be a positive integer")?
                .max(1),
            coral_server_url: optional_env("CORAL_SERVER_URL"),
            coral_api_key: optional_env("CORAL_API_KEY"),
            agent_cache_path: env_or("AGENT_CACHE_PATH", ".coral_agents.json"),
            sample_jobs_path: env_or("SAMPLE_JOBS_PATH", "data/sample_jobs.json"),
            cors_origins: parse_origins(&env_or(
                "CORS_ORIGINS",
                "http://localhost:3000,http://localhost:3001",
            )),
            environment: env_or("ENVIRONMENT", "development"),
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// True when both the Coral URL and key are present.
    pub fn coral_configured(&self) -> bool {
        self.coral_server_url.is_some() && self.coral_api_key.is_some()
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

/// `LLM_MAX_ATTEMPTS`, clamped to `1..=MAX_LLM_ATTEMPTS`.
fn bounded_attempts(raw: &str) -> Result<u32> {
    let attempts = raw
        .parse::<u32>()
        .context("LLM_MAX_ATTEMPTS must be a positive integer")?;
    Ok(attempts.clamp(1, MAX_LLM_ATTEMPTS))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
impl Config {
    /// Offline config used by handler tests: no providers, throwaway paths.
    pub fn for_tests() -> Self {
        Config {
            mistral_api_key: None,
            mistral_api_url: "http://127.0.0.1:9".to_string(),
            llm_max_attempts: 1,
            llm_timeout_secs: 1,
            embedding_batch_size: 100,
            coral_server_url: None,
            coral_api_key: None,
            agent_cache_path: "does-not-exist/.coral_agents.json".to_string(),
            sample_jobs_path: "does-not-exist/sample_jobs.json".to_string(),
            cors_origins: vec![],
            environment: "test".to_string(),
            port: 0,
            rust_log: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_drops_empty() {
        let origins = parse_origins(" http://a.test , ,http://b.test,");
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_coral_configured_requires_both_values() {
        let mut config = Config::for_tests();
        assert!(!config.coral_configured());
        config.coral_server_url = Some("http://coral.test".to_string());
        assert!(!config.coral_configured());
        config.coral_api_key = Some("key".to_string());
        assert!(config.coral_configured());
    }

    #[test]
    fn test_llm_attempts_are_bounded() {
        assert_eq!(bounded_attempts("0").unwrap(), 1);
        assert_eq!(bounded_attempts("3").unwrap(), 3);
        assert_eq!(bounded_attempts("64").unwrap(), MAX_LLM_ATTEMPTS);
        assert!(bounded_attempts("-1").is_err());
    }
}
