//! Job Scout: serves the curated sample job list with simple filters.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::models::profile::JobItem;

/// Optional filters for `/v1/local/job_scout`. Absent fields do not filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilters {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Reads the sample job file. A missing or malformed file yields an empty list.
pub async fn load_sample_jobs(path: &Path) -> Vec<JobItem> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Sample jobs unavailable at {}: {e}", path.display());
            return vec![];
        }
    };

    match serde_json::from_str::<Vec<JobItem>>(&raw) {
        Ok(jobs) => {
            info!("Loaded {} sample jobs from {}", jobs.len(), path.display());
            jobs
        }
        Err(e) => {
            warn!("Sample jobs file {} is malformed: {e}", path.display());
            vec![]
        }
    }
}

fn matches_keywords(job: &JobItem, keywords: &[String]) -> bool {
    let keywords: Vec<String> = keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if keywords.is_empty() {
        return true;
    }

    let title = job.title.to_lowercase();
    let desc = job.desc.as_deref().unwrap_or_default().to_lowercase();
    keywords
        .iter()
        .any(|k| title.contains(k.as_str()) || desc.contains(k.as_str()))
}

fn matches_location(job: &JobItem, location: Option<&str>) -> bool {
    match location.map(str::trim).filter(|l| !l.is_empty()) {
        None => true,
        Some(wanted) => job
            .location
            .as_deref()
            .is_some_and(|l| l.to_lowercase().contains(&wanted.to_lowercase())),
    }
}

/// Keyword (any, in title or description), location substring, then limit.
pub fn filter_jobs(jobs: &[JobItem], filters: &JobFilters) -> Vec<JobItem> {
    jobs.iter()
        .filter(|job| matches_keywords(job, &filters.keywords))
        .filter(|job| matches_location(job, filters.location.as_deref()))
        .take(filters.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}
