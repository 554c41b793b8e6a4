use serde::{Deserialize, Serialize};

/// Caller-supplied candidate profile. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
}

impl UserProfile {
    pub fn skills(&self) -> &[String] {
        self.skills.as_deref().unwrap_or_default()
    }
}

/// A job or internship posting. Treated as immutable input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobItem {
    pub id: String,
    pub source: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    pub url: String,
    #[serde(default)]
    pub desc: Option<String>,
}

/// One scored job for a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub job: JobItem,
    /// 0 – 100, one decimal place
    pub score: f64,
    pub missing_skills: Vec<String>,
}
