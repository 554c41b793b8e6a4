//! Request / response bodies for the public and agent endpoints.

use serde::{Deserialize, Serialize};

use crate::models::profile::{JobItem, MatchResult, UserProfile};

/// Guidance attached to questions the model returned without one.
pub const DEFAULT_IDEAL_ANSWER: &str = "Provide a specific example from your experience.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub resume_text: Option<String>,
}

impl AnalyzeRequest {
    /// `text` wins over `resume_text`; blank values count as absent.
    pub fn body(&self) -> &str {
        [self.text.as_deref(), self.resume_text.as_deref()]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub skills: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub profile_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRequest {
    pub profile: UserProfile,
    pub jobs: Vec<JobItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchesResponse {
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WriteRequest {
    pub job: JobItem,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteResponse {
    pub cover_letter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoachRequest {
    pub role: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

/// Body of `/v1/local/coach`: skills are passed directly instead of via a profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalCoachRequest {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionItem {
    pub q: String,
    pub ideal_answer: String,
}

impl QuestionItem {
    pub fn new(q: impl Into<String>, ideal_answer: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ideal_answer: ideal_answer.into(),
        }
    }

    pub fn with_default_answer(q: impl Into<String>) -> Self {
        Self::new(q, DEFAULT_IDEAL_ANSWER)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoachResponse {
    pub questions: Vec<QuestionItem>,
    pub tips: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_body_prefers_text() {
        let req = AnalyzeRequest {
            text: Some("primary".to_string()),
            resume_text: Some("secondary".to_string()),
        };
        assert_eq!(req.body(), "primary");
    }

    #[test]
    fn test_analyze_body_falls_back_to_resume_text() {
        let req = AnalyzeRequest {
            text: Some("   ".to_string()),
            resume_text: Some("resume".to_string()),
        };
        assert_eq!(req.body(), "resume");
        assert_eq!(AnalyzeRequest::default().body(), "");
    }

    #[test]
    fn test_coach_request_company_optional() {
        let req: CoachRequest = serde_json::from_str(r#"{"role": "Data Intern"}"#).unwrap();
        assert!(req.company.is_none());
        assert!(req.profile.is_none());
    }

    #[test]
    fn test_local_coach_request_defaults() {
        let req: LocalCoachRequest = serde_json::from_str("{}").unwrap();
        assert!(req.role.is_empty());
        assert!(req.skills.is_empty());
    }
}
