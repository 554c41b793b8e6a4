//! Matcher: scores job postings against a profile.
//!
//! Algorithm:
//! 1. Embed `[profile_text, job_text...]` and score each job as
//!    cosine × 100, clamped to [0, 100] and rounded to one decimal.
//! 2. Without a provider, or when it fails, fall back to a rank heuristic:
//!    `max(60, 95 − 5·rank)`.
//! 3. Missing skills are computed independently: vocabulary skills named as
//!    whole words in the description and not covered by a profile skill.
//! 4. Results are sorted by score, highest first.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::agents::skills::{title_case, vocabulary};
use crate::embeddings::{find_most_similar, EmbeddingProvider, SimilarText};
use crate::models::profile::{JobItem, MatchResult, UserProfile};

const MAX_MISSING_SKILLS: usize = 5;
const FALLBACK_TOP_SCORE: f64 = 95.0;
const FALLBACK_STEP: f64 = 5.0;
const FALLBACK_FLOOR: f64 = 60.0;
/// Skills this short ("r", "go", "c#") only match as whole tokens.
const SHORT_SKILL_CHARS: usize = 2;

/// `"Skills: a, b | Name: n | Email: e"`, omitting absent parts.
pub fn build_profile_text(profile: &UserProfile) -> String {
    let mut parts = Vec::new();
    if !profile.skills().is_empty() {
        parts.push(format!("Skills: {}", profile.skills().join(", ")));
    }
    if let Some(name) = &profile.name {
        parts.push(format!("Name: {name}"));
    }
    if let Some(email) = &profile.email {
        parts.push(format!("Email: {email}"));
    }
    parts.join(" | ")
}

/// `"Title: t | Company: c | Location: l | Description: d"`, omitting absent parts.
pub fn build_job_text(job: &JobItem) -> String {
    let mut parts = vec![format!("Title: {}", job.title), format!("Company: {}", job.company)];
    if let Some(location) = &job.location {
        parts.push(format!("Location: {location}"));
    }
    if let Some(desc) = &job.desc {
        parts.push(format!("Description: {desc}"));
    }
    parts.join(" | ")
}

/// Substring test, except that very short needles must be a whole token.
fn mentions(haystack: &str, needle: &str) -> bool {
    if needle.chars().count() > SHORT_SKILL_CHARS {
        return haystack.contains(needle);
    }
    haystack
        .split(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'))
        .any(|token| token == needle)
}

/// Whole-word occurrence: "git" is found in "git, linux" but not in "digital".
fn names_skill(desc: &str, skill: &str) -> bool {
    desc.match_indices(skill).any(|(start, _)| {
        let before = desc[..start].chars().next_back();
        let after = desc[start + skill.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Vocabulary skills named in the job description that no profile skill covers.
/// A profile skill covers a vocabulary skill when either mentions the other.
pub fn find_missing_skills(profile: &UserProfile, job: &JobItem) -> Vec<String> {
    let desc = match &job.desc {
        Some(desc) if !profile.skills().is_empty() => desc.to_lowercase(),
        _ => return vec![],
    };

    let profile_skills: Vec<String> = profile
        .skills()
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let mut seen = HashSet::new();
    vocabulary()
        .filter(|skill| names_skill(&desc, skill))
        .filter(|skill| {
            !profile_skills
                .iter()
                .any(|have| mentions(have, skill) || mentions(skill, have))
        })
        .map(title_case)
        .filter(|s| seen.insert(s.clone()))
        .take(MAX_MISSING_SKILLS)
        .collect()
}

/// Cosine similarity → score in [0, 100] with one decimal.
pub fn similarity_to_score(similarity: f64) -> f64 {
    ((similarity * 100.0).clamp(0.0, 100.0) * 10.0).round() / 10.0
}

/// Rank-based score used when embeddings are unavailable.
pub fn fallback_score(rank: usize) -> f64 {
    (FALLBACK_TOP_SCORE - FALLBACK_STEP * rank as f64).max(FALLBACK_FLOOR)
}

/// Scores and sorts `jobs` for `profile`. Never fails: embedding errors degrade to rank scoring.
pub async fn match_jobs(
    profile: &UserProfile,
    jobs: &[JobItem],
    embeddings: Option<&dyn EmbeddingProvider>,
) -> Vec<MatchResult> {
    if jobs.is_empty() {
        return vec![];
    }

    let scores = match embeddings {
        Some(provider) => embedding_scores(provider, profile, jobs).await,
        None => None,
    };
    let scores = scores.unwrap_or_else(|| (0..jobs.len()).map(fallback_score).collect());

    let mut results: Vec<MatchResult> = jobs
        .iter()
        .zip(scores)
        .map(|(job, score)| MatchResult {
            job: job.clone(),
            score,
            missing_skills: find_missing_skills(profile, job),
        })
        .collect();

    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results
}

/// Places ranked hits back at their input positions. Unranked jobs score 0.
fn scores_in_input_order(len: usize, ranked: &[SimilarText]) -> Vec<f64> {
    let mut scores = vec![0.0; len];
    for hit in ranked {
        if let Some(score) = scores.get_mut(hit.index) {
            *score = similarity_to_score(hit.similarity);
        }
    }
    scores
}

/// One score per job in input order, or `None` when the provider cannot be used.
async fn embedding_scores(
    provider: &dyn EmbeddingProvider,
    profile: &UserProfile,
    jobs: &[JobItem],
) -> Option<Vec<f64>> {
    let profile_text = build_profile_text(profile);
    let job_texts: Vec<String> = jobs.iter().map(build_job_text).collect();

    match find_most_similar(provider, &profile_text, &job_texts, job_texts.len()).await {
        Ok(ranked) => {
            let scores = scores_in_input_order(jobs.len(), &ranked);
            info!("Scored {} jobs with embeddings", jobs.len());
            Some(scores)
        }
        Err(e) => {
            warn!("Embeddings failed, using fallback scoring: {e}");
            None
        }
    }
}
