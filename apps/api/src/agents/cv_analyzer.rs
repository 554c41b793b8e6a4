//! CV Analyzer: extracts skills and highlights from resume text.
//!
//! Two sources are merged: a word-boundary scan over the fixed vocabulary
//! (always available) and an optional LLM extraction whose failures are
//! swallowed.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::agents::prompts::{SKILLS_PROMPT_TEMPLATE, SKILLS_SYSTEM};
use crate::agents::skills::{title_case, vocabulary};
use crate::llm_client::prompts::{clip_for_prompt, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{parse_json_object, ChatModel, ChatRequest, LlmError};
use crate::models::api::AnalyzeResponse;

const MAX_PROFILE_SKILLS: usize = 10;
const MAX_PROFILE_HIGHLIGHTS: usize = 3;
const MAX_HEURISTIC_LINE_CHARS: usize = 100;

/// Skills and highlights as returned by the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmSkills {
    pub skills: Vec<String>,
    pub highlights: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SkillsReply {
    #[serde(default)]
    skills: Vec<Value>,
    #[serde(default)]
    highlights: Vec<Value>,
}

/// NFD-decomposes, drops combining marks, lowercases and trims.
/// `"Développeur Python"` → `"developpeur python"`.
pub fn normalize_text(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// One compiled matcher per vocabulary skill. Edges behave like `\b` for
/// word characters and still match skills ending in symbols (`c++`, `c#`).
fn skill_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vocabulary()
            .filter_map(|skill| {
                let pattern = format!(r"(?:^|\W){}(?:\W|$)", regex::escape(skill));
                match Regex::new(&pattern) {
                    Ok(re) => Some((skill, re)),
                    Err(e) => {
                        warn!("Skipping skill pattern '{skill}': {e}");
                        None
                    }
                }
            })
            .collect()
    })
}

/// Scans normalized text for vocabulary skills; returns them title-cased in vocabulary order.
pub fn regex_scan_skills(text: &str) -> Vec<String> {
    let normalized = normalize_text(text);
    skill_patterns()
        .iter()
        .filter(|(_, re)| re.is_match(&normalized))
        .map(|(skill, _)| title_case(skill))
        .collect()
}

/// Asks the model for skills and highlights. Any failure yields an empty result.
pub async fn llm_extract_skills(text: &str, llm: &dyn ChatModel) -> LlmSkills {
    let prompt = SKILLS_PROMPT_TEMPLATE.replace("{text}", clip_for_prompt(text));
    let system = format!("{SKILLS_SYSTEM}\n{JSON_ONLY_INSTRUCTION}");
    let reply = llm
        .complete(ChatRequest {
            system: Some(&system),
            prompt: &prompt,
            max_tokens: 500,
            temperature: 0.3,
        })
        .await;

    match reply {
        Ok(content) => parse_skills_reply(&content),
        Err(e) => {
            warn!("LLM skill extraction failed: {e}");
            LlmSkills::default()
        }
    }
}

fn parse_skills_reply(content: &str) -> LlmSkills {
    match parse_json_object::<SkillsReply>(content) {
        Ok(reply) => LlmSkills {
            skills: strings_of(reply.skills),
            highlights: strings_of(reply.highlights),
        },
        Err(LlmError::NotJson | LlmError::Parse(_)) => {
            debug!("Skill reply was not JSON, classifying lines");
            classify_reply_lines(content)
        }
        Err(e) => {
            warn!("Unexpected skill reply error: {e}");
            LlmSkills::default()
        }
    }
}

fn strings_of(values: Vec<Value>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect()
}

/// Lines mentioning skill/experience/proficient are skills; other short lines are highlights.
fn classify_reply_lines(content: &str) -> LlmSkills {
    let mut result = LlmSkills::default();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.chars().count() >= MAX_HEURISTIC_LINE_CHARS {
            continue;
        }
        let lower = line.to_lowercase();
        if ["skill", "experience", "proficient"]
            .iter()
            .any(|k| lower.contains(k))
        {
            result.skills.push(line.to_string());
        } else {
            result.highlights.push(line.to_string());
        }
    }
    result
}

/// Concatenates both lists, title-cases, drops one-character entries and
/// deduplicates case-insensitively keeping first-seen order.
pub fn merge_and_dedupe_skills(regex_skills: &[String], llm_skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    regex_skills
        .iter()
        .chain(llm_skills)
        .map(|s| title_case(s.trim()))
        .filter(|s| s.chars().count() > 1)
        .filter(|s| seen.insert(s.to_lowercase()))
        .collect()
}

/// Full analysis: regex scan, optional LLM extraction, merge, summary text.
pub async fn analyze_profile(text: &str, llm: Option<&dyn ChatModel>) -> AnalyzeResponse {
    if text.trim().is_empty() {
        return AnalyzeResponse::default();
    }

    let regex_skills = regex_scan_skills(text);
    let llm_result = match llm {
        Some(llm) => llm_extract_skills(text, llm).await,
        None => LlmSkills::default(),
    };

    let skills = merge_and_dedupe_skills(&regex_skills, &llm_result.skills);
    debug!(
        "Profile analysis: {} regex skills, {} LLM skills, {} merged",
        regex_skills.len(),
        llm_result.skills.len(),
        skills.len()
    );

    let profile_text = build_profile_summary(&skills, &llm_result.highlights);

    AnalyzeResponse {
        skills,
        highlights: llm_result.highlights,
        profile_text,
    }
}

fn build_profile_summary(skills: &[String], highlights: &[String]) -> String {
    let top_skills: Vec<&str> = skills
        .iter()
        .take(MAX_PROFILE_SKILLS)
        .map(String::as_str)
        .collect();
    let mut summary = format!("Skills: {}", top_skills.join(", "));
    if !highlights.is_empty() {
        let top_highlights: Vec<&str> = highlights
            .iter()
            .take(MAX_PROFILE_HIGHLIGHTS)
            .map(String::as_str)
            .collect();
        summary.push_str(&format!(" | Highlights: {}", top_highlights.join("; ")));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    const RESUME: &str = "Jöhn Dœ — Développeur. Built REST API services in Python and Rust, \
        deployed with Docker on AWS. Familiar with C++ and CI/CD pipelines.";

    #[test]
    fn test_normalize_strips_diacritics_and_lowercases() {
        assert_eq!(normalize_text("  Développeur Éléphant "), "developpeur elephant");
    }

    #[test]
    fn test_regex_scan_finds_word_bounded_skills() {
        let skills = regex_scan_skills(RESUME);
        for expected in ["Python", "Rust", "C++", "Aws", "Docker", "Rest Api", "Ci/Cd"] {
            assert!(skills.contains(&expected.to_string()), "missing {expected}: {skills:?}");
        }
    }

    #[test]
    fn test_regex_scan_respects_word_boundaries() {
        // "go" inside "google" and "r" inside "rust" must not match.
        let skills = regex_scan_skills("google rustacean");
        assert!(!skills.contains(&"Go".to_string()));
        assert!(!skills.contains(&"R".to_string()));
        assert!(!skills.contains(&"Rust".to_string()));
    }

    #[test]
    fn test_regex_scan_matches_accented_input() {
        let skills = regex_scan_skills("Expérience en Sécurité: CRYPTOGRAPHY, Kubernetes");
        assert!(skills.contains(&"Cryptography".to_string()));
        assert!(skills.contains(&"Kubernetes".to_string()));
    }

    #[test]
    fn test_merge_dedupes_case_insensitively() {
        let merged = merge_and_dedupe_skills(
            &["Python".to_string(), "Docker".to_string()],
            &["python".to_string(), " DOCKER ".to_string(), "Leadership".to_string(), "x".to_string()],
        );
        assert_eq!(merged, vec!["Python", "Docker", "Leadership"]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let once = merge_and_dedupe_skills(
            &regex_scan_skills(RESUME),
            &["team LEADERSHIP".to_string(), "rust".to_string()],
        );
        let twice = merge_and_dedupe_skills(&once, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_regex_scan_is_idempotent_on_its_output() {
        let first = regex_scan_skills(RESUME);
        let second = regex_scan_skills(&first.join(", "));
        assert_eq!(first, second);
        assert_eq!(
            merge_and_dedupe_skills(&first, &[]),
            merge_and_dedupe_skills(&first, &first)
        );
    }

    #[test]
    fn test_parse_skills_reply_json_with_fences() {
        let reply = "```json\n{\"skills\": [\"Rust\", \"Tokio\"], \"highlights\": [\"Led a team of 4\"]}\n```";
        let parsed = parse_skills_reply(reply);
        assert_eq!(parsed.skills, vec!["Rust", "Tokio"]);
        assert_eq!(parsed.highlights, vec!["Led a team of 4"]);
    }

    #[test]
    fn test_parse_skills_reply_broken_json_classifies_lines() {
        let reply = "{ skills: Rust\nProficient in Go\nWon a hackathon";
        let parsed = parse_skills_reply(reply);
        assert_eq!(parsed.skills, vec!["{ skills: Rust", "Proficient in Go"]);
        assert_eq!(parsed.highlights, vec!["Won a hackathon"]);
    }

    #[tokio::test]
    async fn test_llm_failure_is_swallowed() {
        let model = ScriptedModel::failing(500);
        let result = llm_extract_skills(RESUME, &model).await;
        assert_eq!(result, LlmSkills::default());
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_analyze_profile_merges_llm_and_regex() {
        let model = ScriptedModel::new([
            r#"{"skills": ["python", "Public Speaking"], "highlights": ["Hackathon winner", "Open-source maintainer"]}"#,
        ]);
        let result = analyze_profile(RESUME, Some(&model)).await;

        assert!(result.skills.contains(&"Public Speaking".to_string()));
        assert_eq!(
            result.skills.iter().filter(|s| s.eq_ignore_ascii_case("python")).count(),
            1
        );
        assert_eq!(result.highlights.len(), 2);
        assert!(result.profile_text.starts_with("Skills: "));
        assert!(result
            .profile_text
            .ends_with(" | Highlights: Hackathon winner; Open-source maintainer"));
    }

    #[tokio::test]
    async fn test_analyze_profile_without_model_uses_regex_only() {
        let result = analyze_profile("Python and SQL", None).await;
        assert_eq!(result.skills, vec!["Python", "Sql"]);
        assert!(result.highlights.is_empty());
        assert_eq!(result.profile_text, "Skills: Python, Sql");
    }

    #[tokio::test]
    async fn test_analyze_blank_text_is_empty() {
        let model = ScriptedModel::new(["unused"]);
        let result = analyze_profile("   ", Some(&model)).await;
        assert_eq!(result, AnalyzeResponse::default());
        assert_eq!(model.calls(), 0);
    }
}
