//! Interview Coach: role/company interview questions and tips.
//!
//! Reply handling is a three-step repair chain:
//! 1. parse the reply as JSON;
//! 2. on a broken JSON object, ask the model once to fix it;
//! 3. otherwise split the text heuristically into questions and tips.
//!
//! If the first call fails outright a templated set is returned. Every path
//! is capped at `MAX_QUESTIONS` questions and `MAX_TIPS` tips.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::agents::prompts::{COACH_PROMPT_TEMPLATE, COACH_REPAIR_PROMPT_TEMPLATE, COACH_SYSTEM};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{extract_fenced_json, parse_json_object, ChatModel, ChatRequest, LlmError};
use crate::models::api::{CoachResponse, QuestionItem};

pub const MAX_QUESTIONS: usize = 5;
pub const MAX_TIPS: usize = 3;
/// Heuristic lines this short are headings or noise.
const MIN_HEURISTIC_LINE_CHARS: usize = 10;

const TIP_MARKERS: &[&str] = &["tip", "advice", "improvement", "recommendation"];
const QUESTION_MARKERS: &[&str] = &["question", "ask", "interview"];

#[derive(Debug, Deserialize)]
struct CoachingReply {
    #[serde(default)]
    questions: Vec<Value>,
    #[serde(default)]
    tips: Value,
}

/// Generates coaching for `role` at `company`. Never fails.
pub async fn interview_coach(
    llm: Option<&dyn ChatModel>,
    role: &str,
    company: &str,
    skills: &[String],
) -> CoachResponse {
    let Some(llm) = llm else {
        debug!("No chat model configured, serving template coaching");
        return template_coaching(role, company);
    };

    let skills_text = if skills.is_empty() {
        "various technical skills".to_string()
    } else {
        skills.join(", ")
    };
    let prompt = COACH_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace("{company}", company)
        .replace("{skills}", &skills_text);
    let system = format!("{COACH_SYSTEM}\n{JSON_ONLY_INSTRUCTION}");

    let reply = llm
        .complete(ChatRequest {
            system: Some(&system),
            prompt: &prompt,
            max_tokens: 1200,
            temperature: 0.6,
        })
        .await;

    match reply {
        Ok(content) => repair_coaching_reply(llm, &content).await,
        Err(e) => {
            warn!("Interview coaching call failed: {e}");
            template_coaching(role, company)
        }
    }
}

/// Parse → one repair round-trip → heuristic split.
pub async fn repair_coaching_reply(llm: &dyn ChatModel, content: &str) -> CoachResponse {
    let cleaned = extract_fenced_json(content);

    match parse_json_object::<CoachingReply>(cleaned) {
        Ok(reply) => return normalize_reply(reply),
        Err(LlmError::Parse(e)) => {
            info!("Coaching reply was broken JSON ({e}), asking for a repair");
            if let Some(repaired) = request_repair(llm, cleaned).await {
                return repaired;
            }
        }
        Err(_) => debug!("Coaching reply is plain text"),
    }

    parse_coaching_text(cleaned)
}

async fn request_repair(llm: &dyn ChatModel, broken: &str) -> Option<CoachResponse> {
    let prompt = COACH_REPAIR_PROMPT_TEMPLATE.replace("{content}", broken);
    let reply = llm
        .complete(ChatRequest {
            system: None,
            prompt: &prompt,
            max_tokens: 800,
            temperature: 0.3,
        })
        .await;

    match reply.and_then(|text| parse_json_object::<CoachingReply>(&text)) {
        Ok(reply) => Some(normalize_reply(reply)),
        Err(e) => {
            warn!("Coaching JSON repair failed: {e}");
            None
        }
    }
}

/// Keeps object questions with a string `q`, upgrades bare strings, stringifies tips.
fn normalize_reply(reply: CoachingReply) -> CoachResponse {
    let questions = reply
        .questions
        .into_iter()
        .filter_map(|q| match q {
            Value::Object(map) => {
                let text = map.get("q").and_then(Value::as_str)?.to_string();
                Some(match map.get("ideal_answer").and_then(Value::as_str) {
                    Some(answer) => QuestionItem::new(text, answer),
                    None => QuestionItem::with_default_answer(text),
                })
            }
            Value::String(text) => Some(QuestionItem::with_default_answer(text)),
            _ => None,
        })
        .take(MAX_QUESTIONS)
        .collect();

    let tips = match reply.tips {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|tip| match tip {
                Value::String(s) if s.trim().is_empty() => None,
                Value::String(s) => Some(s),
                Value::Null | Value::Bool(false) => None,
                other => Some(other.to_string()),
            })
            .take(MAX_TIPS)
            .collect(),
        _ => vec![],
    };

    CoachResponse { questions, tips }
}

fn list_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"^[\d.\-*•)]+\s*").expect("static regex"))
}

fn paragraph_break() -> &'static Regex {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    BREAK.get_or_init(|| Regex::new(r"\n\s*\n").expect("static regex"))
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Questions,
    Tips,
}

/// Splits free text into questions and tips by section keywords and list markers.
/// Missing sections are filled with generic defaults.
pub fn parse_coaching_text(content: &str) -> CoachResponse {
    let mut questions = Vec::new();
    let mut tips = Vec::new();
    let mut section = Section::Questions;

    for paragraph in paragraph_break().split(content).map(str::trim) {
        if paragraph.is_empty() {
            continue;
        }

        let lower = paragraph.to_lowercase();
        if TIP_MARKERS.iter().any(|k| lower.contains(k)) {
            section = Section::Tips;
        } else if QUESTION_MARKERS.iter().any(|k| lower.contains(k)) {
            section = Section::Questions;
        }

        for line in paragraph.lines().map(str::trim) {
            let line = list_marker().replace(line, "");
            if line.chars().count() <= MIN_HEURISTIC_LINE_CHARS {
                continue;
            }
            match section {
                Section::Questions if questions.len() < MAX_QUESTIONS => {
                    questions.push(QuestionItem::with_default_answer(line.into_owned()))
                }
                Section::Tips if tips.len() < MAX_TIPS => tips.push(line.into_owned()),
                _ => {}
            }
        }
    }

    if questions.is_empty() {
        questions = [
            "Tell me about your relevant experience.",
            "What interests you about this role?",
            "How do you handle challenges?",
            "What are your career goals?",
            "Do you have any questions for us?",
        ]
        .into_iter()
        .map(QuestionItem::with_default_answer)
        .collect();
    }

    if tips.is_empty() {
        tips = vec![
            "Research the company thoroughly before the interview.".to_string(),
            "Prepare specific examples of your achievements.".to_string(),
            "Practice explaining your experience clearly.".to_string(),
        ];
    }

    CoachResponse { questions, tips }
}

/// Coaching served when the model is unavailable.
pub fn template_coaching(role: &str, company: &str) -> CoachResponse {
    let company = if company.trim().is_empty() {
        "the company"
    } else {
        company
    };

    CoachResponse {
        questions: vec![
            QuestionItem::new(
                format!("Tell me about your experience with {role} and what interests you most about this field."),
                "Focus on specific projects, technologies, or experiences that demonstrate your passion and relevant skills.",
            ),
            QuestionItem::new(
                format!("What do you know about {company} and why do you want to work here?"),
                "Research their products, mission, recent news, and company culture. Show genuine interest and alignment with their values.",
            ),
            QuestionItem::new(
                "Describe a challenging project you've worked on and how you overcame obstacles.",
                "Use the STAR method: describe the Situation, Task, Action you took, and Result achieved. Show problem-solving skills.",
            ),
            QuestionItem::new(
                format!("Where do you see yourself in 5 years, and how does this {role} role fit into your career goals?"),
                "Show long-term thinking while demonstrating how this role is a stepping stone toward your career aspirations.",
            ),
            QuestionItem::new(
                "Do you have any questions about the role or company culture?",
                "Ask thoughtful questions about team dynamics, growth opportunities, or specific projects you'd work on.",
            ),
        ],
        tips: vec![
            format!("Research {company} thoroughly - understand their products, mission, and recent news."),
            "Prepare specific examples of your work using the STAR method (Situation, Task, Action, Result).".to_string(),
            "Practice explaining technical concepts in simple terms for non-technical interviewers.".to_string(),
        ],
    }
}
