/// LLM Client: the single point of entry for all Mistral chat calls in InternAI.
///
/// Agents never talk to the provider directly; they take a `&dyn ChatModel`
/// so the HTTP client can be swapped for a scripted model in tests.
///
/// Model: mistral-medium-2508 (hardcoded, not configurable)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
/// The model used for all chat calls.
pub const MODEL: &str = "mistral-medium-2508";
/// Upper bound on attempts per call, whatever the configuration asks for.
pub const MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Reply is not a JSON object")]
    NotJson,

    #[error("Gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One chat completion: optional system prompt, a single user turn and sampling knobs.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: Option<&'a str>,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Anything that can answer a chat prompt with text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct MistralRequest<'a> {
    model: &'a str,
    messages: Vec<MistralMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct MistralMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Trimmed text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct MistralError {
    message: String,
}

/// Mistral chat-completions client with a per-request timeout and bounded retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_attempts: u32,
}

impl LlmClient {
    pub fn new(
        api_key: String,
        base_url: String,
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_attempts: max_attempts.clamp(1, MAX_ATTEMPTS),
        })
    }

    /// Makes a raw call to the chat API, returning the full response object.
    /// Retries on 429 and 5xx with exponential backoff while attempts remain.
    pub async fn call(&self, request: ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system {
            messages.push(MistralMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(MistralMessage {
            role: "user",
            content: request.prompt,
        });

        let body = MistralRequest {
            model: MODEL,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let text = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, text);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: text,
                });
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<MistralError>(&text)
                    .map(|e| e.message)
                    .unwrap_or(text);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat: ChatResponse = response.json().await?;

            if let Some(usage) = &chat.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(chat);
        }

        Err(last_error.unwrap_or(LlmError::Exhausted {
            attempts: self.max_attempts,
        }))
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, LlmError> {
        let response = self.call(request).await?;
        response
            .text()
            .map(String::from)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Exponential backoff before retry `attempt`: 1s, 2s, 4s, ...
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(1000u64.saturating_mul(factor))
}

/// Pulls the JSON payload out of a reply that may wrap it in ```json fences.
/// Fences may appear anywhere in the reply; text outside them is discarded.
pub fn extract_fenced_json(text: &str) -> &str {
    let body = if let Some((_, rest)) = text.split_once("```json") {
        rest.split("```").next().unwrap_or(rest)
    } else if let Some((_, rest)) = text.split_once("```") {
        rest.split("```").next().unwrap_or(rest)
    } else {
        text
    };
    body.trim()
}

/// Parses a model reply as a JSON object after stripping fences.
/// Replies that do not start with `{` are rejected without attempting a parse.
pub fn parse_json_object<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let body = extract_fenced_json(text);
    if !body.starts_with('{') {
        return Err(LlmError::NotJson);
    }
    serde_json::from_str(body).map_err(LlmError::Parse)
}

/// Scripted chat model for unit tests: pops one reply per call, errors once exhausted.
#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, u16>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// A model whose every call fails with the given HTTP status.
        pub fn failing(status: u16) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from(vec![Err(status); 8])),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, request: ChatRequest<'_>) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(request.prompt.to_string());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(status)) => Err(LlmError::Api {
                    status,
                    message: "scripted failure".to_string(),
                }),
                None => Err(LlmError::EmptyContent),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_extract_fenced_json_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_fenced_json(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_fenced_json_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_fenced_json(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_fenced_json_no_fences() {
        let input = "  {\"key\": \"value\"}  ";
        assert_eq!(extract_fenced_json(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_fenced_json_discards_surrounding_prose() {
        let input = "Sure! Here it is:\n```json\n{\"a\": 1}\n```\nGood luck.";
        assert_eq!(extract_fenced_json(input), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_json_object_rejects_non_object() {
        let err = parse_json_object::<Value>("1. Tell me about yourself").unwrap_err();
        assert!(matches!(err, LlmError::NotJson));
    }

    #[test]
    fn test_parse_json_object_reports_broken_json() {
        let err = parse_json_object::<Value>("{\"questions\": [").unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn test_chat_response_text_takes_first_choice_trimmed() {
        let json = r#"{
            "choices": [{"message": {"content": "  hello  "}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1}
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), Some("hello"));
    }

    #[test]
    fn test_chat_response_blank_content_is_none() {
        let json = r#"{"choices": [{"message": {"content": "   "}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_request_omits_system_message_when_absent() {
        let body = MistralRequest {
            model: MODEL,
            messages: vec![MistralMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: 10,
            temperature: 0.3,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["model"], MODEL);
    }

    #[tokio::test]
    async fn test_unreachable_provider_yields_http_error() {
        let client = LlmClient::new(
            "key".to_string(),
            "http://127.0.0.1:9".to_string(),
            Duration::from_millis(200),
            1,
        )
        .unwrap();
        let err = client
            .complete(ChatRequest {
                system: None,
                prompt: "hi",
                max_tokens: 5,
                temperature: 0.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
    }

    #[test]
    fn test_backoff_doubles_and_never_overflows() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(3), Duration::from_secs(4));
        assert_eq!(backoff_delay(200), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_attempts_are_clamped() {
        let client = |attempts| {
            LlmClient::new("key".to_string(), "http://x".to_string(), Duration::from_secs(1), attempts)
                .unwrap()
        };
        assert_eq!(client(0).max_attempts, 1);
        assert_eq!(client(1000).max_attempts, MAX_ATTEMPTS);
    }
}
