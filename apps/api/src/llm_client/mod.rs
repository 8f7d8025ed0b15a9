//! LLM client — every model call made by the generation tasks goes through here.
//!
//! One `LlmClient` is built in `main` and cloned into each task. It shares a
//! pooled `reqwest::Client`, so the three concurrent calls of an application
//! reuse connections. Transient upstream failures (429, 5xx, transport errors)
//! are retried with backoff; anything else fails the call immediately.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
/// Model used for every generation task.
pub const MODEL: &str = "claude-sonnet-4-5";
const ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to the model failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model API returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("model API still failing after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<LlmError> },

    #[error("model output was not the expected JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("model output was cut off at the token limit")]
    Truncated,

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Sampling parameters for a single call.
#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    /// All text blocks joined in order. Non-text blocks are skipped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect()
    }

    pub fn hit_token_limit(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Result of one HTTP attempt.
enum Attempt {
    Done(MessagesResponse),
    Retry(LlmError),
    Fail(LlmError),
}

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Sends one prompt, retrying transient failures up to `ATTEMPTS` times.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        options: CallOptions,
    ) -> Result<MessagesResponse, LlmError> {
        let request = MessagesRequest {
            model: MODEL,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&request).await {
                Attempt::Done(response) => return Ok(response),
                Attempt::Fail(err) => return Err(err),
                Attempt::Retry(err) if attempt >= ATTEMPTS => {
                    return Err(LlmError::Exhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Attempt::Retry(err) => {
                    let delay = backoff(attempt);
                    warn!("LLM attempt {attempt}/{ATTEMPTS} failed ({err}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn send_once(&self, request: &MessagesRequest<'_>) -> Attempt {
        let sent = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(err) => return Attempt::Retry(LlmError::Transport(err)),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = LlmError::Upstream {
                status: status.as_u16(),
                message: upstream_message(body),
            };
            return if is_transient(status) {
                Attempt::Retry(err)
            } else {
                Attempt::Fail(err)
            };
        }

        match response.json::<MessagesResponse>().await {
            Ok(parsed) => {
                if let Some(usage) = &parsed.usage {
                    debug!(
                        "LLM call done: input_tokens={}, output_tokens={}",
                        usage.input_tokens, usage.output_tokens
                    );
                }
                Attempt::Done(parsed)
            }
            Err(err) => Attempt::Fail(LlmError::Transport(err)),
        }
    }

    /// Deserializes the response as JSON. A response cut off at the token
    /// limit is reported as `Truncated` rather than as a parse error.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
        options: CallOptions,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system, options).await?;
        if response.hit_token_limit() {
            return Err(LlmError::Truncated);
        }
        let text = response.text();
        let body = json_body(&text).ok_or(LlmError::EmptyContent)?;
        Ok(serde_json::from_str(body)?)
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// 500ms, 1s, 2s, ...
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(500 << (attempt - 1).min(6))
}

fn upstream_message(body: String) -> String {
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body,
    }
}

/// The JSON value inside model output: from the first `{` or `[` to the last
/// matching closer. Drops code fences and any prose the model wrapped it in.
fn json_body(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(value: serde_json::Value) -> MessagesResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_json_body_inside_fences() {
        let text = "```json\n{\"interviewQuestions\": []}\n```";
        assert_eq!(json_body(text), Some("{\"interviewQuestions\": []}"));
    }

    #[test]
    fn test_json_body_with_surrounding_prose() {
        let text = "Here is the cover letter:\n{\"companyName\": \"Acme\"}\nGood luck!";
        assert_eq!(json_body(text), Some("{\"companyName\": \"Acme\"}"));
    }

    #[test]
    fn test_json_body_array() {
        assert_eq!(json_body("  [1, 2]  "), Some("[1, 2]"));
    }

    #[test]
    fn test_json_body_missing() {
        assert_eq!(json_body("Sorry, I can't help with that."), None);
        assert_eq!(json_body("{ unterminated"), None);
    }

    #[test]
    fn test_text_joins_text_blocks() {
        let parsed = response(serde_json::json!({
            "content": [
                {"type": "text", "text": "Dear Hiring Manager,"},
                {"type": "tool_use"},
                {"type": "text", "text": " I am applying."}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 4}
        }));
        assert_eq!(parsed.text(), "Dear Hiring Manager, I am applying.");
        assert!(!parsed.hit_token_limit());
    }

    #[test]
    fn test_max_tokens_stop_is_detected() {
        let parsed = response(serde_json::json!({
            "content": [{"type": "text", "text": "{\"interviewQuestions\": ["}],
            "stop_reason": "max_tokens"
        }));
        assert!(parsed.hit_token_limit());
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient(StatusCode::BAD_GATEWAY));
        assert!(!is_transient(StatusCode::BAD_REQUEST));
        assert!(!is_transient(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_millis(500));
        assert_eq!(backoff(2), Duration::from_secs(1));
        assert_eq!(backoff(3), Duration::from_secs(2));
    }

    #[test]
    fn test_upstream_message_prefers_error_detail() {
        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"max_tokens too large"}}"#;
        assert_eq!(upstream_message(body.to_string()), "max_tokens too large");
        assert_eq!(upstream_message("Bad Gateway".to_string()), "Bad Gateway");
    }
}
