use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::filter::ContentFilter;
use crate::traits::CommentGenerator;
use crate::util::sanitize_completion;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Max attempts per `generate` call. Transient failures back off
/// `RETRY_BASE * 2^attempt` plus random jitter (0-1s) between attempts.
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE: Duration = Duration::from_secs(2);

/// Hard deadline per API call; elapsing it cancels the in-flight request.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Default ceiling on the posted comment, in bytes.
const MAX_COMMENT_BYTES: usize = 500;

pub struct OpenAi {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
    max_attempts: u32,
    max_comment_bytes: usize,
    filter: Option<Arc<dyn ContentFilter>>,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: OPENAI_API_URL.to_string(),
            http: reqwest::Client::new(),
            timeout: CALL_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
            max_comment_bytes: MAX_COMMENT_BYTES,
            filter: None,
        }
    }

    pub fn from_env(model: impl Into<String>) -> Result<Self, GenerationError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| GenerationError::Api {
            status: 401,
            message: "OPENAI_API_KEY environment variable not set".to_string(),
        })?;
        Ok(Self::new(api_key, model))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_max_comment_bytes(mut self, bytes: usize) -> Self {
        self.max_comment_bytes = bytes;
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn ContentFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One chat-completion round trip, no retry policy.
    async fn chat(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![WireMessage {
                role: "user",
                content: prompt.to_string(),
            }],
        };

        debug!(model = %self.model, "OpenAI chat request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(GenerationError::Empty)
    }

    fn build_prompt(&self, post_text: &str, style: &str) -> String {
        if post_text.is_empty() {
            style.to_string()
        } else {
            format!("Post content: {post_text}\n\nWrite a relevant comment responding to this post.\n{style}")
        }
    }
}

#[async_trait]
impl CommentGenerator for OpenAi {
    async fn generate(&self, post_text: &str, style: &str) -> Result<String, GenerationError> {
        let prompt = self.build_prompt(post_text, style);
        let mut last_error = String::new();

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let backoff = RETRY_BASE * 2u32.pow(attempt - 1);
                let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
                warn!(
                    attempt = attempt + 1,
                    backoff_secs = backoff.as_secs(),
                    last_error = %last_error,
                    "Retrying generation after backoff"
                );
                tokio::time::sleep(backoff + jitter).await;
            }

            let outcome = match tokio::time::timeout(self.timeout, self.chat(&prompt)).await {
                Err(_) => Err(GenerationError::Timeout {
                    secs: self.timeout.as_secs(),
                }),
                Ok(res) => res,
            };

            match outcome {
                Ok(raw) => {
                    let text = sanitize_completion(&raw, self.max_comment_bytes);
                    if text.is_empty() {
                        return Err(GenerationError::Empty);
                    }
                    if let Some(filter) = &self.filter {
                        if let Some(reason) = filter.reject_reason(&text) {
                            return Err(GenerationError::ContentPolicy(reason));
                        }
                    }
                    return Ok(text);
                }
                Err(e) if e.is_transient() => {
                    last_error = e.to_string();
                }
                Err(e) => return Err(e),
            }
        }

        Err(GenerationError::RetriesExhausted {
            attempts: self.max_attempts,
            last: last_error,
        })
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_post_text_when_present() {
        let client = OpenAi::new("key", "model");
        let prompt = client.build_prompt("new AI launch", "Keep it short.");
        assert!(prompt.contains("new AI launch"));
        assert!(prompt.ends_with("Keep it short."));
        assert_eq!(client.build_prompt("", "Keep it short."), "Keep it short.");
    }
}
