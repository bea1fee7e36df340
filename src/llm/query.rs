//! `WordQueryClient` — dictionary explanations from a chat-completion API.
//!
//! Calls any OpenAI-compatible `{base}/chat/completions` endpoint with the
//! fixed prompt from [`crate::llm::prompt`]. All connection details come from
//! [`ChatConfig`]; nothing is hardcoded.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{endpoint, HttpTransport, RetryPolicy, TransportError};
use crate::config::ChatConfig;
use crate::llm::prompt::{user_message, SYSTEM_PROMPT};

// ---------------------------------------------------------------------------
// QueryError
// ---------------------------------------------------------------------------

/// Errors that can occur while querying a word.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The chat API key is empty or still the placeholder.
    #[error("chat API key is not configured")]
    MissingApiKey,

    /// Every attempt failed at the transport level.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The endpoint answered with a non-2xx status.
    #[error("chat API returned status {status}")]
    Status { status: u16, body: String },

    /// A 2xx body without `choices[0].message.content`.
    #[error("unexpected chat API response: {0}")]
    UnexpectedResponse(String),
}

impl QueryError {
    /// The text shown to the chat user in place of an explanation.
    pub fn user_message(&self, word: &str) -> String {
        match self {
            QueryError::MissingApiKey => "请先在config.json中配置正确的Chat API密钥".to_string(),
            QueryError::Transport(e) => format!("查询单词 '{word}' 失败，API请求错误: {e}"),
            QueryError::Status { status, .. } => {
                format!("查询单词 '{word}' 失败，API请求错误: {status}")
            }
            QueryError::UnexpectedResponse(_) => format!("查询单词 '{word}' 失败，API返回结果异常"),
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Pull the trimmed first-choice text out of a chat-completion body.
fn first_choice_content(body: &[u8]) -> Result<String, QueryError> {
    let completion: ChatCompletion = serde_json::from_slice(body)
        .map_err(|e| QueryError::UnexpectedResponse(e.to_string()))?;

    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or_else(|| QueryError::UnexpectedResponse("no choices".into()))
}

// ---------------------------------------------------------------------------
// WordQueryClient
// ---------------------------------------------------------------------------

/// Asks the chat endpoint for a templated explanation of a word.
pub struct WordQueryClient {
    transport: Arc<dyn HttpTransport>,
    config: ChatConfig,
    retry: RetryPolicy,
}

impl WordQueryClient {
    pub fn new(transport: Arc<dyn HttpTransport>, config: ChatConfig) -> Self {
        Self {
            transport,
            config,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Query `word`, always returning text for the chat user: the
    /// explanation on success, a formatted error message otherwise.
    pub async fn query_word(&self, word: &str) -> String {
        match self.try_query(word).await {
            Ok(explanation) => explanation,
            Err(e) => {
                log::error!("llm: query for {word:?} failed: {e}");
                e.user_message(word)
            }
        }
    }

    /// Query `word`, returning the explanation or a typed error.
    ///
    /// No request is sent when the API key is missing. Transport failures
    /// are retried per the client's [`RetryPolicy`]; a non-2xx status is not.
    pub async fn try_query(&self, word: &str) -> Result<String, QueryError> {
        if !self.config.has_usable_key() {
            return Err(QueryError::MissingApiKey);
        }

        let user_msg = user_message(word);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_msg,
                },
            ],
            temperature: self.config.temperature,
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| QueryError::UnexpectedResponse(e.to_string()))?;

        let url = endpoint(&self.config.base, "chat/completions");
        let response = self
            .retry
            .post_json(
                self.transport.as_ref(),
                "chat",
                &url,
                &self.config.api_key,
                &body,
                Duration::from_secs(self.config.timeout_secs),
            )
            .await?;

        if !response.is_success() {
            let body = response.text();
            log::error!("llm: chat API returned {}: {body}", response.status);
            return Err(QueryError::Status {
                status: response.status,
                body,
            });
        }

        first_choice_content(&response.body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
