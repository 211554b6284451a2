//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};

use crate::client::{Completion, CompletionClient};
use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::sse::SseDecoder;
use crate::types::{ChatCompletion, ChatMessage, CompletionRequest};

pub struct OpenAiClient {
    http: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl OpenAiClient {
    /// Build a client, reading the API key from `config.api_key_env`.
    pub fn from_env(config: LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        // Bounds each wait, not the whole stream: a long answer may stream
        // for longer than the timeout.
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            api_key: api_key.into(),
        })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn request(&self, messages: Vec<ChatMessage>, model: &str) -> Result<Completion, LlmError> {
        let body = CompletionRequest {
            model,
            messages: &messages,
            stream: self.config.stream,
        };
        tracing::debug!(
            model,
            messages = messages.len(),
            stream = self.config.stream,
            "sending completion request"
        );

        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            tracing::warn!(status = status.as_u16(), "completion request rejected");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if !self.config.stream {
            let completion: ChatCompletion = response.json().await?;
            let answer = completion
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or(LlmError::EmptyCompletion)?;
            return Ok(Completion::Whole(answer));
        }

        // `None` marks the end of the body so the decoder can flush a
        // trailing unterminated line.
        let chunks = response
            .bytes_stream()
            .map(Some)
            .chain(stream::once(future::ready(None)));
        let deltas = chunks
            .scan(SseDecoder::new(), |decoder, chunk| {
                let batch = match chunk {
                    _ if decoder.is_done() => return future::ready(None),
                    Some(Ok(bytes)) => decoder.feed(&bytes),
                    Some(Err(e)) => vec![Err(LlmError::Http(e))],
                    None => decoder.finish(),
                };
                future::ready(Some(stream::iter(batch)))
            })
            .flatten()
            .boxed();
        Ok(Completion::Deltas(deltas))
    }
}

impl CompletionClient for OpenAiClient {
    fn create_completion<'a>(
        &'a self,
        messages: Vec<ChatMessage>,
        model: &'a str,
    ) -> BoxFuture<'a, Result<Completion, LlmError>> {
        self.request(messages, model).boxed()
    }
}
