//! OpenRouter (OpenAI-compatible) chat-completion word source.

use std::time::Duration;

use serde::Deserialize;

use crate::{WordError, WordSource, build_prompt, parse_word_list};

/// Settings for [`OpenRouterWordSource`].
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Bearer token for the provider.
    pub api_key: String,
    /// API root; `/chat/completions` is appended.
    pub base_url: String,
    /// Model identifier sent in the request body.
    pub model: String,
    /// Whole-request timeout. `None` leaves reqwest's default (no timeout).
    pub timeout: Option<Duration>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "mistralai/mistral-7b-instruct".to_string(),
            timeout: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Fetches words with a single chat-completion request.
///
/// One request per call, no retries. The reply's first choice is split into
/// lines by [`parse_word_list`].
#[derive(Debug, Clone)]
pub struct OpenRouterWordSource {
    client: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterWordSource {
    /// Builds the HTTP client.
    ///
    /// # Errors
    /// Returns [`WordError::Http`] if the TLS backend cannot be initialised.
    pub fn new(config: OpenRouterConfig) -> Result<Self, WordError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl WordSource for OpenRouterWordSource {
    async fn fetch_words(
        &self,
        topic: &str,
        count: usize,
    ) -> Result<Vec<String>, WordError> {
        if self.config.api_key.is_empty() {
            return Err(WordError::MissingApiKey);
        }

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "user", "content": build_prompt(topic, count)}
            ],
        });

        tracing::debug!(topic, count, model = %self.config.model, "requesting words");
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(WordError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| WordError::MalformedResponse(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                WordError::MalformedResponse("response has no choices".into())
            })?;

        let words = parse_word_list(&content);
        if words.is_empty() {
            return Err(WordError::NoWords(topic.to_owned()));
        }
        tracing::info!(topic, words = words.len(), "fetched words");
        Ok(words)
    }
}
