//! Relation extraction collaborators.
//!
//! The pipeline never owns model lifecycle: it takes any [`RelationExtractor`]
//! and treats its output as an opaque relation-text block for the parser.
//! [`HostedExtractor`] speaks the OpenAI-compatible chat-completions protocol
//! used by hosted inference providers; local sequence models plug in behind
//! the same trait.

use std::cell::Cell;
use std::time::Duration;

use tracing::debug;

use crate::error::ExtractError;

/// Produces relation text for a chunk of source text.
///
/// Implementations return either parenthesized `(subject, relation, object)`
/// lines or a bare token stream, whatever the model emits. The parser
/// downstream copes with both, and with the "error" marker convention for
/// total failures.
pub trait RelationExtractor {
    fn extract(&self, text: &str) -> Result<String, ExtractError>;
}

/// Configuration for the hosted extraction client.
#[derive(Debug, Clone)]
pub struct HostedConfig {
    /// OpenAI-compatible API root, e.g. `https://api.groq.com/openai/v1`.
    pub base_url: String,
    /// Bearer token for the provider.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Sampling temperature for extraction.
    pub temperature: f64,
    /// Completion token budget for extraction.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Pause inserted between successive requests to stay under provider
    /// rate limits. Not a correctness requirement.
    pub pause: Duration,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".into(),
            api_key: String::new(),
            model: "llama3-70b-8192".into(),
            temperature: 0.2,
            max_tokens: 500,
            timeout_secs: 60,
            pause: Duration::from_millis(500),
        }
    }
}

/// Client for OpenAI-compatible chat-completions extraction endpoints.
pub struct HostedExtractor {
    config: HostedConfig,
    agent: ureq::Agent,
    /// Set after the first request; later requests pause first.
    called: Cell<bool>,
}

impl HostedExtractor {
    /// Create a client. Fails fast when no API key is configured.
    pub fn new(config: HostedConfig) -> Result<Self, ExtractError> {
        if config.api_key.is_empty() {
            return Err(ExtractError::MissingApiKey);
        }
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Ok(Self {
            config,
            agent,
            called: Cell::new(false),
        })
    }

    /// One chat-completions round trip, returning the assistant text.
    fn complete(&self, prompt: &str, temperature: f64, max_tokens: u32) -> Result<String, ExtractError> {
        if self.called.replace(true) {
            std::thread::sleep(self.config.pause);
        }

        let url = format!("{}/chat/completions", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .send_json(body)
            .map_err(|e| ExtractError::RequestFailed {
                message: e.to_string(),
            })?;

        let json: serde_json::Value =
            response.into_json().map_err(|e| ExtractError::MalformedResponse {
                message: e.to_string(),
            })?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| ExtractError::MalformedResponse {
                message: "missing choices[0].message.content".into(),
            })
    }

    /// Summarize a chunk for glossary/overview display.
    ///
    /// Not consumed by the graph pipeline itself; surrounding applications
    /// show the summaries next to the map.
    pub fn summarize(&self, text: &str, max_tokens: u32) -> Result<String, ExtractError> {
        let prompt = format!(
            "Please provide a clear, concise summary of the following educational \
             content in 3-5 sentences. Focus on the main concepts, key relationships, \
             and important facts. Make it suitable for creating a concept map.\n\n\
             Text to summarize:\n{text}\n\nSummary:"
        );
        debug!(model = %self.config.model, "summarize request");
        self.complete(&prompt, 0.3, max_tokens)
    }

    /// The configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

impl RelationExtractor for HostedExtractor {
    fn extract(&self, text: &str) -> Result<String, ExtractError> {
        let prompt = format!(
            "Extract all factual (subject, relation, object) triplets from the \
             following text. Format each triplet as: (subject, relation, object)\n\
             Focus on educational concepts, relationships, and factual information.\n\
             Only include meaningful relationships that would be useful for a \
             concept map.\n\nText:\n{text}\n\nTriplets:"
        );
        debug!(model = %self.config.model, chars = text.len(), "extraction request");
        self.complete(&prompt, self.config.temperature, self.config.max_tokens)
    }
}

impl std::fmt::Debug for HostedExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedExtractor")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}
