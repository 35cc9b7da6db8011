//! HTTP client for the chat-completion endpoint that turns topics into words.

use serde::Deserialize;
use std::time::Duration;
use topicwords_core::config::GeneratorConfig;
use topicwords_core::generate::{GenerateError, Generator, build_prompt};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Posts `{ model, messages }` to a chat endpoint and returns the first
/// choice's content.
#[derive(Debug)]
pub struct HttpGenerator {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
}

impl HttpGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("topicwords/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        }
    }

    fn request_body(&self, topic: &str, word_count: usize) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": build_prompt(topic, word_count),
            }],
        })
    }
}

impl Generator for HttpGenerator {
    fn generate(&self, topic: &str, word_count: usize) -> Result<String, GenerateError> {
        debug!(endpoint = %self.endpoint, model = %self.model, topic, word_count, "requesting words");

        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(self.request_body(topic, word_count))
            .map_err(|err| GenerateError::transport(format!("request to {} failed: {err}", self.endpoint)))?;

        let reply: ChatReply = response
            .into_json()
            .map_err(|err| GenerateError::transport(format!("failed to decode reply: {err}")))?;

        first_content(reply)
    }
}

fn first_content(reply: ChatReply) -> Result<String, GenerateError> {
    reply
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| GenerateError::transport("reply contained no choices"))
}
