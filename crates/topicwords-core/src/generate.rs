//! Topic-to-words generation flow.
//!
//! The network call itself lives behind [`Generator`]; this module owns the
//! validation around it. A reply is accepted only when it normalizes to
//! exactly the requested number of words, and only an accepted reply reaches
//! the state manager.

use crate::error::ErrorCode;
use crate::manager::{StateError, StateManager};
use crate::model::WORD_SEPARATOR;
use crate::store::KeyValueStore;
use tracing::{debug, warn};

/// Word count used when the caller does not choose one.
pub const DEFAULT_WORD_COUNT: usize = 3;

/// Topics longer than this are reported but still accepted.
pub const TOPIC_SOFT_LIMIT: usize = 100;

/// Errors surfaced by the generation flow.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("topic is empty")]
    EmptyTopic,

    #[error("word count must be at least 1")]
    InvalidWordCount,

    #[error("could not get {expected} words (got {actual}); raw reply: {raw:?}")]
    WordCountMismatch {
        expected: usize,
        actual: usize,
        raw: String,
    },

    /// The generation backend could not be reached or replied with garbage.
    #[error("generation failed: {message}")]
    Transport { message: String },

    #[error(transparent)]
    State(#[from] StateError),
}

impl GenerateError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyTopic => ErrorCode::EmptyTopic,
            Self::InvalidWordCount => ErrorCode::InvalidWordCount,
            Self::WordCountMismatch { .. } => ErrorCode::WordCountMismatch,
            Self::Transport { .. } => ErrorCode::GeneratorUnavailable,
            Self::State(err) => err.code(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Source of raw model replies.
///
/// Implementations return the model's text reply unprocessed; normalization
/// and count checks happen in [`generate_for`].
pub trait Generator {
    /// Ask for `word_count` words describing `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Transport`] when no reply could be obtained.
    fn generate(&self, topic: &str, word_count: usize) -> Result<String, GenerateError>;
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(&self, topic: &str, word_count: usize) -> Result<String, GenerateError> {
        (**self).generate(topic, word_count)
    }
}

/// An accepted generation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Generation {
    pub topic: String,
    pub words: String,
}

impl Generation {
    /// The individual words.
    pub fn split(&self) -> impl Iterator<Item = &str> {
        self.words.split(WORD_SEPARATOR)
    }
}

/// Trim `topic` and reject it when nothing is left.
///
/// # Errors
///
/// Returns [`GenerateError::EmptyTopic`] for blank input.
pub fn validate_topic(topic: &str) -> Result<&str, GenerateError> {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return Err(GenerateError::EmptyTopic);
    }
    let chars = trimmed.chars().count();
    if chars > TOPIC_SOFT_LIMIT {
        warn!(chars, limit = TOPIC_SOFT_LIMIT, "topic is longer than recommended");
    }
    Ok(trimmed)
}

/// Reduce a raw reply to lowercase ASCII words.
///
/// Everything except ASCII letters and whitespace is dropped before
/// splitting, so `"Rocket, stars & orbit!"` becomes `["rocket", "stars",
/// "orbit"]`.
#[must_use]
pub fn normalize_words(raw: &str) -> Vec<String> {
    let kept: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();
    kept.to_ascii_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Check that `raw` normalizes to exactly `expected` words and join them.
///
/// # Errors
///
/// Returns [`GenerateError::WordCountMismatch`] on any other count.
pub fn accept_words(raw: &str, expected: usize) -> Result<String, GenerateError> {
    let words = normalize_words(raw);
    if words.len() != expected {
        return Err(GenerateError::WordCountMismatch {
            expected,
            actual: words.len(),
            raw: raw.trim().to_string(),
        });
    }
    Ok(words.join(&WORD_SEPARATOR.to_string()))
}

/// Instruction text sent to the model.
#[must_use]
pub fn build_prompt(topic: &str, word_count: usize) -> String {
    format!(
        "You are an agent for What3Topics. Describe the following topic in exactly \
         {word_count} single simple, common, memorable and natural words, lowercase, \
         separated by spaces and nothing else. Example: 'food health wellness' for \
         'healthy eating'. Topic: {topic}"
    )
}

/// Validate, call the generator, accept the reply, and record it.
///
/// Nothing is recorded unless every step succeeds.
///
/// # Errors
///
/// Returns the first failing step's error. A [`GenerateError::State`] means
/// the reply was valid but could not be persisted.
pub fn generate_for<S, G>(
    manager: &mut StateManager<S>,
    generator: &G,
    topic: &str,
    word_count: usize,
) -> Result<Generation, GenerateError>
where
    S: KeyValueStore,
    G: Generator + ?Sized,
{
    let topic = validate_topic(topic)?;
    if word_count == 0 {
        return Err(GenerateError::InvalidWordCount);
    }

    let raw = generator.generate(topic, word_count)?;
    debug!(topic, raw = %raw.trim(), "generator replied");
    let words = accept_words(&raw, word_count)?;

    manager.record_generation(topic, &words)?;
    Ok(Generation {
        topic: topic.to_string(),
        words,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::cell::Cell;

    /// Replies with a canned string and counts calls.
    struct Canned {
        reply: Result<String, String>,
        calls: Cell<usize>,
    }

    impl Canned {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: Cell::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: Cell::new(0),
            }
        }
    }

    impl Generator for Canned {
        fn generate(&self, _topic: &str, _word_count: usize) -> Result<String, GenerateError> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone().map_err(GenerateError::transport)
        }
    }

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(
            normalize_words("  Rocket, Stars & ORBIT!\n"),
            ["rocket", "stars", "orbit"]
        );
        assert!(normalize_words("123 !!").is_empty());
    }

    #[test]
    fn accept_rejects_wrong_counts() {
        assert_eq!(accept_words("food health wellness", 3).expect("three"), "food.health.wellness");
        let err = accept_words("food health", 3).expect_err("two words");
        assert!(matches!(
            err,
            GenerateError::WordCountMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
        assert!(accept_words("a b c d", 3).is_err());
    }

    #[test]
    fn validate_trims_and_rejects_blank() {
        assert_eq!(validate_topic("  space  ").expect("valid"), "space");
        assert!(matches!(validate_topic(" \t "), Err(GenerateError::EmptyTopic)));
        let long = "x".repeat(TOPIC_SOFT_LIMIT + 20);
        assert_eq!(validate_topic(&long).expect("long topics pass"), long);
    }

    #[test]
    fn prompt_mentions_count_and_topic() {
        let prompt = build_prompt("healthy eating", 4);
        assert!(prompt.contains("exactly 4 single"));
        assert!(prompt.ends_with("Topic: healthy eating"));
    }

    #[test]
    fn successful_flow_records_generation() {
        let mut manager = StateManager::load(MemoryStore::new());
        let generator = Canned::ok("Rocket stars orbit.");

        let generation =
            generate_for(&mut manager, &generator, " space travel ", 3).expect("generate");
        assert_eq!(generation.topic, "space travel");
        assert_eq!(generation.words, "rocket.stars.orbit");
        assert_eq!(generation.split().count(), 3);
        assert_eq!(manager.history().len(), 1);
        assert_eq!(manager.statistics().total_generations, 1);
        assert_eq!(manager.last_topic(), Some("space travel"));
    }

    #[test]
    fn failures_never_touch_the_manager() {
        let mut manager = StateManager::load(MemoryStore::new());

        let short = Canned::ok("rocket stars");
        assert!(generate_for(&mut manager, &short, "space", 3).is_err());

        let down = Canned::failing("connection refused");
        let err = generate_for(&mut manager, &down, "space", 3).expect_err("transport");
        assert_eq!(err.code(), ErrorCode::GeneratorUnavailable);

        assert!(manager.history().is_empty());
        assert_eq!(manager.statistics().total_generations, 0);
    }

    #[test]
    fn invalid_input_skips_the_generator() {
        let mut manager = StateManager::load(MemoryStore::new());
        let generator = Canned::ok("a b c");

        assert!(matches!(
            generate_for(&mut manager, &generator, "", 3),
            Err(GenerateError::EmptyTopic)
        ));
        assert!(matches!(
            generate_for(&mut manager, &generator, "space", 0),
            Err(GenerateError::InvalidWordCount)
        ));
        assert_eq!(generator.calls.get(), 0);
    }
}
