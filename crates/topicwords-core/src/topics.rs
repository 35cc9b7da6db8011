//! Built-in topic lists for the random and surprise pickers.

use rand::seq::SliceRandom;
use rand::Rng;

/// Everyday topics offered by the random picker.
pub const RANDOM_TOPICS: &[&str] = &[
    "space travel",
    "climate change",
    "artificial intelligence",
    "street food",
    "video games",
    "ancient history",
    "machine learning",
    "ocean exploration",
    "renewable energy",
    "deep sea diving",
    "urban gardening",
    "blockchain technology",
];

/// Whimsical topics offered by the surprise picker.
pub const SURPRISE_TOPICS: &[&str] = &[
    "mystery islands",
    "robot pets",
    "galaxy travel",
    "hidden treasure",
    "jungle survival",
    "singing clouds",
    "time-traveling cats",
    "invisible friends",
    "dancing stars",
    "magical forests",
];

/// Which list to draw from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TopicPool {
    #[default]
    Random,
    Surprise,
}

impl TopicPool {
    #[must_use]
    pub const fn topics(self) -> &'static [&'static str] {
        match self {
            Self::Random => RANDOM_TOPICS,
            Self::Surprise => SURPRISE_TOPICS,
        }
    }
}

/// Pick one topic uniformly from `pool`.
pub fn pick<R: Rng + ?Sized>(pool: TopicPool, rng: &mut R) -> &'static str {
    // Both lists are non-empty constants.
    pool.topics().choose(rng).copied().unwrap_or(RANDOM_TOPICS[0])
}
