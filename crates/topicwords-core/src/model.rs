//! Persisted value types.
//!
//! Field names on the wire match what earlier releases wrote to storage
//! (`totalGenerations`, `duplicateWarning`, ...), so existing data keeps
//! loading.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

/// Separator between generated words in a stored word sequence.
pub const WORD_SEPARATOR: char = '.';

/// Common read access for entries that can be searched and sorted.
pub trait Entry {
    fn topic(&self) -> &str;
    fn words(&self) -> &str;
}

/// A user-pinned (topic, words) pair. Identity is `words` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub topic: String,
    pub words: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl FavoriteEntry {
    #[must_use]
    pub fn new(topic: impl Into<String>, words: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            words: words.into(),
            tags: None,
        }
    }

    /// Tags in insertion order (empty when none were ever added).
    #[must_use]
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }
}

impl Entry for FavoriteEntry {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn words(&self) -> &str {
        &self.words
    }
}

/// One past generation. At most one entry per topic is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub topic: String,
    pub words: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl Entry for HistoryEntry {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn words(&self) -> &str {
        &self.words
    }
}

/// Generation counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_generations: u64,
    pub topic_counts: BTreeMap<String, u64>,
}

impl Statistics {
    pub(crate) fn record(&mut self, topic: &str) {
        self.total_generations += 1;
        *self.topic_counts.entry(topic.to_string()).or_insert(0) += 1;
    }
}

/// How densely list entries are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Normal,
    Compact,
    Expanded,
}

impl ViewMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Compact => "compact",
            Self::Expanded => "expanded",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "compact" => Ok(Self::Compact),
            "expanded" => Ok(Self::Expanded),
            _ => Err(InvalidValue::new("view mode", s)),
        }
    }
}

/// User preferences. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub animations: bool,
    pub sounds: bool,
    pub autocomplete: bool,
    pub duplicate_warning: bool,
    pub view_mode: ViewMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            animations: true,
            sounds: false,
            autocomplete: true,
            duplicate_warning: true,
            view_mode: ViewMode::Normal,
        }
    }
}

impl Settings {
    pub(crate) fn apply(&mut self, change: SettingChange) {
        match change {
            SettingChange::Animations(v) => self.animations = v,
            SettingChange::Sounds(v) => self.sounds = v,
            SettingChange::Autocomplete(v) => self.autocomplete = v,
            SettingChange::DuplicateWarning(v) => self.duplicate_warning = v,
            SettingChange::ViewMode(v) => self.view_mode = v,
        }
    }
}

/// A single recognized setting update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingChange {
    Animations(bool),
    Sounds(bool),
    Autocomplete(bool),
    DuplicateWarning(bool),
    ViewMode(ViewMode),
}

impl SettingChange {
    /// Parse a `key`/`value` pair as typed on the command line.
    ///
    /// Keys accept both kebab-case and the camelCase storage names.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidValue`] for an unknown key or a value of the wrong type.
    pub fn parse(key: &str, value: &str) -> Result<Self, InvalidValue> {
        match key.trim() {
            "animations" => parse_bool("animations", value).map(Self::Animations),
            "sounds" => parse_bool("sounds", value).map(Self::Sounds),
            "autocomplete" => parse_bool("autocomplete", value).map(Self::Autocomplete),
            "duplicate-warning" | "duplicateWarning" => {
                parse_bool("duplicate-warning", value).map(Self::DuplicateWarning)
            }
            "view-mode" | "viewMode" => value.parse().map(Self::ViewMode),
            other => Err(InvalidValue::new("setting", other)),
        }
    }

    /// Canonical kebab-case key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Animations(_) => "animations",
            Self::Sounds(_) => "sounds",
            Self::Autocomplete(_) => "autocomplete",
            Self::DuplicateWarning(_) => "duplicate-warning",
            Self::ViewMode(_) => "view-mode",
        }
    }
}

fn parse_bool(field: &'static str, raw: &str) -> Result<bool, InvalidValue> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(InvalidValue::new(field, raw)),
    }
}

/// Light or dark UI theme. Stored as the bare string, not JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(InvalidValue::new("theme", s)),
        }
    }
}

/// A value that does not parse into the expected field type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {value:?}")]
pub struct InvalidValue {
    pub field: &'static str,
    pub value: String,
}

impl InvalidValue {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}
