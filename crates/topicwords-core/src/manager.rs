//! The local state manager.
//!
//! [`StateManager`] exclusively owns the persisted lists (favorites, history,
//! statistics, settings, theme) and the session undo log. Callers read
//! through borrowed views and mutate only through the methods below.
//!
//! # Persistence
//!
//! | Key | Value | Default when absent or unparseable |
//! |---|---|---|
//! | `w3t_favorites` | JSON array of favorites | `[]` |
//! | `w3t_history` | JSON array of history entries, oldest first | `[]` |
//! | `w3t_statistics` | JSON statistics object | zeroed counters |
//! | `w3t_settings` | JSON settings object | animations on, sounds off, autocomplete on, duplicate warning on, normal view |
//! | `w3t_theme` | bare `light` / `dark` | `light` |
//!
//! # Atomicity
//!
//! Every mutation computes the new value, writes it to the store, and only
//! then commits it to memory (and to the undo log). A failed write leaves the
//! in-memory state and the undo log exactly as they were.

use crate::error::ErrorCode;
use crate::model::{
    Entry as _, FavoriteEntry, HistoryEntry, SettingChange, Settings, Statistics, Theme,
};
use crate::query::{Filtered, SortOrder};
use crate::store::{KeyValueStore, StoreError};
use crate::transfer::{self, Collection, ImportError, ImportMode};
use crate::undo::{UndoAction, UndoStack};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const FAVORITES_KEY: &str = "w3t_favorites";
pub const HISTORY_KEY: &str = "w3t_history";
pub const STATISTICS_KEY: &str = "w3t_statistics";
pub const SETTINGS_KEY: &str = "w3t_settings";
pub const THEME_KEY: &str = "w3t_theme";

/// Maximum number of history entries kept; the oldest is evicted first.
pub const HISTORY_LIMIT: usize = 100;
/// Autocomplete stays quiet for shorter inputs.
pub const AUTOCOMPLETE_MIN_CHARS: usize = 2;
/// Maximum number of autocomplete suggestions.
pub const AUTOCOMPLETE_LIMIT: usize = 5;

/// Errors surfaced by state manager operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// `undo` was called with an empty undo log.
    #[error("nothing to undo")]
    NothingToUndo,

    /// An import payload was rejected; nothing was changed.
    #[error("invalid format: {0}")]
    InvalidFormat(#[from] ImportError),

    /// A value could not be encoded for storage.
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The store refused a write; nothing was changed.
    #[error("failed to persist {key}: {source}")]
    Persist {
        key: &'static str,
        #[source]
        source: StoreError,
    },
}

impl StateError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NothingToUndo => ErrorCode::NothingToUndo,
            Self::InvalidFormat(_) => ErrorCode::InvalidFormat,
            Self::Encode { .. } => ErrorCode::InternalUnexpected,
            Self::Persist { source, .. } => source.code(),
        }
    }
}

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Danger,
}

/// A toast-style message for the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
}

/// Aggregate numbers for the statistics view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_generations: u64,
    pub favorites_count: usize,
    pub unique_topics: usize,
    pub most_used: Option<MostUsed>,
}

/// The topic generated most often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MostUsed {
    pub topic: String,
    pub count: u64,
}

/// Owner of all persisted and session state.
#[derive(Debug)]
pub struct StateManager<S: KeyValueStore> {
    store: S,
    favorites: Vec<FavoriteEntry>,
    history: Vec<HistoryEntry>,
    statistics: Statistics,
    settings: Settings,
    theme: Theme,
    undo: UndoStack,
    last_topic: Option<String>,
    notifications: Vec<Notification>,
}

impl<S: KeyValueStore> StateManager<S> {
    /// Load every persisted value from `store`.
    ///
    /// Each key falls back to its default independently; a missing or
    /// malformed value never fails the load.
    pub fn load(store: S) -> Self {
        let favorites = load_json(&store, FAVORITES_KEY);
        let history = load_json(&store, HISTORY_KEY);
        let statistics = load_json(&store, STATISTICS_KEY);
        let settings = load_json(&store, SETTINGS_KEY);
        let theme = load_theme(&store);

        let manager = Self {
            store,
            favorites,
            history,
            statistics,
            settings,
            theme,
            undo: UndoStack::new(),
            last_topic: None,
            notifications: Vec::new(),
        };
        debug!(
            favorites = manager.favorites.len(),
            history = manager.history.len(),
            total_generations = manager.statistics.total_generations,
            "state loaded"
        );
        manager
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn favorites(&self) -> &[FavoriteEntry] {
        &self.favorites
    }

    /// History, oldest first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// The most recent undoable action, if any.
    #[must_use]
    pub fn peek_undo(&self) -> Option<&UndoAction> {
        self.undo.peek()
    }

    /// Topic of the last successful generation in this process.
    #[must_use]
    pub fn last_topic(&self) -> Option<&str> {
        self.last_topic.as_deref()
    }

    #[must_use]
    pub fn is_favorite(&self, words: &str) -> bool {
        self.favorites.iter().any(|f| f.words == words)
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Filtered, sorted view of favorites.
    #[must_use]
    pub fn query_favorites(&self, term: &str, order: SortOrder) -> Filtered<'_, FavoriteEntry> {
        Filtered::new(&self.favorites, term, order)
    }

    /// Filtered, sorted view of history. `Recent` keeps oldest-first order.
    #[must_use]
    pub fn query_history(&self, term: &str, order: SortOrder) -> Filtered<'_, HistoryEntry> {
        Filtered::new(&self.history, term, order)
    }

    /// Take every pending notification, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Record a successful generation at the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Persist`] when history or statistics cannot be
    /// written; neither is changed in memory in that case.
    pub fn record_generation(&mut self, topic: &str, words: &str) -> Result<(), StateError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.record_generation_at(topic, words, now)
    }

    /// Record a successful generation with an explicit epoch-ms timestamp.
    ///
    /// Replaces any existing history entry for `topic`, appends the new one,
    /// evicts the oldest entry beyond [`HISTORY_LIMIT`], and bumps the
    /// generation counters.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Persist`] when history or statistics cannot be
    /// written; neither is changed in memory in that case.
    pub fn record_generation_at(
        &mut self,
        topic: &str,
        words: &str,
        timestamp: i64,
    ) -> Result<(), StateError> {
        let mut history: Vec<HistoryEntry> = self
            .history
            .iter()
            .filter(|entry| entry.topic != topic)
            .cloned()
            .collect();
        history.push(HistoryEntry {
            topic: topic.to_string(),
            words: words.to_string(),
            timestamp,
        });
        if history.len() > HISTORY_LIMIT {
            let excess = history.len() - HISTORY_LIMIT;
            history.drain(..excess);
        }

        let mut statistics = self.statistics.clone();
        statistics.record(topic);

        self.write_json(HISTORY_KEY, &history)?;
        if let Err(err) = self.write_json(STATISTICS_KEY, &statistics) {
            // Put the previous history back so the two keys stay in step.
            let previous = self.history.clone();
            if let Err(restore) = self.write_json(HISTORY_KEY, &previous) {
                warn!(error = %restore, "failed to restore history after statistics write failed");
            }
            return Err(err);
        }

        self.history = history;
        self.statistics = statistics;
        self.last_topic = Some(topic.to_string());
        info!(topic, words, total = self.statistics.total_generations, "generation recorded");
        Ok(())
    }

    /// Add `item` to favorites, or remove the favorite with the same `words`.
    ///
    /// Returns `true` when the item is now a favorite.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Persist`] when favorites cannot be written.
    pub fn toggle_favorite(&mut self, item: FavoriteEntry) -> Result<bool, StateError> {
        let position = self.favorites.iter().position(|f| f.words == item.words);
        let mut favorites = self.favorites.clone();

        let (action, added) = match position {
            Some(index) => (UndoAction::RemoveFavorite(favorites.remove(index)), false),
            None => {
                favorites.push(item.clone());
                (UndoAction::AddFavorite(item), true)
            }
        };

        if let Err(err) = self.write_json(FAVORITES_KEY, &favorites) {
            self.notify(NoticeLevel::Danger, "Could not save favorites.");
            return Err(err);
        }

        info!(action = %action.describe(), "favorite toggled");
        self.favorites = favorites;
        self.undo.push(action);
        if added {
            self.notify(NoticeLevel::Success, "Added to favorites!");
        } else {
            self.notify(NoticeLevel::Success, "Removed from favorites.");
        }
        Ok(added)
    }

    /// Attach `tag` to the favorite identified by `words`.
    ///
    /// The tag is trimmed first. Empty tags, tags already present, and
    /// unknown favorites are silent no-ops returning `false`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Persist`] when favorites cannot be written.
    pub fn add_tag(&mut self, words: &str, tag: &str) -> Result<bool, StateError> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Ok(false);
        }
        let Some(index) = self.favorites.iter().position(|f| f.words == words) else {
            debug!(words, "tag target is not a favorite");
            return Ok(false);
        };
        if self.favorites[index].has_tag(tag) {
            return Ok(false);
        }

        let mut favorites = self.favorites.clone();
        favorites[index]
            .tags
            .get_or_insert_with(Vec::new)
            .push(tag.to_string());

        if let Err(err) = self.write_json(FAVORITES_KEY, &favorites) {
            self.notify(NoticeLevel::Danger, "Could not save favorites.");
            return Err(err);
        }

        info!(words, tag, "tag added");
        self.favorites = favorites;
        self.notify(NoticeLevel::Success, format!("Tag \"{tag}\" added!"));
        Ok(true)
    }

    /// Empty the history, keeping a snapshot on the undo log.
    ///
    /// Callers must obtain the user's confirmation before calling this.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Persist`] when the history key cannot be removed.
    pub fn clear_history(&mut self) -> Result<(), StateError> {
        if let Err(source) = self.store.remove(HISTORY_KEY) {
            self.notify(NoticeLevel::Danger, "Could not clear history.");
            return Err(StateError::Persist {
                key: HISTORY_KEY,
                source,
            });
        }

        let snapshot = std::mem::take(&mut self.history);
        info!(entries = snapshot.len(), "history cleared");
        self.undo.push(UndoAction::ClearHistory(snapshot));
        self.notify(NoticeLevel::Success, "History cleared.");
        Ok(())
    }

    /// Reverse the most recent undoable action and return it.
    ///
    /// # Errors
    ///
    /// - [`StateError::NothingToUndo`] when the undo log is empty; nothing
    ///   changes.
    /// - [`StateError::Persist`] when the reversal cannot be written; the
    ///   action stays on the undo log.
    pub fn undo(&mut self) -> Result<UndoAction, StateError> {
        let Some(action) = self.undo.pop() else {
            self.notify(NoticeLevel::Warning, "Nothing to undo");
            return Err(StateError::NothingToUndo);
        };

        let result = match &action {
            UndoAction::AddFavorite(item) => {
                let favorites: Vec<FavoriteEntry> = self
                    .favorites
                    .iter()
                    .filter(|f| f.words != item.words)
                    .cloned()
                    .collect();
                self.write_json(FAVORITES_KEY, &favorites)
                    .map(|()| self.favorites = favorites)
            }
            UndoAction::RemoveFavorite(item) => {
                let mut favorites = self.favorites.clone();
                favorites.push(item.clone());
                self.write_json(FAVORITES_KEY, &favorites)
                    .map(|()| self.favorites = favorites)
            }
            UndoAction::ClearHistory(snapshot) => self
                .write_json(HISTORY_KEY, snapshot)
                .map(|()| self.history.clone_from(snapshot)),
        };

        match result {
            Ok(()) => {
                info!(action = %action.describe(), "undone");
                self.notify(NoticeLevel::Success, "Action undone");
                Ok(action)
            }
            Err(err) => {
                self.undo.push(action);
                self.notify(NoticeLevel::Danger, "Could not undo.");
                Err(err)
            }
        }
    }

    /// Apply one setting change and persist the whole settings object.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Persist`] when settings cannot be written.
    pub fn update_setting(&mut self, change: SettingChange) -> Result<(), StateError> {
        let mut settings = self.settings.clone();
        settings.apply(change);
        self.write_json(SETTINGS_KEY, &settings)?;
        info!(key = change.key(), "setting updated");
        self.settings = settings;
        Ok(())
    }

    /// Flip between light and dark and persist the result.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Persist`] when the theme cannot be written.
    pub fn toggle_theme(&mut self) -> Result<Theme, StateError> {
        let theme = self.theme.toggled();
        if let Err(source) = self.store.set(THEME_KEY, theme.as_str()) {
            self.notify(NoticeLevel::Danger, "Could not save theme.");
            return Err(StateError::Persist {
                key: THEME_KEY,
                source,
            });
        }
        self.theme = theme;
        Ok(theme)
    }

    /// Serialize a list verbatim as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Encode`] if serialization fails.
    pub fn export_collection(&mut self, which: Collection) -> Result<String, StateError> {
        let encoded = match which {
            Collection::Favorites => transfer::export_json(&self.favorites),
            Collection::History => transfer::export_json(&self.history),
        }
        .map_err(|source| StateError::Encode {
            key: collection_key(which),
            source,
        })?;
        self.notify(NoticeLevel::Success, format!("{which} exported!"));
        Ok(encoded)
    }

    /// Import favorites from a JSON array payload and return how many were
    /// read.
    ///
    /// # Errors
    ///
    /// - [`StateError::InvalidFormat`] when the payload is not an array of
    ///   favorites; nothing changes.
    /// - [`StateError::Persist`] when favorites cannot be written.
    pub fn import_collection(
        &mut self,
        payload: &str,
        mode: ImportMode,
    ) -> Result<usize, StateError> {
        let imported = match transfer::parse_favorites(payload) {
            Ok(imported) => imported,
            Err(err) => {
                warn!(error = %err, "import rejected");
                self.notify(NoticeLevel::Danger, "Invalid file format");
                return Err(err.into());
            }
        };
        let count = imported.len();

        let favorites = match mode {
            ImportMode::Merge => {
                let mut merged = self.favorites.clone();
                merged.extend(imported);
                merged
            }
            ImportMode::Replace => imported,
        };

        if let Err(err) = self.write_json(FAVORITES_KEY, &favorites) {
            self.notify(NoticeLevel::Danger, "Could not save favorites.");
            return Err(err);
        }

        info!(count, ?mode, "favorites imported");
        self.favorites = favorites;
        self.notify(NoticeLevel::Success, format!("Imported {count} items!"));
        Ok(count)
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// Treat the newest history entry as the last generated topic.
    ///
    /// A short-lived process calls this to continue the duplicate check of
    /// an earlier run.
    pub fn restore_last_topic(&mut self) {
        self.last_topic = self.history.last().map(|entry| entry.topic.clone());
    }

    /// Whether generating `topic` again should ask for confirmation first.
    #[must_use]
    pub fn should_warn_duplicate(&self, topic: &str) -> bool {
        self.settings.duplicate_warning && self.last_topic.as_deref() == Some(topic.trim())
    }

    /// Up to [`AUTOCOMPLETE_LIMIT`] distinct history topics containing
    /// `input`, in stored order.
    #[must_use]
    pub fn autocomplete(&self, input: &str) -> Vec<String> {
        if !self.settings.autocomplete || input.chars().count() < AUTOCOMPLETE_MIN_CHARS {
            return Vec::new();
        }
        let needle = input.to_lowercase();
        let mut seen = HashSet::new();
        self.history
            .iter()
            .map(|entry| entry.topic())
            .filter(|topic| seen.insert(*topic))
            .filter(|topic| topic.to_lowercase().contains(&needle))
            .take(AUTOCOMPLETE_LIMIT)
            .map(str::to_string)
            .collect()
    }

    /// Totals for the statistics view.
    #[must_use]
    pub fn statistics_summary(&self) -> StatsSummary {
        let mut most_used: Option<MostUsed> = None;
        for (topic, &count) in &self.statistics.topic_counts {
            if most_used.as_ref().is_none_or(|best| count > best.count) {
                most_used = Some(MostUsed {
                    topic: topic.clone(),
                    count,
                });
            }
        }

        StatsSummary {
            total_generations: self.statistics.total_generations,
            favorites_count: self.favorites.len(),
            unique_topics: self.statistics.topic_counts.len(),
            most_used,
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notifications.push(Notification {
            level,
            message: message.into(),
        });
    }

    fn write_json<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), StateError> {
        let encoded =
            serde_json::to_string(value).map_err(|source| StateError::Encode { key, source })?;
        self.store
            .set(key, &encoded)
            .map_err(|source| StateError::Persist { key, source })
    }
}

const fn collection_key(which: Collection) -> &'static str {
    match which {
        Collection::Favorites => FAVORITES_KEY,
        Collection::History => HISTORY_KEY,
    }
}

fn load_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore,
{
    match store.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(key, error = %err, "stored value is malformed, using default");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(err) => {
            warn!(key, error = %err, "failed to read stored value, using default");
            T::default()
        }
    }
}

fn load_theme<S: KeyValueStore>(store: &S) -> Theme {
    match store.get(THEME_KEY) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|err| {
            warn!(key = THEME_KEY, error = %err, "stored theme is malformed, using default");
            Theme::default()
        }),
        Ok(None) => Theme::default(),
        Err(err) => {
            warn!(key = THEME_KEY, error = %err, "failed to read theme, using default");
            Theme::default()
        }
    }
}
