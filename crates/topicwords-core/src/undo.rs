//! Session-scoped undo log.
//!
//! Every favorite toggle and history clear records how to reverse itself:
//!
//! | Mutation | Recorded action | Reversal |
//! |---|---|---|
//! | favorite added | `AddFavorite(item)` | remove favorites whose `words` match |
//! | favorite removed | `RemoveFavorite(item)` | append `item` at the end |
//! | history cleared | `ClearHistory(snapshot)` | replace history with `snapshot` |
//!
//! The log lives in memory only and is lost when the process exits. Undo is
//! single-level per action: there is no redo.

use crate::model::{FavoriteEntry, HistoryEntry};
use serde::Serialize;

/// A reversible mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "item", rename_all = "camelCase")]
pub enum UndoAction {
    AddFavorite(FavoriteEntry),
    RemoveFavorite(FavoriteEntry),
    ClearHistory(Vec<HistoryEntry>),
}

impl UndoAction {
    /// Short description used in notifications.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::AddFavorite(item) => format!("add favorite #{}", item.words),
            Self::RemoveFavorite(item) => format!("remove favorite #{}", item.words),
            Self::ClearHistory(snapshot) => {
                format!("clear history ({} entries)", snapshot.len())
            }
        }
    }
}

/// LIFO stack of [`UndoAction`]s.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    actions: Vec<UndoAction>,
}

impl UndoStack {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: UndoAction) {
        self.actions.push(action);
    }

    pub fn pop(&mut self) -> Option<UndoAction> {
        self.actions.pop()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&UndoAction> {
        self.actions.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
