//! JSON import and export of the persisted lists.

use crate::model::FavoriteEntry;
use serde::Serialize;
use std::{fmt, str::FromStr};

/// Which list an export reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Favorites,
    History,
}

impl Collection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::History => "history",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "favorites" | "favourites" => Ok(Self::Favorites),
            "history" => Ok(Self::History),
            other => Err(format!("unknown collection '{other}' (expected favorites or history)")),
        }
    }
}

/// How imported favorites combine with the existing list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Append imported entries after the existing ones.
    #[default]
    Merge,
    /// Discard existing favorites.
    Replace,
}

/// Why an import payload was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("payload is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("top-level value is a {0}, expected an array")]
    NotAnArray(&'static str),

    #[error("entry {index} is not a favorite: {source}")]
    BadEntry {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Serialize a list verbatim as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export_json<T: Serialize>(items: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(items)
}

/// Parse an import payload into favorites.
///
/// # Errors
///
/// Returns [`ImportError`] when the payload is not JSON, is not an array, or
/// contains an element without string `topic` and `words` fields.
pub fn parse_favorites(payload: &str) -> Result<Vec<FavoriteEntry>, ImportError> {
    let value: serde_json::Value = serde_json::from_str(payload).map_err(ImportError::NotJson)?;
    let elements = match value {
        serde_json::Value::Array(elements) => elements,
        other => return Err(ImportError::NotAnArray(json_kind(&other))),
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            serde_json::from_value(element).map_err(|source| ImportError::BadEntry { index, source })
        })
        .collect()
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_of_favorites_with_optional_tags() {
        let payload = r#"[
            {"topic": "a", "words": "x.y.z"},
            {"topic": "b", "words": "p.q.r", "tags": ["fun"]}
        ]"#;
        let favorites = parse_favorites(payload).expect("parse");
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[1].tags(), ["fun"]);
    }

    #[test]
    fn rejects_non_array_top_level() {
        let err = parse_favorites(r#"{"topic": "a", "words": "x"}"#).expect_err("object");
        assert!(matches!(err, ImportError::NotAnArray("object")));

        let err = parse_favorites("not json").expect_err("garbage");
        assert!(matches!(err, ImportError::NotJson(_)));
    }

    #[test]
    fn rejects_malformed_element_with_index() {
        let err = parse_favorites(r#"[{"topic": "a", "words": "x"}, 42]"#).expect_err("bad entry");
        assert!(matches!(err, ImportError::BadEntry { index: 1, .. }));
    }

    #[test]
    fn export_is_pretty_array() {
        let out = export_json(&[FavoriteEntry::new("a", "x.y.z")]).expect("export");
        assert!(out.starts_with("[\n"));
        assert_eq!(parse_favorites(&out).expect("reparse").len(), 1);
    }

    #[test]
    fn collection_parses() {
        assert_eq!("History".parse::<Collection>(), Ok(Collection::History));
        assert!("notes".parse::<Collection>().is_err());
    }
}
