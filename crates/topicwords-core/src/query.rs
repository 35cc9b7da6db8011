//! Search and sort over favorites and history.
//!
//! Filtering always runs before sorting. The term matches case-insensitively
//! as a substring of either `topic` or `words`; an empty term matches every
//! entry.
//!
//! `recent` returns entries in stored order. History is stored oldest-first,
//! so callers that want newest-first output reverse at render time.

use crate::model::Entry;
use std::cmp::Ordering;
use std::{fmt, str::FromStr};

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Stored order, unchanged.
    #[default]
    Recent,
    /// Stored order, reversed.
    Oldest,
    /// `topic` ascending.
    Alpha,
    /// `topic` descending.
    AlphaReverse,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Oldest => "oldest",
            Self::Alpha => "alpha",
            Self::AlphaReverse => "alpha-reverse",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "oldest" => Ok(Self::Oldest),
            "alpha" => Ok(Self::Alpha),
            "alpha-reverse" | "alpha_reverse" => Ok(Self::AlphaReverse),
            other => Err(format!(
                "unknown sort order '{other}' (expected recent, oldest, alpha, alpha-reverse)"
            )),
        }
    }
}

/// Compare two strings the way a user-facing list expects.
///
/// Strings compare first on their base letters, ignoring case and the
/// accents of Latin-1 letters, so `Éclair` sorts with the `e`s. Ties are
/// broken by accent (unaccented first) and then by case (lowercase first).
#[must_use]
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let lower = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<_>>();
    let (la, lb) = (lower(a), lower(b));
    la.iter()
        .map(|&c| base_letter(c))
        .cmp(lb.iter().map(|&c| base_letter(c)))
        .then_with(|| la.cmp(&lb))
        .then_with(|| b.cmp(a))
}

/// Strip the accent from a lowercase Latin-1 letter.
const fn base_letter(c: char) -> char {
    match c {
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => c,
    }
}

/// Lazy, restartable view over a slice of entries.
///
/// Nothing is filtered or sorted until [`Filtered::iter`] is called, and every
/// call starts a fresh pass over the underlying slice.
#[derive(Debug, Clone)]
pub struct Filtered<'a, T> {
    items: &'a [T],
    needle: String,
    order: SortOrder,
}

impl<'a, T: Entry> Filtered<'a, T> {
    #[must_use]
    pub fn new(items: &'a [T], term: &str, order: SortOrder) -> Self {
        Self {
            items,
            needle: term.to_lowercase(),
            order,
        }
    }

    /// Lowercased search term.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.needle
    }

    #[must_use]
    pub const fn order(&self) -> SortOrder {
        self.order
    }

    fn matches(&self, entry: &T) -> bool {
        self.needle.is_empty()
            || entry.topic().to_lowercase().contains(&self.needle)
            || entry.words().to_lowercase().contains(&self.needle)
    }

    /// Start a new pass over the matching entries in the requested order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &'a T> + '_> {
        let items = self.items;
        match self.order {
            SortOrder::Recent => Box::new(items.iter().filter(move |e| self.matches(e))),
            SortOrder::Oldest => Box::new(items.iter().rev().filter(move |e| self.matches(e))),
            SortOrder::Alpha | SortOrder::AlphaReverse => {
                let mut sorted: Vec<&'a T> =
                    items.iter().filter(|e| self.matches(e)).collect();
                if self.order == SortOrder::Alpha {
                    sorted.sort_by(|a, b| locale_cmp(a.topic(), b.topic()));
                } else {
                    sorted.sort_by(|a, b| locale_cmp(b.topic(), a.topic()));
                }
                Box::new(sorted.into_iter())
            }
        }
    }

    /// Number of matching entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.iter().filter(|e| self.matches(e)).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.items.iter().any(|e| self.matches(e))
    }

    /// Materialize the current pass.
    #[must_use]
    pub fn to_vec(&self) -> Vec<&'a T> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FavoriteEntry, HistoryEntry};

    fn history(topics: &[(&str, &str)]) -> Vec<HistoryEntry> {
        topics
            .iter()
            .zip(0_i64..)
            .map(|((topic, words), ts)| HistoryEntry {
                topic: (*topic).to_string(),
                words: (*words).to_string(),
                timestamp: ts,
            })
            .collect()
    }

    fn topics<'a>(view: &Filtered<'a, HistoryEntry>) -> Vec<&'a str> {
        view.iter().map(|e| e.topic.as_str()).collect()
    }

    #[test]
    fn empty_term_matches_everything_in_stored_order() {
        let items = history(&[("b", "x"), ("a", "y"), ("c", "z")]);
        let view = Filtered::new(&items, "", SortOrder::Recent);
        assert_eq!(topics(&view), ["b", "a", "c"]);
    }

    #[test]
    fn oldest_reverses_stored_order() {
        let items = history(&[("b", "x"), ("a", "y"), ("c", "z")]);
        let view = Filtered::new(&items, "", SortOrder::Oldest);
        assert_eq!(topics(&view), ["c", "a", "b"]);
    }

    #[test]
    fn alpha_orders_by_topic_regardless_of_insertion() {
        let items = history(&[("street food", "x"), ("Art", "y"), ("ocean", "z")]);
        let view = Filtered::new(&items, "", SortOrder::Alpha);
        assert_eq!(topics(&view), ["Art", "ocean", "street food"]);

        let view = Filtered::new(&items, "", SortOrder::AlphaReverse);
        assert_eq!(topics(&view), ["street food", "ocean", "Art"]);
    }

    #[test]
    fn term_matches_topic_or_words_case_insensitively() {
        let items = history(&[
            ("Space Travel", "rocket.stars.orbit"),
            ("cooking", "pan.heat.FLAVOR"),
            ("gardens", "soil.seed.water"),
        ]);
        assert_eq!(topics(&Filtered::new(&items, "SPACE", SortOrder::Recent)), ["Space Travel"]);
        assert_eq!(topics(&Filtered::new(&items, "flavor", SortOrder::Recent)), ["cooking"]);
        assert!(Filtered::new(&items, "xyz", SortOrder::Alpha).is_empty());
        assert_eq!(Filtered::new(&items, "s", SortOrder::Recent).count(), 3);
    }

    #[test]
    fn view_is_restartable() {
        let items = vec![FavoriteEntry::new("a", "x.y.z"), FavoriteEntry::new("b", "p.q.r")];
        let view = Filtered::new(&items, "", SortOrder::Oldest);
        let first: Vec<_> = view.iter().collect();
        let second: Vec<_> = view.iter().collect();
        assert_eq!(first, second);
        assert_eq!(view.to_vec().len(), 2);
    }

    #[test]
    fn locale_cmp_folds_case_and_puts_lowercase_first() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn locale_cmp_ignores_accents_on_first_pass() {
        let mut words = vec!["zebra", "Éclair", "apple", "eclair", "ecru"];
        words.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(words, ["apple", "eclair", "Éclair", "ecru", "zebra"]);
        assert_eq!(locale_cmp("résumé", "resume"), Ordering::Greater);
        assert_eq!(locale_cmp("Ñandú", "nube"), Ordering::Less);
    }

    #[test]
    fn sort_order_parses_aliases() {
        assert_eq!("alpha_reverse".parse::<SortOrder>(), Ok(SortOrder::AlphaReverse));
        assert_eq!("Recent".parse::<SortOrder>(), Ok(SortOrder::Recent));
        assert!("newest".parse::<SortOrder>().is_err());
    }
}
