//! `tw favorites` and `tw history`: filtered, sorted listings.

use super::Context;
use crate::output::{pretty_section, render_mode};
use chrono::{Local, TimeZone};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use topicwords_core::model::{FavoriteEntry, HistoryEntry, ViewMode};
use topicwords_core::query::SortOrder;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show entries whose topic or words contain this text.
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Sort order: recent, oldest, alpha, alpha-reverse.
    #[arg(long, default_value = "recent")]
    pub sort: SortOrder,
}

#[derive(Args, Debug)]
pub struct FavoritesArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Only show favorites carrying this tag.
    #[arg(short, long)]
    pub tag: Option<String>,
}

pub fn run_favorites(args: &FavoritesArgs, ctx: &Context) -> anyhow::Result<()> {
    let manager = ctx.read_manager()?;
    let view_mode = manager.settings().view_mode;
    let view = manager.query_favorites(&args.list.search, args.list.sort);
    let mut rows: Vec<&FavoriteEntry> = view
        .iter()
        .filter(|f| args.tag.as_deref().is_none_or(|tag| f.has_tag(tag)))
        .collect();
    // Favorites are appended as they are added, like history.
    if flips_stored_order(args.list.sort) {
        rows.reverse();
    }

    render_mode(
        ctx.output,
        &rows,
        |rows, w| {
            for fav in rows {
                writeln!(w, "{}\t{}\t{}", fav.words, fav.topic, fav.tags().join(","))?;
            }
            Ok(())
        },
        |rows, w| {
            pretty_section(w, &format!("Favorites ({})", rows.len()))?;
            if rows.is_empty() {
                return writeln!(w, "No favorites yet.");
            }
            for fav in rows {
                write_favorite(w, fav, view_mode)?;
            }
            Ok(())
        },
    )
}

/// Lists are stored oldest first, so `recent` and `oldest` both flip the
/// stored order for display.
const fn flips_stored_order(order: SortOrder) -> bool {
    matches!(order, SortOrder::Recent | SortOrder::Oldest)
}

fn write_favorite(w: &mut dyn Write, fav: &FavoriteEntry, mode: ViewMode) -> io::Result<()> {
    match mode {
        ViewMode::Compact => writeln!(w, "#{} - {}", fav.words, fav.topic),
        ViewMode::Normal | ViewMode::Expanded => {
            writeln!(w, "#{}", fav.words)?;
            writeln!(w, "  {}", fav.topic)?;
            if !fav.tags().is_empty() {
                writeln!(w, "  tags: {}", fav.tags().join(", "))?;
            }
            if mode == ViewMode::Expanded {
                writeln!(w)?;
            }
            Ok(())
        }
    }
}

/// History row with a rendered local time.
#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    #[serde(flatten)]
    entry: &'a HistoryEntry,
    #[serde(skip)]
    when: String,
}

pub fn run_history(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let manager = ctx.read_manager()?;
    let view_mode = manager.settings().view_mode;
    let view = manager.query_history(&args.search, args.sort);
    let mut rows: Vec<HistoryRow<'_>> = view
        .iter()
        .map(|entry| HistoryRow {
            entry,
            when: format_timestamp(entry.timestamp),
        })
        .collect();
    if flips_stored_order(args.sort) {
        rows.reverse();
    }

    render_mode(
        ctx.output,
        &rows,
        |rows, w| {
            for row in rows {
                writeln!(w, "{}\t{}\t{}", row.entry.words, row.entry.topic, row.entry.timestamp)?;
            }
            Ok(())
        },
        |rows, w| {
            pretty_section(w, &format!("History ({})", rows.len()))?;
            if rows.is_empty() {
                return writeln!(w, "No history yet.");
            }
            for row in rows {
                match view_mode {
                    ViewMode::Compact => {
                        writeln!(w, "#{} - {}", row.entry.words, row.entry.topic)?;
                    }
                    ViewMode::Normal => {
                        writeln!(w, "#{}", row.entry.words)?;
                        writeln!(w, "  {}", row.entry.topic)?;
                    }
                    ViewMode::Expanded => {
                        writeln!(w, "#{}", row.entry.words)?;
                        writeln!(w, "  {}", row.entry.topic)?;
                        writeln!(w, "  {}", row.when)?;
                        writeln!(w)?;
                    }
                }
            }
            Ok(())
        },
    )
}

fn format_timestamp(millis: i64) -> String {
    Local.timestamp_millis_opt(millis).single().map_or_else(
        || millis.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M").to_string(),
    )
}
