//! `tw favorite`: toggle a (topic, words) pair in favorites.

use super::Context;
use crate::output::render;
use clap::Args;
use serde_json::json;
use std::io::Write;
use topicwords_core::model::FavoriteEntry;

#[derive(Args, Debug)]
pub struct FavoriteArgs {
    /// Topic the words describe.
    pub topic: String,

    /// Dot-separated words, with or without a leading `#`.
    pub words: String,
}

pub fn run_favorite(args: &FavoriteArgs, ctx: &Context) -> anyhow::Result<()> {
    let words = args.words.trim().trim_start_matches('#');
    let mut manager = ctx.open_manager()?;

    let added = manager
        .toggle_favorite(FavoriteEntry::new(args.topic.trim(), words))
        .map_err(|err| ctx.fail(err.code(), err.to_string()))?;
    ctx.flush_notices(&mut manager)?;

    let value = json!({
        "ok": true,
        "topic": args.topic.trim(),
        "words": words,
        "favorite": added,
    });
    render(ctx.output, &value, |_, w| {
        if added {
            writeln!(w, "★ #{words}")
        } else {
            writeln!(w, "☆ #{words}")
        }
    })
}
