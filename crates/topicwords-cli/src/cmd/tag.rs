//! `tw tag`: attach a tag to a favorite.

use super::Context;
use crate::output::render;
use clap::Args;
use serde_json::json;
use std::io::Write;
use topicwords_core::error::ErrorCode;

#[derive(Args, Debug)]
pub struct TagArgs {
    /// Words of the favorite to tag, with or without a leading `#`.
    pub words: String,

    /// Tag to add (surrounding whitespace is ignored).
    pub tag: String,
}

pub fn run_tag(args: &TagArgs, ctx: &Context) -> anyhow::Result<()> {
    let words = args.words.trim().trim_start_matches('#');
    let mut manager = ctx.open_manager()?;

    if !manager.is_favorite(words) {
        return Err(ctx.fail(
            ErrorCode::FavoriteNotFound,
            format!("#{words} is not a favorite"),
        ));
    }

    let added = manager
        .add_tag(words, &args.tag)
        .map_err(|err| ctx.fail(err.code(), err.to_string()))?;
    ctx.flush_notices(&mut manager)?;

    let tags: Vec<String> = manager
        .favorites()
        .iter()
        .find(|f| f.words == words)
        .map(|f| f.tags().to_vec())
        .unwrap_or_default();

    let value = json!({
        "ok": true,
        "words": words,
        "added": added,
        "tags": tags,
    });
    render(ctx.output, &value, |_, w| {
        if added {
            writeln!(w, "#{words}: tags {}", tags.join(", "))
        } else {
            writeln!(w, "#{words}: tags unchanged ({})", tags.join(", "))
        }
    })
}
