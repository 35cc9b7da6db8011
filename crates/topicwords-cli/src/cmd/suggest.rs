//! `tw suggest`: autocomplete topics from history.

use super::Context;
use crate::output::render;
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Partial topic (at least two characters).
    pub prefix: String,
}

pub fn run_suggest(args: &SuggestArgs, ctx: &Context) -> anyhow::Result<()> {
    let manager = ctx.read_manager()?;
    let suggestions = manager.autocomplete(&args.prefix);
    render(ctx.output, &suggestions, |items, w| {
        for topic in items {
            writeln!(w, "{topic}")?;
        }
        Ok(())
    })
}
