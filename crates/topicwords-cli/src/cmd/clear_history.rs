//! `tw clear-history`: empty the history.

use super::Context;
use crate::output::render;
use clap::Args;
use serde_json::json;
use std::io::Write;
use topicwords_core::error::ErrorCode;

#[derive(Args, Debug)]
pub struct ClearHistoryArgs {
    /// Confirm clearing without prompting.
    #[arg(long)]
    pub yes: bool,
}

pub fn run_clear_history(args: &ClearHistoryArgs, ctx: &Context) -> anyhow::Result<()> {
    if !args.yes {
        return Err(ctx.fail(
            ErrorCode::ConfirmationRequired,
            "clearing history cannot be undone outside `tw session`",
        ));
    }

    let mut manager = ctx.open_manager()?;
    let cleared = manager.history().len();
    manager
        .clear_history()
        .map_err(|err| ctx.fail(err.code(), err.to_string()))?;
    ctx.flush_notices(&mut manager)?;

    render(ctx.output, &json!({ "ok": true, "cleared": cleared }), |_, w| {
        writeln!(w, "cleared {cleared} history entries")
    })
}
