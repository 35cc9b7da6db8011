//! `tw import`: load favorites from a JSON export.

use super::Context;
use crate::output::render;
use clap::Args;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use topicwords_core::error::ErrorCode;
use topicwords_core::transfer::ImportMode;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON file holding an array of favorites.
    pub file: PathBuf,

    /// Replace existing favorites instead of appending.
    #[arg(long)]
    pub replace: bool,
}

pub fn run_import(args: &ImportArgs, ctx: &Context) -> anyhow::Result<()> {
    let payload = std::fs::read_to_string(&args.file).map_err(|err| {
        ctx.fail(
            ErrorCode::StoreReadFailed,
            format!("cannot read {}: {err}", args.file.display()),
        )
    })?;
    let mode = if args.replace {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };

    let mut manager = ctx.open_manager()?;
    let imported = manager
        .import_collection(&payload, mode)
        .map_err(|err| ctx.fail(err.code(), err.to_string()))?;
    ctx.flush_notices(&mut manager)?;

    let total = manager.favorites().len();
    render(
        ctx.output,
        &json!({ "ok": true, "imported": imported, "favorites": total }),
        |_, w| writeln!(w, "imported {imported} favorites ({total} total)"),
    )
}
