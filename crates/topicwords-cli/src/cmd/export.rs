//! `tw export`: write favorites or history as a JSON array.

use super::Context;
use crate::output::render;
use anyhow::Context as _;
use clap::Args;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use topicwords_core::transfer::Collection;
use tracing::info;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Which list to export: favorites or history.
    pub collection: Collection,

    /// Destination file or directory; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run_export(args: &ExportArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut manager = ctx.read_manager()?;
    let payload = manager
        .export_collection(args.collection)
        .map_err(|err| ctx.fail(err.code(), err.to_string()))?;

    match &args.output {
        Some(target) => {
            let path = if target.is_dir() {
                let now = chrono::Utc::now().timestamp_millis();
                target.join(default_file_name(args.collection, now))
            } else {
                target.clone()
            };
            std::fs::write(&path, format!("{payload}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(collection = %args.collection, path = %path.display(), "exported");
            ctx.flush_notices(&mut manager)?;
            let shown = path.display().to_string();
            render(
                ctx.output,
                &json!({ "ok": true, "collection": args.collection.as_str(), "path": shown }),
                |_, w| writeln!(w, "exported {} to {shown}", args.collection),
            )?;
        }
        None => {
            // The payload itself is the output, in every mode.
            let stdout = std::io::stdout();
            writeln!(stdout.lock(), "{payload}")?;
            manager.drain_notifications();
        }
    }
    Ok(())
}

/// File name used when exporting into a directory.
fn default_file_name(collection: Collection, now_millis: i64) -> String {
    format!("topicwords-{collection}-{now_millis}.json")
}
