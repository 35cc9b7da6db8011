//! `tw theme`: show or flip the light/dark theme.

use super::Context;
use crate::output::render;
use clap::Args;
use serde_json::json;
use std::io::Write;

#[derive(Args, Debug)]
pub struct ThemeArgs {
    /// Switch between light and dark.
    #[arg(long)]
    pub toggle: bool,
}

pub fn run_theme(args: &ThemeArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut manager = ctx.open_manager()?;
    let theme = if args.toggle {
        manager
            .toggle_theme()
            .map_err(|err| ctx.fail(err.code(), err.to_string()))?
    } else {
        manager.theme()
    };

    render(ctx.output, &json!({ "theme": theme }), |_, w| {
        writeln!(w, "{theme}")
    })
}
