//! `tw settings`: show or change preferences.

use super::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};
use clap::Subcommand;
use std::io::Write;
use topicwords_core::error::ErrorCode;
use topicwords_core::model::{SettingChange, Settings};

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print every setting.
    Show,

    /// Change one setting.
    Set {
        /// animations, sounds, autocomplete, duplicate-warning or view-mode.
        key: String,
        /// on/off (or true/false) for switches; normal, compact or expanded for view-mode.
        value: String,
    },
}

pub fn run_settings(command: Option<&SettingsCommand>, ctx: &Context) -> anyhow::Result<()> {
    let mut manager = ctx.open_manager()?;

    if let Some(SettingsCommand::Set { key, value }) = command {
        let change = SettingChange::parse(key, value)
            .map_err(|err| ctx.fail(ErrorCode::InvalidSetting, err.to_string()))?;
        manager
            .update_setting(change)
            .map_err(|err| ctx.fail(err.code(), err.to_string()))?;
        ctx.flush_notices(&mut manager)?;
    }

    render_settings(ctx, manager.settings())
}

const fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn render_settings(ctx: &Context, settings: &Settings) -> anyhow::Result<()> {
    render_mode(
        ctx.output,
        settings,
        |s, w| {
            writeln!(w, "animations\t{}", on_off(s.animations))?;
            writeln!(w, "sounds\t{}", on_off(s.sounds))?;
            writeln!(w, "autocomplete\t{}", on_off(s.autocomplete))?;
            writeln!(w, "duplicate-warning\t{}", on_off(s.duplicate_warning))?;
            writeln!(w, "view-mode\t{}", s.view_mode)
        },
        |s, w| {
            pretty_section(w, "Settings")?;
            pretty_kv(w, "animations", on_off(s.animations))?;
            pretty_kv(w, "sounds", on_off(s.sounds))?;
            pretty_kv(w, "autocomplete", on_off(s.autocomplete))?;
            pretty_kv(w, "duplicate-warning", on_off(s.duplicate_warning))?;
            pretty_kv(w, "view-mode", s.view_mode.as_str())
        },
    )
}
