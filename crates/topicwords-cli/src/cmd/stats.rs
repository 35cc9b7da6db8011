//! `tw stats`: generation statistics.

use super::Context;
use crate::output::{pretty_kv, pretty_section, render_mode};
use std::io::Write;

pub fn run_stats(ctx: &Context) -> anyhow::Result<()> {
    let manager = ctx.read_manager()?;
    let summary = manager.statistics_summary();

    render_mode(
        ctx.output,
        &summary,
        |s, w| {
            writeln!(w, "total_generations\t{}", s.total_generations)?;
            writeln!(w, "favorites\t{}", s.favorites_count)?;
            writeln!(w, "unique_topics\t{}", s.unique_topics)?;
            if let Some(most) = &s.most_used {
                writeln!(w, "most_used\t{}\t{}", most.topic, most.count)?;
            }
            Ok(())
        },
        |s, w| {
            pretty_section(w, "Statistics")?;
            pretty_kv(w, "Generations", s.total_generations.to_string())?;
            pretty_kv(w, "Favorites", s.favorites_count.to_string())?;
            pretty_kv(w, "Unique topics", s.unique_topics.to_string())?;
            let most = s
                .most_used
                .as_ref()
                .map_or_else(|| "-".to_string(), |m| format!("{} ({}x)", m.topic, m.count));
            pretty_kv(w, "Most used", most)
        },
    )
}
