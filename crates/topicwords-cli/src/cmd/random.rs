//! `tw random`: pick a topic from the built-in lists.

use super::Context;
use super::generate::{GenerateOptions, produce, render_rows};
use crate::output::render;
use clap::Args;
use serde_json::json;
use std::io::Write;
use topicwords_core::topics::{TopicPool, pick};

#[derive(Args, Debug)]
pub struct RandomArgs {
    /// Draw from the whimsical surprise list and generate right away.
    #[arg(long)]
    pub surprise: bool,

    /// Generate words for the picked topic.
    #[arg(short, long)]
    pub generate: bool,
}

pub fn run_random(args: &RandomArgs, ctx: &Context) -> anyhow::Result<()> {
    let pool = if args.surprise {
        TopicPool::Surprise
    } else {
        TopicPool::Random
    };
    let topic = pick(pool, &mut rand::thread_rng());

    if !(args.generate || args.surprise) {
        return render(ctx.output, &json!({ "topic": topic }), |_, w| {
            writeln!(w, "{topic}")
        });
    }

    let mut manager = ctx.open_manager()?;
    let generator = ctx.generator();
    let options = GenerateOptions {
        word_count: ctx.default_word_count(),
        variations: 1,
        favorite: false,
        force: true,
    };
    let rows = produce(ctx, &mut manager, &generator, topic, options)?;
    ctx.flush_notices(&mut manager)?;
    render_rows(ctx, &rows)
}
