//! `tw generate`: describe a topic in a few words.

use super::Context;
use crate::output::render_mode;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use topicwords_core::error::ErrorCode;
use topicwords_core::generate::{Generator, generate_for, validate_topic};
use topicwords_core::model::FavoriteEntry;
use topicwords_core::{KeyValueStore, StateManager};
use tracing::info;

/// Pause between variations so the endpoint is not hammered.
const VARIATION_DELAY: Duration = Duration::from_secs(1);

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Topic to describe (multiple arguments are joined with spaces).
    #[arg(required = true, num_args = 1..)]
    pub topic: Vec<String>,

    /// Number of words to ask for.
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=20))]
    pub words: Option<u16>,

    /// Generate several variations for the same topic.
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=10))]
    pub variations: u16,

    /// Save the (last) result to favorites.
    #[arg(long)]
    pub favorite: bool,

    /// Generate even if this topic was just generated.
    #[arg(long)]
    pub force: bool,
}

/// One accepted generation as shown to the user.
#[derive(Debug, Serialize)]
pub struct GeneratedRow {
    pub topic: String,
    pub words: String,
    pub favorite: bool,
}

/// Options shared by every command that generates.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    pub word_count: usize,
    pub variations: usize,
    pub favorite: bool,
    pub force: bool,
}

pub fn run_generate(args: &GenerateArgs, ctx: &Context) -> anyhow::Result<()> {
    let topic = args.topic.join(" ");
    let options = GenerateOptions {
        word_count: args.words.map_or_else(|| ctx.default_word_count(), usize::from),
        variations: usize::from(args.variations),
        favorite: args.favorite,
        force: args.force,
    };

    let mut manager = ctx.open_manager()?;
    let generator = ctx.generator();
    let rows = produce(ctx, &mut manager, &generator, &topic, options)?;
    ctx.flush_notices(&mut manager)?;
    render_rows(ctx, &rows)
}

/// Run the generation flow `options.variations` times for `topic`.
///
/// The duplicate check applies only to single generations; variations always
/// run.
pub fn produce<S, G>(
    ctx: &Context,
    manager: &mut StateManager<S>,
    generator: &G,
    topic: &str,
    options: GenerateOptions,
) -> anyhow::Result<Vec<GeneratedRow>>
where
    S: KeyValueStore,
    G: Generator + ?Sized,
{
    let topic = validate_topic(topic).map_err(|err| ctx.fail(err.code(), err.to_string()))?;

    if options.variations == 1 && !options.force {
        manager.restore_last_topic();
        if manager.should_warn_duplicate(topic) {
            return Err(ctx.fail(
                ErrorCode::DuplicateTopic,
                format!("you already generated \"{topic}\""),
            ));
        }
    }

    let mut rows = Vec::with_capacity(options.variations);
    for round in 0..options.variations {
        if round > 0 {
            std::thread::sleep(VARIATION_DELAY);
        }
        let generation = generate_for(manager, generator, topic, options.word_count)
            .map_err(|err| ctx.fail(err.code(), err.to_string()))?;
        info!(topic = %generation.topic, words = %generation.words, round, "generated");
        rows.push(GeneratedRow {
            favorite: manager.is_favorite(&generation.words),
            topic: generation.topic,
            words: generation.words,
        });
    }

    if options.favorite {
        if let Some(last) = rows.last_mut().filter(|row| !row.favorite) {
            manager
                .toggle_favorite(FavoriteEntry::new(last.topic.clone(), last.words.clone()))
                .map_err(|err| ctx.fail(err.code(), err.to_string()))?;
            last.favorite = true;
        }
    }

    Ok(rows)
}

pub fn render_rows(ctx: &Context, rows: &[GeneratedRow]) -> anyhow::Result<()> {
    render_mode(
        ctx.output,
        &rows,
        |rows, w| {
            for row in *rows {
                writeln!(w, "{}\t{}", row.words, row.topic)?;
            }
            Ok(())
        },
        |rows, w| {
            for row in *rows {
                let star = if row.favorite { " ★" } else { "" };
                writeln!(w, "#{}{star}", row.words)?;
                writeln!(w, "  {}", row.topic)?;
            }
            Ok(())
        },
    )
}
