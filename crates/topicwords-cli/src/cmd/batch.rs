//! `tw batch`: generate words for every topic in a file.

use super::Context;
use crate::output::{pretty_section, render_mode};
use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use topicwords_core::error::ErrorCode;
use topicwords_core::generate::generate_for;
use tracing::warn;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// File with one topic per line; blank lines are skipped.
    pub file: PathBuf,

    /// Number of words to ask for.
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..=20))]
    pub words: Option<u16>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum BatchOutcome {
    Success { topic: String, words: String },
    Error { topic: String, error: String },
}

#[derive(Debug, Serialize)]
struct BatchReport {
    total: usize,
    succeeded: usize,
    results: Vec<BatchOutcome>,
}

pub fn run_batch(args: &BatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let topics: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if topics.is_empty() {
        return Err(ctx.fail(
            ErrorCode::EmptyTopic,
            format!("{} contains no topics", args.file.display()),
        ));
    }

    let word_count = args.words.map_or_else(|| ctx.default_word_count(), usize::from);
    let mut manager = ctx.open_manager()?;
    let generator = ctx.generator();

    let mut results = Vec::with_capacity(topics.len());
    for topic in &topics {
        match generate_for(&mut manager, &generator, topic, word_count) {
            Ok(generation) => results.push(BatchOutcome::Success {
                topic: generation.topic,
                words: generation.words,
            }),
            Err(err) => {
                warn!(topic, error = %err, "batch topic failed");
                results.push(BatchOutcome::Error {
                    topic: (*topic).to_string(),
                    error: err.to_string(),
                });
            }
        }
    }

    let report = BatchReport {
        total: topics.len(),
        succeeded: results
            .iter()
            .filter(|r| matches!(r, BatchOutcome::Success { .. }))
            .count(),
        results,
    };
    ctx.flush_notices(&mut manager)?;

    render_mode(
        ctx.output,
        &report,
        |report, w| {
            for outcome in &report.results {
                match outcome {
                    BatchOutcome::Success { topic, words } => writeln!(w, "ok\t{topic}\t{words}")?,
                    BatchOutcome::Error { topic, error } => writeln!(w, "error\t{topic}\t{error}")?,
                }
            }
            Ok(())
        },
        |report, w| {
            pretty_section(
                w,
                &format!("Batch: {} / {} succeeded", report.succeeded, report.total),
            )?;
            for outcome in &report.results {
                match outcome {
                    BatchOutcome::Success { topic, words } => writeln!(w, "✓ {topic}: #{words}")?,
                    BatchOutcome::Error { topic, error } => writeln!(w, "✗ {topic}: {error}")?,
                }
            }
            Ok(())
        },
    )
}
