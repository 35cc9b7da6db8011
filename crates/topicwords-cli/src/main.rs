#![forbid(unsafe_code)]

mod cmd;
mod generator;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::{Context, Reported};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use topicwords_core::config::resolve_config;
use topicwords_core::error::ErrorCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "tw",
    author,
    version,
    about = "tw: describe any topic in a few memorable words",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json and FORMAT).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Directory holding favorites, history, settings and statistics.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Suppress notifications.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Generate",
        about = "Describe a topic in a few words",
        long_about = "Ask the generation service for words describing a topic and record the result in history.",
        after_help = "EXAMPLES:\n    # Three words for a topic\n    tw generate space travel\n\n    # Five words, three variations\n    tw generate coffee --words 5 -n 3\n\n    # Save straight to favorites\n    tw generate jazz --favorite"
    )]
    Generate(cmd::generate::GenerateArgs),

    #[command(
        next_help_heading = "Generate",
        about = "Pick a random topic",
        long_about = "Pick a topic from the built-in lists, optionally generating words for it.",
        after_help = "EXAMPLES:\n    # Just pick a topic\n    tw random\n\n    # Pick and generate\n    tw random --generate\n\n    # Something whimsical\n    tw random --surprise"
    )]
    Random(cmd::random::RandomArgs),

    #[command(
        next_help_heading = "Generate",
        about = "Generate words for every topic in a file",
        long_about = "Generate words for each non-blank line of a file. Failures are reported per topic.",
        after_help = "EXAMPLES:\n    # One topic per line\n    tw batch topics.txt\n\n    # Emit machine-readable output\n    tw batch topics.txt --json"
    )]
    Batch(cmd::batch::BatchArgs),

    #[command(
        next_help_heading = "Session",
        about = "Interactive session with undo",
        long_about = "Read commands from stdin. Favorite changes and history clears can be undone until the session ends.",
        after_help = "EXAMPLES:\n    # Start a session\n    tw session"
    )]
    Session,

    #[command(
        next_help_heading = "Read",
        about = "List favorites",
        long_about = "List saved favorites with optional search, tag filter and sort order.",
        after_help = "EXAMPLES:\n    # All favorites\n    tw favorites\n\n    # Search and sort\n    tw favorites --search space --sort alpha\n\n    # Only one tag\n    tw favorites --tag sci-fi"
    )]
    Favorites(cmd::list::FavoritesArgs),

    #[command(
        next_help_heading = "Read",
        about = "List generation history",
        long_about = "List past generations, newest first by default.",
        after_help = "EXAMPLES:\n    # Newest first\n    tw history\n\n    # Filter\n    tw history --search ocean\n\n    # Emit machine-readable output\n    tw history --json"
    )]
    History(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Generation statistics",
        after_help = "EXAMPLES:\n    tw stats\n    tw stats --json"
    )]
    Stats,

    #[command(
        next_help_heading = "Read",
        about = "Suggest topics from history",
        long_about = "List up to five history topics containing the given text.",
        after_help = "EXAMPLES:\n    tw suggest spa"
    )]
    Suggest(cmd::suggest::SuggestArgs),

    #[command(
        next_help_heading = "Favorites",
        about = "Add or remove a favorite",
        long_about = "Toggle a topic/words pair in favorites. Favorites are matched by words.",
        after_help = "EXAMPLES:\n    # Add (or remove if present)\n    tw favorite \"space travel\" rocket.stars.orbit"
    )]
    Favorite(cmd::favorite::FavoriteArgs),

    #[command(
        next_help_heading = "Favorites",
        about = "Tag a favorite",
        after_help = "EXAMPLES:\n    tw tag rocket.stars.orbit sci-fi"
    )]
    Tag(cmd::tag::TagArgs),

    #[command(
        next_help_heading = "Favorites",
        about = "Export favorites or history as JSON",
        after_help = "EXAMPLES:\n    # To stdout\n    tw export favorites\n\n    # Into a directory (timestamped file name)\n    tw export history --output ~/backups"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Favorites",
        about = "Import favorites from a JSON file",
        long_about = "Append favorites from a JSON array, or replace them with --replace.",
        after_help = "EXAMPLES:\n    tw import favorites.json\n    tw import favorites.json --replace"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Delete all history",
        after_help = "EXAMPLES:\n    tw clear-history --yes"
    )]
    ClearHistory(cmd::clear_history::ClearHistoryArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Show or change settings",
        after_help = "EXAMPLES:\n    tw settings\n    tw settings set view-mode compact\n    tw settings set duplicate-warning off"
    )]
    Settings {
        #[command(subcommand)]
        command: Option<cmd::settings::SettingsCommand>,
    },

    #[command(
        next_help_heading = "Maintenance",
        about = "Show or toggle the theme",
        after_help = "EXAMPLES:\n    tw theme\n    tw theme --toggle"
    )]
    Theme(cmd::theme::ThemeArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tw completions bash\n\n    # Generate zsh completions\n    tw completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TOPICWORDS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "topicwords=debug,tw=debug,warn"
        } else {
            "topicwords=warn"
        })
    });

    let format = env::var("TOPICWORDS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn dispatch(command: &Commands, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Commands::Generate(args) => cmd::generate::run_generate(args, ctx),
        Commands::Random(args) => cmd::random::run_random(args, ctx),
        Commands::Batch(args) => cmd::batch::run_batch(args, ctx),
        Commands::Session => cmd::session::run_session(ctx),
        Commands::Favorites(args) => cmd::list::run_favorites(args, ctx),
        Commands::History(args) => cmd::list::run_history(args, ctx),
        Commands::Stats => cmd::stats::run_stats(ctx),
        Commands::Suggest(args) => cmd::suggest::run_suggest(args, ctx),
        Commands::Favorite(args) => cmd::favorite::run_favorite(args, ctx),
        Commands::Tag(args) => cmd::tag::run_tag(args, ctx),
        Commands::Export(args) => cmd::export::run_export(args, ctx),
        Commands::Import(args) => cmd::import::run_import(args, ctx),
        Commands::ClearHistory(args) => cmd::clear_history::run_clear_history(args, ctx),
        Commands::Settings { command } => cmd::settings::run_settings(command.as_ref(), ctx),
        Commands::Theme(args) => cmd::theme::run_theme(args, ctx),
        Commands::Completions(args) => {
            cmd::completions::run_completions(args, &mut Cli::command())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match resolve_config(cli.data_dir.clone(), cli.json) {
        Ok(config) => config,
        Err(err) => {
            let mode = resolve_output_mode(cli.format, cli.json, None);
            let error = CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}"));
            if render_error(mode, &error).is_err() {
                eprintln!("error: {err:#}");
            }
            return ExitCode::FAILURE;
        }
    };
    debug!(data_dir = %config.data_dir.display(), "config resolved");

    let output = resolve_output_mode(cli.format, cli.json, config.user.output.as_deref());
    let ctx = Context {
        output,
        quiet: cli.quiet,
        config,
    };

    match dispatch(&cli.command, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is::<Reported>() => ExitCode::FAILURE,
        Err(err) => {
            let error = CliError::from_code(ErrorCode::InternalUnexpected, format!("{err:#}"));
            if render_error(output, &error).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
