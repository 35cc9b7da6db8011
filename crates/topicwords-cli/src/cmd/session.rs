//! `tw session`: interactive loop where undo lives across commands.
//!
//! A line that is exactly a command word runs that command. Commands that
//! take an argument need a leading `/` (`/tag fun`), so a topic such as
//! "theme parks" is never mistaken for one. Anything else is a topic to
//! generate. The undo log lasts until the session ends.

use super::Context;
use std::io::{self, BufRead, Write};
use topicwords_core::generate::{Generation, Generator, generate_for, validate_topic};
use topicwords_core::manager::NoticeLevel;
use topicwords_core::model::FavoriteEntry;
use topicwords_core::query::SortOrder;
use topicwords_core::topics::{TopicPool, pick};
use topicwords_core::{KeyValueStore, StateManager};
use tracing::debug;

const HELP: &str = "\
commands:
  <topic>            generate words for a topic
  again              generate the last topic again
  fav                toggle the current result in favorites
  undo               undo the last favorite change or history clear
  history            newest-first history
  favorites          newest-first favorites
  random | surprise  pick a built-in topic (surprise also generates)
  clear              clear history (asks first)
  stats              generation statistics
  theme              toggle light/dark
  help               this text
  quit               leave the session
  /tag <tag>         tag the current result (must be a favorite)
  /history <text>    history filtered by <text>
  /favorites <text>  favorites filtered by <text>
  /suggest <text>    topics from history containing <text>
  /g <topic>         generate a topic that looks like a command";

/// What the loop should do after a line.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub fn run_session(ctx: &Context) -> anyhow::Result<()> {
    let mut manager = ctx.open_manager()?;
    manager.restore_last_topic();
    let generator = ctx.generator();
    let mut session = Session::new(manager, generator, ctx.default_word_count());

    let stdin = io::stdin();
    let stdout = io::stdout();
    session.run(&mut stdin.lock(), &mut stdout.lock())
}

struct Session<S: KeyValueStore, G: Generator> {
    manager: StateManager<S>,
    generator: G,
    word_count: usize,
    current: Option<Generation>,
}

impl<S: KeyValueStore, G: Generator> Session<S, G> {
    const fn new(manager: StateManager<S>, generator: G, word_count: usize) -> Self {
        Self {
            manager,
            generator,
            word_count,
            current: None,
        }
    }

    fn run(&mut self, input: &mut dyn BufRead, out: &mut dyn Write) -> anyhow::Result<()> {
        writeln!(out, "topicwords session. Type `help` for commands, `quit` to leave.")?;
        loop {
            write!(out, "> ")?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                break;
            };
            if self.step(line.trim(), input, out)? == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    fn step(&mut self, line: &str, input: &mut dyn BufRead, out: &mut dyn Write) -> io::Result<Flow> {
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        let (slashed, body) = line
            .strip_prefix('/')
            .map_or((false, line), |body| (true, body.trim_start()));
        let (command, rest) = body
            .split_once(char::is_whitespace)
            .map_or((body, ""), |(c, r)| (c, r.trim()));

        if !slashed && !rest.is_empty() {
            self.generate(line, false, input, out)?;
            self.print_notices(out)?;
            return Ok(Flow::Continue);
        }
        debug!(command, rest, "session command");

        match command {
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "help" | "?" => writeln!(out, "{HELP}")?,
            "again" => match self.manager.last_topic().map(str::to_string) {
                Some(topic) => self.generate(&topic, true, input, out)?,
                None => writeln!(out, "! nothing generated yet")?,
            },
            "fav" | "f" => self.toggle_current(out)?,
            "undo" | "u" => {
                // Errors surface as notifications.
                let _ = self.manager.undo();
            }
            "history" => self.print_history(rest, out)?,
            "favorites" => self.print_favorites(rest, out)?,
            "random" => writeln!(out, "{}", pick(TopicPool::Random, &mut rand::thread_rng()))?,
            "surprise" => {
                let topic = pick(TopicPool::Surprise, &mut rand::thread_rng());
                writeln!(out, "surprise topic: {topic}")?;
                self.generate(topic, true, input, out)?;
            }
            "clear" => {
                if confirm(input, out, "Clear all history?")? {
                    let _ = self.manager.clear_history();
                }
            }
            "stats" => {
                let s = self.manager.statistics_summary();
                writeln!(
                    out,
                    "generations: {}  favorites: {}  unique topics: {}",
                    s.total_generations, s.favorites_count, s.unique_topics
                )?;
                if let Some(most) = s.most_used {
                    writeln!(out, "most used: {} ({}x)", most.topic, most.count)?;
                }
            }
            "theme" => {
                // A failed save is reported as a notification.
                if let Ok(theme) = self.manager.toggle_theme() {
                    writeln!(out, "theme: {theme}")?;
                }
            }
            "tag" if slashed => self.tag_current(rest, out)?,
            "suggest" if slashed => {
                for topic in self.manager.autocomplete(rest) {
                    writeln!(out, "  {topic}")?;
                }
            }
            "generate" | "g" if slashed => self.generate(rest, false, input, out)?,
            _ if slashed => writeln!(out, "! unknown command /{command}; type `help`")?,
            _ => self.generate(line, false, input, out)?,
        }

        self.print_notices(out)?;
        Ok(Flow::Continue)
    }

    fn generate(
        &mut self,
        topic: &str,
        force: bool,
        input: &mut dyn BufRead,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let topic = match validate_topic(topic) {
            Ok(topic) => topic,
            Err(err) => return writeln!(out, "! {err}"),
        };
        if !force
            && self.manager.should_warn_duplicate(topic)
            && !confirm(input, out, "You already generated this topic. Generate again?")?
        {
            return Ok(());
        }

        match generate_for(&mut self.manager, &self.generator, topic, self.word_count) {
            Ok(generation) => {
                writeln!(out, "#{}", generation.words)?;
                self.current = Some(generation);
            }
            Err(err) => writeln!(out, "✗ {err}")?,
        }
        Ok(())
    }

    fn toggle_current(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let Some(current) = &self.current else {
            return writeln!(out, "! generate something first");
        };
        let item = FavoriteEntry::new(current.topic.clone(), current.words.clone());
        let _ = self.manager.toggle_favorite(item);
        Ok(())
    }

    fn tag_current(&mut self, tag: &str, out: &mut dyn Write) -> io::Result<()> {
        let Some(current) = &self.current else {
            return writeln!(out, "! generate something first");
        };
        if !self.manager.is_favorite(&current.words) {
            return writeln!(out, "! add #{} to favorites first", current.words);
        }
        let words = current.words.clone();
        let _ = self.manager.add_tag(&words, tag);
        Ok(())
    }

    fn print_history(&self, term: &str, out: &mut dyn Write) -> io::Result<()> {
        let view = self.manager.query_history(term, SortOrder::Recent);
        let rows = view.to_vec();
        if rows.is_empty() {
            return writeln!(out, "  (no history)");
        }
        for entry in rows.iter().rev() {
            writeln!(out, "  #{} - {}", entry.words, entry.topic)?;
        }
        Ok(())
    }

    fn print_favorites(&self, term: &str, out: &mut dyn Write) -> io::Result<()> {
        let view = self.manager.query_favorites(term, SortOrder::Recent);
        let rows = view.to_vec();
        if rows.is_empty() {
            return writeln!(out, "  (no favorites)");
        }
        for fav in rows.iter().rev() {
            if fav.tags().is_empty() {
                writeln!(out, "  #{} - {}", fav.words, fav.topic)?;
            } else {
                writeln!(out, "  #{} - {} [{}]", fav.words, fav.topic, fav.tags().join(", "))?;
            }
        }
        Ok(())
    }

    fn print_notices(&mut self, out: &mut dyn Write) -> io::Result<()> {
        for notice in self.manager.drain_notifications() {
            let marker = match notice.level {
                NoticeLevel::Success => "✓",
                NoticeLevel::Warning => "!",
                NoticeLevel::Danger => "✗",
            };
            writeln!(out, "{marker} {}", notice.message)?;
        }
        Ok(())
    }
}

fn read_line(input: &mut dyn BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn confirm(input: &mut dyn BufRead, out: &mut dyn Write, question: &str) -> io::Result<bool> {
    write!(out, "{question} [y/N] ")?;
    out.flush()?;
    let answer = read_line(input)?.unwrap_or_default();
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
