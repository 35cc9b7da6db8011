//! Subcommand handlers.
//!
//! Every handler receives a [`Context`] carrying the resolved output mode and
//! configuration. Handlers render their own errors through
//! [`crate::output::render_error`] and return [`Reported`] so `main` does not
//! print them a second time.

pub mod batch;
pub mod clear_history;
pub mod completions;
pub mod export;
pub mod favorite;
pub mod generate;
pub mod import;
pub mod list;
pub mod random;
pub mod session;
pub mod settings;
pub mod stats;
pub mod suggest;
pub mod tag;
pub mod theme;

use crate::generator::HttpGenerator;
use crate::output::{CliError, OutputMode, render_error, render_notices};
use std::fmt;
use topicwords_core::config::EffectiveConfig;
use topicwords_core::error::ErrorCode;
use topicwords_core::{FileStore, KeyValueStore, StateManager, StoreError};

/// Shared state handed to every subcommand.
#[derive(Debug)]
pub struct Context {
    pub output: OutputMode,
    pub quiet: bool,
    pub config: EffectiveConfig,
}

impl Context {
    /// Open the data directory for writing and load persisted state.
    ///
    /// The directory stays locked until the returned manager is dropped, so
    /// a command's load and its saves cannot interleave with another `tw`.
    pub fn open_manager(&self) -> anyhow::Result<StateManager<FileStore>> {
        self.load_manager(FileStore::open(&self.config.data_dir))
    }

    /// Open the data directory for reading only. Readers do not block each
    /// other.
    pub fn read_manager(&self) -> anyhow::Result<StateManager<FileStore>> {
        self.load_manager(FileStore::open_shared(&self.config.data_dir))
    }

    fn load_manager(
        &self,
        opened: Result<FileStore, StoreError>,
    ) -> anyhow::Result<StateManager<FileStore>> {
        match opened {
            Ok(store) => Ok(StateManager::load(store)),
            Err(err) => {
                let code = match &err {
                    StoreError::Lock(lock) => lock.code(),
                    _ => ErrorCode::StoreReadFailed,
                };
                Err(self.fail(
                    code,
                    format!(
                        "cannot open data directory {}: {err}",
                        self.config.data_dir.display()
                    ),
                ))
            }
        }
    }

    pub fn generator(&self) -> HttpGenerator {
        HttpGenerator::new(&self.config.user.generator)
    }

    /// Word count from config, used when a command gets no `--words`.
    pub const fn default_word_count(&self) -> usize {
        self.config.user.generator.word_count
    }

    /// Render `message` as a coded error and return a [`Reported`] marker.
    pub fn fail(&self, code: ErrorCode, message: impl Into<String>) -> anyhow::Error {
        let error = CliError::from_code(code, message);
        if let Err(render_err) = render_error(self.output, &error) {
            return render_err;
        }
        Reported(error.message).into()
    }

    /// Print and clear the manager's queued notifications.
    pub fn flush_notices<S: KeyValueStore>(
        &self,
        manager: &mut StateManager<S>,
    ) -> anyhow::Result<()> {
        let notices = manager.drain_notifications();
        if !self.quiet {
            render_notices(self.output, &notices)?;
        }
        Ok(())
    }
}

/// An error that has already been shown to the user.
#[derive(Debug)]
pub struct Reported(pub String);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Reported {}
