//! Advisory lock over a whole data directory.
//!
//! A [`DataDirLock`] is taken when a store is opened and released when it is
//! dropped, so the span from loading state to saving it belongs to one
//! process. Readers share the lock; a writer holds it alone.
//!
//! The lock is an `fs2` file lock on `<data_dir>/.lock`. It is advisory: only
//! processes that go through [`DataDirLock::acquire`] are excluded.

use crate::error::ErrorCode;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Name of the lock file inside a data directory.
pub const LOCK_FILE: &str = ".lock";

const FIRST_BACKOFF: Duration = Duration::from_millis(5);
const MAX_BACKOFF: Duration = Duration::from_millis(100);

/// How a data directory is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Many readers at once; no writer.
    Shared,
    /// One writer, no readers.
    Exclusive,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Another process kept the directory for longer than we were willing
    /// to wait.
    #[error("data directory {} is in use by another process (gave up after {waited:?})", .path.display())]
    Busy { path: PathBuf, waited: Duration },

    #[error("cannot open lock file: {0}")]
    Io(#[from] io::Error),
}

impl LockError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Busy { .. } => ErrorCode::LockContention,
            Self::Io(_) => ErrorCode::StoreReadFailed,
        }
    }
}

/// Held lock on a data directory. Released on drop.
#[derive(Debug)]
pub struct DataDirLock {
    file: File,
    path: PathBuf,
    mode: LockMode,
}

impl DataDirLock {
    /// Lock `dir`, polling with backoff until `timeout` has passed.
    ///
    /// # Errors
    ///
    /// [`LockError::Busy`] when the lock is still held elsewhere at the
    /// deadline, [`LockError::Io`] when the lock file cannot be opened.
    pub fn acquire(dir: &Path, mode: LockMode, timeout: Duration) -> Result<Self, LockError> {
        let path = dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        let started = Instant::now();
        let mut backoff = FIRST_BACKOFF;
        loop {
            let attempt = match mode {
                LockMode::Shared => FileExt::try_lock_shared(&file),
                LockMode::Exclusive => FileExt::try_lock_exclusive(&file),
            };
            match attempt {
                Ok(()) => {
                    debug!(path = %path.display(), ?mode, "data directory locked");
                    return Ok(Self { file, path, mode });
                }
                Err(err) if err.kind() != fs2::lock_contended_error().kind() => {
                    return Err(err.into());
                }
                Err(_) => {}
            }

            let waited = started.elapsed();
            if waited >= timeout {
                return Err(LockError::Busy { path, waited });
            }
            thread::sleep(backoff.min(timeout - waited));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    #[must_use]
    pub const fn mode(&self) -> LockMode {
        self.mode
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!(path = %self.path.display(), "data directory unlocked");
    }
}
