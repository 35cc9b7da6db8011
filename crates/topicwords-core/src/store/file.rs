//! Directory-backed key-value store.
//!
//! # Directory Layout
//!
//! ```text
//! <data_dir>/
//!   .lock            # advisory lock, held from open until the store drops
//!   w3t_favorites    # one file per key, raw value bytes
//!   w3t_history
//!   w3t_settings
//!   w3t_statistics
//!   w3t_theme
//! ```
//!
//! # Invariants
//!
//! - A value file is replaced through a temp file in the same directory
//!   followed by a rename, so readers see the old or the new value, never a
//!   partial one.
//! - Keys are restricted to `[A-Za-z0-9_.-]` and may not start with `.`.
//! - A store opened with [`FileStore::open`] holds the directory lock
//!   exclusively for its whole life, so state loaded through it cannot be
//!   changed by another process before it is saved back.
//! - A store opened with [`FileStore::open_shared`] refuses writes.

use super::{KeyValueStore, StoreError};
use crate::lock::{DataDirLock, LockMode};
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::debug;

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Key-value store keeping one file per key under a data directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    lock: DataDirLock,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root` for reading and
    /// writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or another
    /// process keeps it locked for longer than five seconds.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with(root, LockMode::Exclusive, DEFAULT_LOCK_TIMEOUT)
    }

    /// Open a store for reading only. Other readers may hold it at the same
    /// time.
    ///
    /// # Errors
    ///
    /// Same as [`FileStore::open`].
    pub fn open_shared(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with(root, LockMode::Shared, DEFAULT_LOCK_TIMEOUT)
    }

    /// Open with an explicit lock mode and wait limit.
    ///
    /// # Errors
    ///
    /// Same as [`FileStore::open`].
    pub fn open_with(
        root: impl Into<PathBuf>,
        mode: LockMode,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let lock = DataDirLock::acquire(&root, mode, timeout)?;
        debug!(root = %root.display(), ?mode, "opened file store");
        Ok(Self { root, lock })
    }

    /// Directory holding the value files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn mode(&self) -> LockMode {
        self.lock.mode()
    }

    fn writable_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let path = self.value_path(key)?;
        if self.lock.mode() == LockMode::Shared {
            return Err(StoreError::ReadOnly(key.to_string()));
        }
        Ok(path)
    }

    fn value_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => {
                debug!(key, bytes = value.len(), "store get");
                Ok(Some(value))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.writable_path(key)?;

        let mut temp = NamedTempFile::new_in(&self.root)?;
        temp.write_all(value.as_bytes())?;
        temp.flush()?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|err| err.error)?;

        debug!(key, bytes = value.len(), "store set");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.writable_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "store remove");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut store = FileStore::open(dir.path()).expect("open");
            store.set("w3t_theme", "dark").expect("set");
        }
        let store = FileStore::open(dir.path()).expect("reopen");
        assert_eq!(store.get("w3t_theme").expect("get").as_deref(), Some("dark"));
    }

    #[test]
    fn missing_key_is_none_and_remove_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::open(dir.path()).expect("open");
        assert_eq!(store.get("w3t_history").expect("get"), None);
        store.remove("w3t_history").expect("remove absent");

        store.set("w3t_history", "[]").expect("set");
        store.remove("w3t_history").expect("remove");
        assert!(!dir.path().join("w3t_history").exists());
    }

    #[test]
    fn overwrite_replaces_whole_value() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::open(dir.path()).expect("open");
        store.set("k", "a much longer first value").expect("set");
        store.set("k", "short").expect("overwrite");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("short"));
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = FileStore::open(dir.path()).expect("open");
        for key in ["", ".lock", "../escape", "a/b"] {
            assert!(
                matches!(store.set(key, "x"), Err(StoreError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn open_creates_nested_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a/b/c");
        let store = FileStore::open(&nested).expect("open");
        assert_eq!(store.root(), nested.as_path());
        assert!(nested.is_dir());
    }

    #[test]
    fn open_store_keeps_other_writers_out_until_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let short = Duration::from_millis(50);
        let mut first = FileStore::open(dir.path()).expect("open");
        first.set("w3t_theme", "dark").expect("set");

        let err = FileStore::open_with(dir.path(), LockMode::Exclusive, short)
            .expect_err("second writer must wait");
        assert_eq!(err.code(), crate::error::ErrorCode::LockContention);
        assert!(FileStore::open_with(dir.path(), LockMode::Shared, short).is_err());

        drop(first);
        let second = FileStore::open_with(dir.path(), LockMode::Exclusive, short).expect("reopen");
        assert_eq!(second.get("w3t_theme").expect("get").as_deref(), Some("dark"));
    }

    #[test]
    fn shared_stores_read_together_and_refuse_writes() {
        let dir = tempfile::tempdir().expect("tempdir");
        FileStore::open(dir.path())
            .expect("open")
            .set("w3t_theme", "dark")
            .expect("seed");

        let mut a = FileStore::open_shared(dir.path()).expect("reader a");
        let b = FileStore::open_shared(dir.path()).expect("reader b");
        assert_eq!(a.mode(), LockMode::Shared);
        assert_eq!(b.get("w3t_theme").expect("get").as_deref(), Some("dark"));

        assert!(matches!(a.set("w3t_theme", "light"), Err(StoreError::ReadOnly(_))));
        assert!(matches!(a.remove("w3t_theme"), Err(StoreError::ReadOnly(_))));
        assert_eq!(a.get("w3t_theme").expect("get").as_deref(), Some("dark"));
    }
}
