//! Key-value persistence substrate.
//!
//! The state manager never touches the filesystem directly. Everything it
//! persists goes through [`KeyValueStore`], a minimal string-keyed interface
//! with three operations:
//!
//! | Operation | Absent key | Present key |
//! |---|---|---|
//! | `get` | `Ok(None)` | `Ok(Some(value))` |
//! | `set` | insert | overwrite |
//! | `remove` | no-op | delete |
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: a `BTreeMap`, used by tests and as a fake.
//! - [`FileStore`]: one file per key in a data directory, written atomically
//!   and locked against other processes while open.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::ErrorCode;
use crate::lock::LockError;
use std::io;

/// Errors raised by a [`KeyValueStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying I/O failure.
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    /// Lock acquisition failed.
    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    /// A key contains characters the backend cannot address.
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    /// The store was opened for reading only.
    #[error("store is read-only, cannot change {0:?}")]
    ReadOnly(String),

    /// The backend refused the write (used by fakes to inject failures).
    #[error("store rejected write to {0:?}")]
    Rejected(String),
}

impl StoreError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) | Self::ReadOnly(_) | Self::Rejected(_) => ErrorCode::StoreWriteFailed,
            Self::Lock(err) => err.code(),
            Self::InvalidKey(_) => ErrorCode::InternalUnexpected,
        }
    }
}

/// Minimal string-keyed persistence interface.
pub trait KeyValueStore {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read. An absent key is
    /// `Ok(None)`, never an error.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the value could not be durably written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend could not delete the value.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}
