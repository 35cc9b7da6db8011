//! topicwords-core library.
//!
//! Local state for the topic-to-words tool: favorites, history, statistics,
//! settings and theme, persisted through a [`store::KeyValueStore`] and owned
//! by a single [`manager::StateManager`].
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per module, each mapping to an
//!   [`error::ErrorCode`]; `anyhow::Result` only for config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Persistence**: write first, commit to memory after the write succeeds.

pub mod config;
pub mod error;
pub mod generate;
pub mod lock;
pub mod manager;
pub mod model;
pub mod query;
pub mod store;
pub mod topics;
pub mod transfer;
pub mod undo;

pub use manager::{StateError, StateManager};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
