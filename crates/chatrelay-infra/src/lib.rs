//! Infrastructure layer for chatrelay.
//!
//! Contains implementations of the ports defined in `chatrelay-core`: the
//! OpenAI-compatible inference backend, the SQLite audit log, the local media
//! store, and the LINE Messaging API adapter, plus configuration loading.

pub mod config;
pub mod filesystem;
pub mod line;
pub mod llm;
pub mod sqlite;
