//! SQLite storage layer.
//!
//! The chat audit log backed by SQLite with WAL mode and split read/write
//! connection pools.

pub mod audit;
pub mod pool;
