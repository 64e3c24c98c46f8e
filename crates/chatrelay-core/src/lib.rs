//! Business logic and port trait definitions for chatrelay.
//!
//! This crate defines the "ports" (inference backend, audit sink, media
//! source and store) that the infrastructure layer implements. It depends
//! only on `chatrelay-types` -- never on `chatrelay-infra` or any
//! network/database crate.

pub mod chat;
pub mod llm;
pub mod prompt;
pub mod repository;
pub mod storage;

#[cfg(test)]
mod test_support;
