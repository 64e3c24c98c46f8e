//! Shared domain types for chatrelay.
//!
//! Turns and message content, the prompt catalog record, audit records,
//! inbound events, the chat-completion wire contract, configuration, and
//! the error enums shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod audit;
pub mod config;
pub mod error;
pub mod event;
pub mod llm;
pub mod prompt;
pub mod turn;
