//! Conversation state and per-event orchestration.
//!
//! `SessionStore` holds the bounded per-user history; `DispatchEngine`
//! turns one inbound event into one reply, updating history and the audit
//! log along the way.

pub mod dispatch;
pub mod session;
