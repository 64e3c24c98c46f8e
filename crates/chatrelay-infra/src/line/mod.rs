//! LINE Messaging API adapter.
//!
//! - `signature`: `X-Line-Signature` verification (HMAC-SHA256, base64)
//! - `webhook`: webhook payload parsing into [`InboundEvent`](chatrelay_types::event::InboundEvent)s
//! - `client`: reply delivery and message content download

pub mod client;
pub mod signature;
pub mod webhook;

pub use client::LineClient;
