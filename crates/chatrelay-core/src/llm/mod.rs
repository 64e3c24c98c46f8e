//! Inference client for chatrelay.
//!
//! - `InferenceBackend`: RPITIT trait for a concrete chat-completion endpoint
//! - `request`: message-list assembly for text and image requests
//! - `InferenceClient`: timeout-bounded calls returning typed results

pub mod client;
pub mod provider;
pub mod request;
