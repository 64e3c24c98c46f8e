//! HTTP layer for chatrelay.
//!
//! Axum server exposing the LINE webhook at `/callback` and a `/health`
//! probe.

pub mod error;
pub mod handlers;
pub mod router;
