//! Repository trait definitions (ports).
//!
//! Implementations live in `chatrelay-infra`.

pub mod audit;
