//! Media storage abstractions.

pub mod media;
