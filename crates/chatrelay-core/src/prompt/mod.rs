//! Prompt catalog: the startup-loaded, read-only prompt fragments.

pub mod catalog;
