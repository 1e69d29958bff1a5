//! Shared constants for bizlens.

pub mod app;
pub mod prompt;
