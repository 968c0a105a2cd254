//! Shared utilities

pub mod terminal;
