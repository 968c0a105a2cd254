//! buildmatrix - run CMake configure and build across a matrix of toolchain profiles
//!
//! ## Architecture
//!
//! ```text
//! CLI → config (profiles, toolchain paths) → build::runner → cmake
//! ```
//!
//! Profiles run one after another. A failing profile is logged and recorded
//! in the [`build::RunReport`]; the run always carries on to the next one.

pub mod build;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod utils;
