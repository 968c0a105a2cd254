//! Build orchestration
//!
//! ## Architecture
//!
//! ```text
//! ConfigurationSet → runner.rs → cmake.rs (CommandBuilder) → exec (cmake process)
//! ```
//!
//! ## Modules
//!
//! - `cmake` - Generator families and cmake command lines
//! - `runner` - Sequential configure/build over every profile
//! - `toolchains` - Toolchain path resolution and placeholder expansion

pub mod cmake;
pub mod runner;
pub mod toolchains;

pub use cmake::{CommandBuilder, CommandLine, GeneratorFamily, Phase};
pub use runner::{CommandResult, RunOptions, RunReport, Runner, StepResult};
