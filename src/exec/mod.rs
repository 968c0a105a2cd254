//! External process execution

pub mod subprocess;

pub use subprocess::{ProcessExecutor, ProcessOutcome, SystemExecutor};
