//! CLI argument parsing using clap derive macros

use anyhow::Result;
use clap::Parser;

use crate::commands::run::RunCommand;
use crate::utils::terminal::disable_colors;

/// buildmatrix - configure and build a CMake project across toolchain profiles
///
/// With no arguments every profile of the matrix is configured and built in
/// order. Failing profiles are reported and do not stop the run.
#[derive(Parser, Debug)]
#[command(name = "buildmatrix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    #[command(flatten)]
    pub run: RunCommand,
}

impl Cli {
    /// Execute the CLI, returning the process exit status
    pub fn execute(self) -> Result<u8> {
        if self.no_color {
            disable_colors();
        }

        self.run.execute(self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_runs_full_matrix() {
        let cli = Cli::try_parse_from(["buildmatrix"]).unwrap();
        assert!(cli.run.profiles.is_empty());
        assert!(!cli.run.strict);
        assert!(!cli.run.dry_run);
        assert_eq!(cli.run.source_dir, std::path::PathBuf::from("."));
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "buildmatrix",
            "-p",
            "Debug-MinGW",
            "--profile",
            "Debug-Visual Studio",
            "-j",
            "4",
            "--strict",
            "--dry-run",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.run.profiles, vec!["Debug-MinGW", "Debug-Visual Studio"]);
        assert_eq!(cli.run.jobs, Some(4));
        assert!(cli.run.strict);
        assert!(cli.run.dry_run);
        assert!(cli.verbose);
    }
}
