//! Run command implementation
//!
//! Resolves toolchain paths and profiles, then drives the runner over the
//! selected profiles.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;

use crate::build::cmake::{GeneratorFamily, DEFAULT_JOBS};
use crate::build::runner::{RunOptions, Runner};
use crate::build::toolchains::{ToolchainPaths, ToolchainSettings};
use crate::build::CommandBuilder;
use crate::config::{ConfigurationSet, MatrixFile};
use crate::error::MatrixError;
use crate::exec::subprocess::command_exists;
use crate::exec::SystemExecutor;
use crate::utils::terminal::{print_info, print_success, print_warning};

/// Configure and build every profile of the matrix
#[derive(Args, Debug, Default)]
pub struct RunCommand {
    /// Matrix file (defaults to BuildMatrix.toml in the source directory, if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Source directory containing CMakeLists.txt
    #[arg(short = 'S', long, value_name = "DIR", default_value = ".")]
    pub source_dir: PathBuf,

    /// Root for relative output directories (defaults to the source directory)
    #[arg(long, value_name = "DIR")]
    pub build_root: Option<PathBuf>,

    /// Only run the named profile (repeatable)
    #[arg(short, long = "profile", value_name = "NAME")]
    pub profiles: Vec<String>,

    /// Worker count for single-config generators [default: 10]
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Run configure even if the build directory is already configured
    #[arg(long)]
    pub reconfigure: bool,

    /// Do not build a profile whose configure step failed
    #[arg(long)]
    pub skip_build_on_configure_failure: bool,

    /// Print the commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// List the profiles and exit
    #[arg(long)]
    pub list: bool,

    /// Exit with status 1 if any profile failed
    #[arg(long)]
    pub strict: bool,

    /// cmake executable
    #[arg(long, env = "BUILDMATRIX_CMAKE", value_name = "PATH")]
    pub cmake: Option<PathBuf>,

    /// vcpkg CMake toolchain file
    #[arg(long, env = "BUILDMATRIX_VCPKG_TOOLCHAIN", value_name = "PATH")]
    pub vcpkg_toolchain: Option<PathBuf>,

    /// MinGW C compiler
    #[arg(long, env = "BUILDMATRIX_MINGW_GCC", value_name = "PATH")]
    pub mingw_gcc: Option<PathBuf>,

    /// MinGW C++ compiler
    #[arg(long, env = "BUILDMATRIX_MINGW_GXX", value_name = "PATH")]
    pub mingw_gxx: Option<PathBuf>,
}

impl RunCommand {
    /// Execute the run, returning the process exit status
    pub fn execute(self, verbose: bool) -> Result<u8> {
        let matrix_file =
            MatrixFile::discover(self.config.as_deref(), &self.source_dir)?.unwrap_or_default();

        let paths = ToolchainPaths::resolve(&self.toolchain_overrides(), &matrix_file.toolchain)?;

        let jobs = self
            .jobs
            .or(matrix_file.build.jobs)
            .unwrap_or(DEFAULT_JOBS);
        if jobs == 0 {
            return Err(MatrixError::config_error("Worker count must be at least 1").into());
        }

        let matrix = if matrix_file.profiles.is_empty() {
            ConfigurationSet::default_matrix(&paths)?
        } else {
            ConfigurationSet::from_entries(matrix_file.profiles, &paths)?
        };
        let selected = matrix.select(&self.profiles)?;

        if self.list {
            print_profiles(&selected);
            return Ok(0);
        }

        if verbose {
            print_info("Toolchain paths:");
            paths.print_summary();
        }

        if !self.dry_run && !command_exists(&paths.cmake) {
            print_warning(&format!(
                "cmake not found at '{}'; every step will fail to start",
                paths.cmake.display()
            ));
        }

        let build_root = self
            .build_root
            .clone()
            .unwrap_or_else(|| self.source_dir.clone());
        let builder = CommandBuilder::new(&paths.cmake, &self.source_dir)
            .build_root(build_root)
            .jobs(jobs);
        let options = RunOptions {
            reconfigure: self.reconfigure,
            skip_build_on_configure_failure: self.skip_build_on_configure_failure,
            dry_run: self.dry_run,
            verbose,
        };

        let runner = Runner::new(builder, SystemExecutor, options);
        let report = runner.run(selected.as_slice())?;
        report.print_summary();

        if !report.dry_run {
            if report.all_passed() {
                print_success(&format!("{} profile(s) built", report.results.len()));
            } else if !self.strict {
                print_warning("some profiles failed; pass --strict to exit with a non-zero status");
            }
        }

        Ok(report.exit_status(self.strict))
    }

    fn toolchain_overrides(&self) -> ToolchainSettings {
        ToolchainSettings {
            cmake: self.cmake.clone(),
            vcpkg_toolchain: self.vcpkg_toolchain.clone(),
            mingw_gcc: self.mingw_gcc.clone(),
            mingw_gxx: self.mingw_gxx.clone(),
        }
    }
}

/// Print the profile table for --list
fn print_profiles(set: &ConfigurationSet) {
    let width = set
        .iter()
        .map(|c| c.profile_name.len())
        .max()
        .unwrap_or(0);

    for config in set {
        let family = GeneratorFamily::classify(&config.generator)
            .map_or_else(|| "unsupported".to_string(), |f| f.to_string());
        println!(
            "{:<width$}  {}  {} ({}, {})",
            style(&config.profile_name).bold(),
            config.output_dir.display(),
            config.generator,
            family,
            config.build_mode,
        );
    }
}
