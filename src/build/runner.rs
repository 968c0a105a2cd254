//! Sequential execution of the build matrix
//!
//! Every profile runs in set order: output directory, configure, build.
//! A failing profile is logged and recorded, and the run carries on with the
//! next one. Only errors in the matrix itself (an unsupported generator) stop
//! the run, and those are caught before anything executes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use console::style;

use super::cmake::{
    CommandBuilder, CommandLine, Phase, CMAKE_CACHE_FILE, CMAKE_CHECK_CACHE_FILE,
};
use crate::config::BuildConfiguration;
use crate::error::MatrixError;
use crate::exec::ProcessExecutor;
use crate::utils::terminal::{
    print_command, print_error, print_info, print_step, print_warning,
};

/// Runner behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Run configure even when the build directory already has a CMake cache
    pub reconfigure: bool,
    /// Do not attempt the build step after a failed configure
    pub skip_build_on_configure_failure: bool,
    /// Print commands without creating directories or running anything
    pub dry_run: bool,
    /// Extra progress output
    pub verbose: bool,
}

/// Result of one phase of one profile
#[derive(Debug)]
pub struct StepResult {
    pub phase: Phase,
    pub command: CommandLine,
    /// `None` when the process could not be started or was killed by a signal
    pub exit_code: Option<i32>,
    pub succeeded: bool,
    pub error: Option<MatrixError>,
}

/// Result of one profile
#[derive(Debug)]
pub struct CommandResult<'a> {
    pub configuration: &'a BuildConfiguration,
    pub output_dir: PathBuf,
    pub steps: Vec<StepResult>,
    /// Output directory could not be created
    pub setup_error: Option<String>,
    /// First failing exit code, `-1` when there was none to report, `0` on success
    pub exit_code: i32,
    pub succeeded: bool,
}

impl<'a> CommandResult<'a> {
    fn new(
        configuration: &'a BuildConfiguration,
        output_dir: PathBuf,
        steps: Vec<StepResult>,
        setup_error: Option<String>,
    ) -> Self {
        let exit_code = if setup_error.is_some() {
            -1
        } else {
            steps
                .iter()
                .find(|s| !s.succeeded)
                .map_or(0, |s| s.exit_code.unwrap_or(-1))
        };
        let succeeded = setup_error.is_none() && steps.iter().all(|s| s.succeeded);

        Self {
            configuration,
            output_dir,
            steps,
            setup_error,
            exit_code,
            succeeded,
        }
    }

    /// Step result for a phase, if that phase ran
    pub fn step(&self, phase: Phase) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.phase == phase)
    }

    /// One-line description of why the profile failed
    fn failure_summary(&self) -> String {
        if let Some(err) = &self.setup_error {
            return err.clone();
        }
        self.steps
            .iter()
            .filter(|s| !s.succeeded)
            .map(|s| match s.exit_code {
                Some(code) => format!("{} failed (exit code {})", s.phase, code),
                None => format!("{} failed", s.phase),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Aggregate outcome of a run
#[derive(Debug)]
pub struct RunReport<'a> {
    pub results: Vec<CommandResult<'a>>,
    pub dry_run: bool,
}

impl RunReport<'_> {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Process exit status: failures only count under `strict`
    pub fn exit_status(&self, strict: bool) -> u8 {
        if strict && !self.all_passed() {
            1
        } else {
            0
        }
    }

    /// Print a per-profile summary table
    pub fn print_summary(&self) {
        println!("\n{}", style("Summary").bold().underlined());

        let width = self
            .results
            .iter()
            .map(|r| r.configuration.profile_name.len())
            .max()
            .unwrap_or(0);

        for result in &self.results {
            let name = &result.configuration.profile_name;
            if self.dry_run {
                println!("  📋 {:<width$}  {}", name, result.output_dir.display());
            } else if result.succeeded {
                println!("  ✅ {:<width$}  {}", name, result.output_dir.display());
            } else {
                println!(
                    "  ❌ {:<width$}  {}",
                    name,
                    style(result.failure_summary()).red()
                );
            }
        }

        if self.dry_run {
            println!("\n{} profile(s) planned, nothing executed", self.results.len());
        } else {
            println!(
                "\n{} profile(s): {} passed, {} failed",
                self.results.len(),
                style(self.passed()).green(),
                style(self.failed()).red()
            );
        }
    }
}

/// Commands of one profile, built before anything runs
struct PlannedProfile<'a> {
    config: &'a BuildConfiguration,
    output_dir: PathBuf,
    configure: CommandLine,
    build: CommandLine,
}

/// Drives the configure and build steps of every profile
pub struct Runner<E: ProcessExecutor> {
    builder: CommandBuilder,
    executor: E,
    options: RunOptions,
}

impl<E: ProcessExecutor> Runner<E> {
    pub fn new(builder: CommandBuilder, executor: E, options: RunOptions) -> Self {
        Self {
            builder,
            executor,
            options,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Run every profile in order
    ///
    /// Returns `Err` only for an unsupported generator, detected before any
    /// directory is created or process started.
    pub fn run<'a>(
        &self,
        configs: &'a [BuildConfiguration],
    ) -> Result<RunReport<'a>, MatrixError> {
        let plan = configs
            .iter()
            .map(|config| self.plan(config))
            .collect::<Result<Vec<_>, _>>()?;

        let total = plan.len();
        let results = plan
            .into_iter()
            .enumerate()
            .map(|(index, planned)| {
                print_step(index + 1, total, &planned.config.profile_name);
                self.run_profile(planned)
            })
            .collect();

        Ok(RunReport {
            results,
            dry_run: self.options.dry_run,
        })
    }

    fn plan<'a>(&self, config: &'a BuildConfiguration) -> Result<PlannedProfile<'a>, MatrixError> {
        Ok(PlannedProfile {
            config,
            output_dir: self.builder.output_dir(config),
            configure: self.builder.build_command(config, Phase::Configure)?,
            build: self.builder.build_command(config, Phase::Build)?,
        })
    }

    fn run_profile<'a>(&self, planned: PlannedProfile<'a>) -> CommandResult<'a> {
        let PlannedProfile {
            config,
            output_dir,
            configure,
            build,
        } = planned;

        if self.options.dry_run {
            if self.needs_configure(&output_dir) {
                print_command("configure", &configure.to_string());
            }
            print_command("compile", &build.to_string());
            return CommandResult::new(config, output_dir, Vec::new(), None);
        }

        if let Err(e) = ensure_output_dir(&output_dir) {
            let message = format!("{:#}", e);
            print_error(&message);
            return CommandResult::new(config, output_dir, Vec::new(), Some(message));
        }

        let mut steps = Vec::with_capacity(2);

        if self.needs_configure(&output_dir) {
            let step = self.execute_step(config, Phase::Configure, configure);
            let configure_failed = !step.succeeded;
            steps.push(step);

            if configure_failed {
                forget_configure(&output_dir);
            }

            if configure_failed && self.options.skip_build_on_configure_failure {
                print_warning(&format!(
                    "Skipping build for {} after failed configure",
                    config.profile_name
                ));
                return CommandResult::new(config, output_dir, steps, None);
            }
        } else if self.options.verbose {
            print_info(&format!(
                "{} already configured, skipping configure",
                output_dir.display()
            ));
        }

        steps.push(self.execute_step(config, Phase::Build, build));
        CommandResult::new(config, output_dir, steps, None)
    }

    /// A cache alone is not enough: CMake writes it before a configure fails
    fn needs_configure(&self, output_dir: &Path) -> bool {
        self.options.reconfigure
            || !output_dir.join(CMAKE_CACHE_FILE).is_file()
            || !output_dir.join(CMAKE_CHECK_CACHE_FILE).is_file()
    }

    fn execute_step(
        &self,
        config: &BuildConfiguration,
        phase: Phase,
        command: CommandLine,
    ) -> StepResult {
        let rendered = command.to_string();
        let label = match phase {
            Phase::Configure => "configure",
            Phase::Build => "compile",
        };
        print_command(label, &rendered);

        let (exit_code, error) = match self.executor.execute(&command) {
            Ok(outcome) if outcome.success => {
                if self.options.verbose {
                    print_info(&format!("{} finished in {:.1?}", phase, outcome.duration));
                }
                (outcome.exit_code, None)
            }
            Ok(outcome) => (
                outcome.exit_code,
                Some(MatrixError::exit_failure(
                    &config.profile_name,
                    phase,
                    &rendered,
                    outcome.exit_code,
                )),
            ),
            Err(e) => (
                None,
                Some(MatrixError::spawn_failure(
                    &config.profile_name,
                    phase,
                    &rendered,
                    e,
                )),
            ),
        };

        if let Some(err) = &error {
            err.display_with_hints();
        }

        StepResult {
            phase,
            command,
            exit_code,
            succeeded: error.is_none(),
            error,
        }
    }
}

/// Drop the configure stamp so the next run configures again
fn forget_configure(output_dir: &Path) {
    let stamp = output_dir.join(CMAKE_CHECK_CACHE_FILE);
    match std::fs::remove_file(&stamp) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => print_warning(&format!(
            "Failed to remove {}: {}; pass --reconfigure on the next run",
            stamp.display(),
            e
        )),
    }
}

/// Create the output directory and its parents; fine if it already exists
fn ensure_output_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create output directory {}", path.display()))
}
