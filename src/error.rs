//! Error types and helpers for user-friendly error messages
//!
//! Configuration and generator errors are fatal and abort the run before any
//! build starts. External process errors are recorded per profile and the run
//! moves on to the next one.

use thiserror::Error;

use crate::build::cmake::Phase;

/// Errors raised while preparing or running the build matrix
#[derive(Error, Debug)]
pub enum MatrixError {
    /// Invalid matrix definition (bad file, empty names, duplicates)
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// Generator name matches neither the single-config nor the multi-config family
    #[error("Unsupported generator '{generator}' for profile '{profile}'")]
    UnsupportedGenerator { profile: String, generator: String },

    /// Non-zero exit or spawn failure of cmake
    #[error("{phase} step failed for {profile}: {detail}")]
    ExternalProcess {
        profile: String,
        phase: Phase,
        command: String,
        exit_code: Option<i32>,
        detail: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl MatrixError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
            hint: None,
        }
    }

    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Create an unsupported generator error
    pub fn unsupported_generator(profile: impl Into<String>, generator: impl Into<String>) -> Self {
        Self::UnsupportedGenerator {
            profile: profile.into(),
            generator: generator.into(),
        }
    }

    /// Create an error for a step whose process exited unsuccessfully
    pub fn exit_failure(
        profile: impl Into<String>,
        phase: Phase,
        command: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        let detail = match exit_code {
            Some(code) => format!("process exited with code {}", code),
            None => "process terminated by signal".to_string(),
        };
        Self::ExternalProcess {
            profile: profile.into(),
            phase,
            command: command.into(),
            exit_code,
            detail,
            source: None,
        }
    }

    /// Create an error for a step whose process could not be started
    pub fn spawn_failure(
        profile: impl Into<String>,
        phase: Phase,
        command: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        Self::ExternalProcess {
            profile: profile.into(),
            phase,
            command: command.into(),
            exit_code: None,
            detail: format!("{:#}", source),
            source: Some(source),
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        match self {
            MatrixError::Configuration { hint, .. } => {
                if let Some(h) = hint {
                    eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
                }
            }
            MatrixError::UnsupportedGenerator { .. } => {
                eprintln!(
                    "\n{} {}",
                    style("HINT:").yellow().bold(),
                    hints::unsupported_generator()
                );
            }
            MatrixError::ExternalProcess {
                command, source, ..
            } => {
                eprintln!("{} {}", style("COMMAND:").cyan().bold(), command);
                // only a process that never started points at the cmake path
                if source.is_some() {
                    eprintln!("\n{} {}", style("HINT:").yellow().bold(), hints::cmake());
                }
            }
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for missing CMake
    pub fn cmake() -> &'static str {
        "Install CMake from https://cmake.org/ or point buildmatrix at it:\n\
         • --cmake <PATH> or BUILDMATRIX_CMAKE=<PATH>\n\
         • or `cmake = \"...\"` under [toolchain] in BuildMatrix.toml"
    }

    /// Get hint for an unreadable or invalid BuildMatrix.toml
    pub fn matrix_file() -> &'static str {
        "BuildMatrix.toml is invalid. Common issues:\n\
         • Each [[profile]] needs name, output_dir and generator\n\
         • options must be an array of strings\n\
         • Invalid TOML syntax (check quotes, brackets, commas)"
    }

    /// Get hint for duplicate profile names or output directories
    pub fn duplicate_profile() -> &'static str {
        "Every profile needs its own name and its own output_dir.\n\
         Rename the profile or point it at a different build directory."
    }

    /// Get hint for an unknown generator
    pub fn unsupported_generator() -> &'static str {
        "Supported generators:\n\
         • Single-config: Ninja, Unix Makefiles, MinGW Makefiles, MSYS Makefiles,\n\
         \x20 NMake Makefiles, NMake Makefiles JOM, Watcom WMake, Borland Makefiles\n\
         • Multi-config: Ninja Multi-Config, Xcode, Green Hills MULTI,\n\
         \x20 Visual Studio <version> <year> (e.g. \"Visual Studio 17 2022\")"
    }
}
