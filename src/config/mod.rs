//! Build matrix configuration
//!
//! A [`ConfigurationSet`] is the ordered, validated list of profiles a run
//! works through. It comes either from the built-in default matrix or from
//! the `[[profile]]` tables of a `BuildMatrix.toml`.

pub mod matrix_toml;
pub mod validation;

use std::path::PathBuf;

use crate::build::toolchains::ToolchainPaths;
use crate::error::MatrixError;

pub use matrix_toml::{MatrixFile, ProfileEntry, DEFAULT_MATRIX_FILE};

/// One named build profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfiguration {
    /// Human-readable profile name, e.g. "Debug-MinGW"
    pub profile_name: String,
    /// Build directory, relative paths resolve against the build root
    pub output_dir: PathBuf,
    /// CMake generator name, e.g. "Ninja"
    pub generator: String,
    /// CMake configuration name (Debug, Release, RelWithDebInfo, ...)
    pub build_mode: String,
    /// Explicit build target, generator default when `None`
    pub target: Option<String>,
    /// Configure options, passed to cmake verbatim
    pub options: Vec<String>,
}

impl BuildConfiguration {
    /// Create a profile; the build mode is derived from the profile name
    pub fn new(
        profile_name: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        generator: impl Into<String>,
    ) -> Self {
        let profile_name = profile_name.into();
        let build_mode = derive_build_mode(&profile_name).to_string();
        Self {
            profile_name,
            output_dir: output_dir.into(),
            generator: generator.into(),
            build_mode,
            target: None,
            options: Vec::new(),
        }
    }

    /// Set the build mode explicitly
    pub fn with_build_mode(mut self, build_mode: impl Into<String>) -> Self {
        self.build_mode = build_mode.into();
        self
    }

    /// Set the build target
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Append one configure option
    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }
}

/// Build mode implied by a profile name: everything before the first `-`
pub fn derive_build_mode(profile_name: &str) -> &str {
    profile_name
        .split_once('-')
        .map_or(profile_name, |(mode, _)| mode)
}

/// Ordered, immutable, validated set of profiles
#[derive(Debug, Clone)]
pub struct ConfigurationSet {
    configurations: Vec<BuildConfiguration>,
}

impl ConfigurationSet {
    /// Validate and wrap a list of profiles
    pub fn new(configurations: Vec<BuildConfiguration>) -> Result<Self, MatrixError> {
        validation::validate_configurations(&configurations)?;
        Ok(Self { configurations })
    }

    /// The built-in matrix: MinGW and MSVC, each Debug and RelWithDebInfo
    pub fn default_matrix(paths: &ToolchainPaths) -> Result<Self, MatrixError> {
        Self::from_entries(default_profiles(), paths)
    }

    /// Build a set from profile entries, expanding toolchain placeholders
    pub fn from_entries(
        entries: Vec<ProfileEntry>,
        paths: &ToolchainPaths,
    ) -> Result<Self, MatrixError> {
        let configurations = entries
            .into_iter()
            .map(|entry| entry.into_configuration(paths))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(configurations)
    }

    /// Keep only the named profiles, in set order
    pub fn select(&self, names: &[String]) -> Result<Self, MatrixError> {
        if names.is_empty() {
            return Ok(self.clone());
        }

        for name in names {
            if self.get(name).is_none() {
                return Err(MatrixError::config_error_with_hint(
                    format!("Unknown profile '{}'", name),
                    None,
                    format!("Available profiles: {}", self.profile_names().join(", ")),
                ));
            }
        }

        let configurations = self
            .configurations
            .iter()
            .filter(|c| names.contains(&c.profile_name))
            .cloned()
            .collect();
        Ok(Self { configurations })
    }

    /// Look up a profile by name
    pub fn get(&self, profile_name: &str) -> Option<&BuildConfiguration> {
        self.configurations
            .iter()
            .find(|c| c.profile_name == profile_name)
    }

    pub fn profile_names(&self) -> Vec<&str> {
        self.configurations
            .iter()
            .map(|c| c.profile_name.as_str())
            .collect()
    }

    pub fn as_slice(&self) -> &[BuildConfiguration] {
        &self.configurations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BuildConfiguration> {
        self.configurations.iter()
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }
}

impl<'a> IntoIterator for &'a ConfigurationSet {
    type Item = &'a BuildConfiguration;
    type IntoIter = std::slice::Iter<'a, BuildConfiguration>;

    fn into_iter(self) -> Self::IntoIter {
        self.configurations.iter()
    }
}

/// Profile entries of the built-in matrix
pub fn default_profiles() -> Vec<ProfileEntry> {
    let mingw = |name: &str, dir: &str, flags: &str| ProfileEntry {
        name: name.to_string(),
        output_dir: PathBuf::from(dir),
        generator: "Ninja".to_string(),
        build_mode: None,
        target: None,
        options: vec![
            "-DCMAKE_TOOLCHAIN_FILE=${vcpkg_toolchain}".to_string(),
            "-DCMAKE_C_COMPILER=${mingw_gcc}".to_string(),
            "-DCMAKE_CXX_COMPILER=${mingw_gxx}".to_string(),
            flags.to_string(),
        ],
    };
    let msvc = |name: &str, dir: &str, flags: &str| ProfileEntry {
        name: name.to_string(),
        output_dir: PathBuf::from(dir),
        generator: "Visual Studio 17 2022".to_string(),
        build_mode: None,
        target: None,
        options: vec![
            "-A".to_string(),
            "x64".to_string(),
            "-DCMAKE_TOOLCHAIN_FILE=${vcpkg_toolchain}".to_string(),
            flags.to_string(),
        ],
    };

    vec![
        mingw(
            "Debug-MinGW",
            "build/debug_gcc",
            "-DCMAKE_CXX_FLAGS_DEBUG:STRING=-g -Wall -std=c++20",
        ),
        mingw(
            "RelWithDebInfo-MinGW",
            "build/release_gcc",
            "-DCMAKE_CXX_FLAGS_RELWITHDEBINFO:STRING=-O3 -g -DNDEBUG -std=c++20",
        ),
        msvc(
            "Debug-Visual Studio",
            "build/debug_msvc",
            "-DCMAKE_CXX_FLAGS_DEBUG:STRING=/MDd /Zi /Ob0 /Od /RTC1 /std:c++20 /W4",
        ),
        msvc(
            "RelWithDebInfo-Visual Studio",
            "build/release_msvc",
            "-DCMAKE_CXX_FLAGS_RELWITHDEBINFO:STRING=/MD /Zi /O2 /Ob1 /DNDEBUG /std:c++20",
        ),
    ]
}
