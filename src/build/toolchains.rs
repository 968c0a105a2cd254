//! Toolchain paths
//!
//! Machine-specific paths (cmake, the vcpkg toolchain file, MinGW compilers)
//! are resolved once at start-up from, in order of precedence, command-line
//! flags or their environment variables, the `[toolchain]` section of
//! BuildMatrix.toml, and built-in defaults.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Deserialize;

use crate::error::MatrixError;

/// Default vcpkg toolchain file location on Windows
pub const DEFAULT_VCPKG_TOOLCHAIN: &str = "C:/vcpkg/scripts/buildsystems/vcpkg.cmake";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Optional toolchain paths, as given on the command line or in [toolchain]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolchainSettings {
    pub cmake: Option<PathBuf>,
    pub vcpkg_toolchain: Option<PathBuf>,
    pub mingw_gcc: Option<PathBuf>,
    pub mingw_gxx: Option<PathBuf>,
}

impl ToolchainSettings {
    /// Fill every unset path from `lower`
    pub fn or(self, lower: &ToolchainSettings) -> Self {
        Self {
            cmake: self.cmake.or_else(|| lower.cmake.clone()),
            vcpkg_toolchain: self.vcpkg_toolchain.or_else(|| lower.vcpkg_toolchain.clone()),
            mingw_gcc: self.mingw_gcc.or_else(|| lower.mingw_gcc.clone()),
            mingw_gxx: self.mingw_gxx.or_else(|| lower.mingw_gxx.clone()),
        }
    }
}

/// Resolved toolchain paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainPaths {
    /// cmake executable
    pub cmake: PathBuf,
    /// vcpkg CMake toolchain file
    pub vcpkg_toolchain: PathBuf,
    /// MinGW C compiler
    pub mingw_gcc: PathBuf,
    /// MinGW C++ compiler
    pub mingw_gxx: PathBuf,
}

impl ToolchainPaths {
    /// Resolve paths: `overrides` first, then `file`, then defaults
    pub fn resolve(
        overrides: &ToolchainSettings,
        file: &ToolchainSettings,
    ) -> Result<Self, MatrixError> {
        let merged = overrides.clone().or(file);

        let paths = Self {
            cmake: merged.cmake.unwrap_or_else(default_cmake),
            vcpkg_toolchain: merged
                .vcpkg_toolchain
                .unwrap_or_else(|| PathBuf::from(DEFAULT_VCPKG_TOOLCHAIN)),
            mingw_gcc: merged.mingw_gcc.unwrap_or_else(|| PathBuf::from("gcc")),
            mingw_gxx: merged.mingw_gxx.unwrap_or_else(|| PathBuf::from("g++")),
        };

        paths.validate()?;
        Ok(paths)
    }

    /// Every path must be non-empty
    pub fn validate(&self) -> Result<(), MatrixError> {
        for (key, path) in self.entries() {
            if path.as_os_str().is_empty() {
                return Err(MatrixError::config_error_with_hint(
                    format!("Toolchain path '{}' is empty", key),
                    None,
                    format!("Set {} under [toolchain] in BuildMatrix.toml", key),
                ));
            }
        }
        Ok(())
    }

    /// Placeholder name and path pairs
    pub fn entries(&self) -> [(&'static str, &Path); 4] {
        [
            ("cmake", self.cmake.as_path()),
            ("vcpkg_toolchain", self.vcpkg_toolchain.as_path()),
            ("mingw_gcc", self.mingw_gcc.as_path()),
            ("mingw_gxx", self.mingw_gxx.as_path()),
        ]
    }

    /// Path for a placeholder name
    pub fn lookup(&self, key: &str) -> Option<&Path> {
        self.entries()
            .into_iter()
            .find(|(name, _)| *name == key)
            .map(|(_, path)| path)
    }

    /// Replace `${name}` placeholders with toolchain paths
    pub fn expand(&self, value: &str) -> Result<String, MatrixError> {
        if let Some(unknown) = PLACEHOLDER
            .captures_iter(value)
            .map(|caps| caps[1].to_string())
            .find(|key| self.lookup(key).is_none())
        {
            let known: Vec<&str> = self.entries().iter().map(|(name, _)| *name).collect();
            return Err(MatrixError::config_error_with_hint(
                format!("Unknown placeholder '${{{}}}' in '{}'", unknown, value),
                None,
                format!("Known placeholders: {}", known.join(", ")),
            ));
        }

        let expanded = PLACEHOLDER.replace_all(value, |caps: &Captures| {
            self.lookup(&caps[1])
                .map(|path| path.display().to_string())
                .unwrap_or_default()
        });
        Ok(expanded.into_owned())
    }

    /// Print resolved paths (verbose mode)
    pub fn print_summary(&self) {
        for (name, path) in self.entries() {
            println!("  {:<16} {}", name, path.display());
        }
    }
}

/// cmake from PATH, or the bare name so the OS resolves it at spawn time
fn default_cmake() -> PathBuf {
    find_executable("cmake").unwrap_or_else(|| PathBuf::from("cmake"))
}

/// Find an executable in PATH
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
