//! BuildMatrix.toml parsing
//!
//! The file is optional. When present it can override toolchain paths, the
//! default worker count, and replace the built-in profile list.
//!
//! ```toml
//! [toolchain]
//! cmake = "C:/Program Files/CMake/bin/cmake.exe"
//! vcpkg_toolchain = "C:/vcpkg/scripts/buildsystems/vcpkg.cmake"
//!
//! [build]
//! jobs = 8
//!
//! [[profile]]
//! name = "Debug-MinGW"
//! output_dir = "build/debug_gcc"
//! generator = "Ninja"
//! options = [
//!     "-DCMAKE_TOOLCHAIN_FILE=${vcpkg_toolchain}",
//!     "-DCMAKE_CXX_FLAGS_DEBUG:STRING=-g -Wall -std=c++20",
//! ]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{derive_build_mode, BuildConfiguration};
use crate::build::toolchains::{ToolchainPaths, ToolchainSettings};
use crate::error::{hints, MatrixError};

/// File name looked up in the source directory
pub const DEFAULT_MATRIX_FILE: &str = "BuildMatrix.toml";

/// Root of BuildMatrix.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixFile {
    /// Toolchain path overrides
    #[serde(default)]
    pub toolchain: ToolchainSettings,

    /// Build step settings
    #[serde(default)]
    pub build: BuildSection,

    /// Profiles, replacing the built-in matrix when non-empty
    #[serde(default, rename = "profile")]
    pub profiles: Vec<ProfileEntry>,
}

/// [build] section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Worker count for single-config generators
    pub jobs: Option<usize>,
}

/// One [[profile]] table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileEntry {
    pub name: String,
    pub output_dir: PathBuf,
    pub generator: String,
    /// Derived from the name when omitted
    pub build_mode: Option<String>,
    pub target: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl ProfileEntry {
    /// Turn the entry into a profile, expanding `${...}` placeholders in options
    pub fn into_configuration(self, paths: &ToolchainPaths) -> Result<BuildConfiguration, MatrixError> {
        let options = self
            .options
            .iter()
            .map(|option| paths.expand(option))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| match e {
                MatrixError::Configuration { message, source, hint } => MatrixError::Configuration {
                    message: format!("Profile '{}': {}", self.name, message),
                    source,
                    hint,
                },
                other => other,
            })?;

        let build_mode = self
            .build_mode
            .unwrap_or_else(|| derive_build_mode(&self.name).to_string());

        Ok(BuildConfiguration {
            profile_name: self.name,
            output_dir: self.output_dir,
            generator: self.generator,
            build_mode,
            target: self.target,
            options,
        })
    }
}

impl MatrixFile {
    /// Parse a matrix file from a string
    pub fn parse(content: &str) -> Result<Self, MatrixError> {
        toml::from_str(content).map_err(|e| {
            MatrixError::config_error_with_hint(
                format!("Failed to parse {}: {}", DEFAULT_MATRIX_FILE, e.message()),
                Some(e.into()),
                hints::matrix_file(),
            )
        })
    }

    /// Load a matrix file from disk
    pub fn load(path: &Path) -> Result<Self, MatrixError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MatrixError::config_error_with_hint(
                format!("Failed to read {}", path.display()),
                Some(e.into()),
                "Check the path passed to --config",
            )
        })?;
        Self::parse(&content)
    }

    /// Load `path` if given (must exist), otherwise `<dir>/BuildMatrix.toml` if present
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Option<Self>, MatrixError> {
        if let Some(path) = explicit {
            return Self::load(path).map(Some);
        }

        let default_path = dir.join(DEFAULT_MATRIX_FILE);
        if default_path.is_file() {
            Self::load(&default_path).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> ToolchainPaths {
        ToolchainPaths {
            cmake: PathBuf::from("cmake"),
            vcpkg_toolchain: PathBuf::from("/opt/vcpkg/scripts/buildsystems/vcpkg.cmake"),
            mingw_gcc: PathBuf::from("gcc"),
            mingw_gxx: PathBuf::from("g++"),
        }
    }

    #[test]
    fn test_parse_full_file() {
        let file = MatrixFile::parse(
            r#"
            [toolchain]
            cmake = "/usr/local/bin/cmake"

            [build]
            jobs = 6

            [[profile]]
            name = "Debug-Clang"
            output_dir = "build/debug_clang"
            generator = "Ninja"
            options = ["-DCMAKE_TOOLCHAIN_FILE=${vcpkg_toolchain}", "-DCMAKE_CXX_FLAGS_DEBUG:STRING=-g -O0"]

            [[profile]]
            name = "Fast"
            output_dir = "build/fast"
            generator = "Ninja Multi-Config"
            build_mode = "Release"
            target = "app"
            "#,
        )
        .unwrap();

        assert_eq!(file.toolchain.cmake, Some(PathBuf::from("/usr/local/bin/cmake")));
        assert_eq!(file.build.jobs, Some(6));
        assert_eq!(file.profiles.len(), 2);

        let mut entries = file.profiles.into_iter();
        let debug = entries.next().unwrap().into_configuration(&paths()).unwrap();
        assert_eq!(debug.build_mode, "Debug");
        assert_eq!(
            debug.options,
            vec![
                "-DCMAKE_TOOLCHAIN_FILE=/opt/vcpkg/scripts/buildsystems/vcpkg.cmake".to_string(),
                "-DCMAKE_CXX_FLAGS_DEBUG:STRING=-g -O0".to_string(),
            ]
        );

        let fast = entries.next().unwrap().into_configuration(&paths()).unwrap();
        assert_eq!(fast.build_mode, "Release");
        assert_eq!(fast.target.as_deref(), Some("app"));
        assert!(fast.options.is_empty());
    }

    #[test]
    fn test_parse_empty_file() {
        let file = MatrixFile::parse("").unwrap();
        assert!(file.profiles.is_empty());
        assert!(file.toolchain.cmake.is_none());
        assert!(file.build.jobs.is_none());
    }

    #[test]
    fn test_parse_errors() {
        let err = MatrixFile::parse("[[profile]]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, MatrixError::Configuration { hint: Some(_), .. }));

        assert!(MatrixFile::parse("[toolchain]\ncompiler = \"cl\"\n").is_err());
        assert!(MatrixFile::parse("[build]\njobs = \"ten\"\n").is_err());
    }

    #[test]
    fn test_unknown_placeholder_names_profile() {
        let entry = ProfileEntry {
            name: "Debug-MinGW".to_string(),
            output_dir: PathBuf::from("build/debug_gcc"),
            generator: "Ninja".to_string(),
            build_mode: None,
            target: None,
            options: vec!["-DCMAKE_MAKE_PROGRAM=${ninja}".to_string()],
        };
        let err = entry.into_configuration(&paths()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Debug-MinGW"));
        assert!(message.contains("ninja"));
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        assert!(MatrixFile::discover(None, dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(DEFAULT_MATRIX_FILE),
            "[build]\njobs = 3\n",
        )
        .unwrap();
        let found = MatrixFile::discover(None, dir.path()).unwrap().unwrap();
        assert_eq!(found.build.jobs, Some(3));

        let missing = dir.path().join("missing.toml");
        assert!(MatrixFile::discover(Some(&missing), dir.path()).is_err());
    }
}
