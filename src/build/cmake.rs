//! CMake command construction
//!
//! This module maps a build profile and a phase to the exact `cmake`
//! invocation. Nothing here touches the filesystem or spawns processes.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::BuildConfiguration;
use crate::error::MatrixError;

/// Default worker count passed to single-config builds
pub const DEFAULT_JOBS: usize = 10;

/// Cache file CMake writes once a build directory has been configured
pub const CMAKE_CACHE_FILE: &str = "CMakeCache.txt";

/// Stamp CMake leaves behind only after a configure that generated build files
pub const CMAKE_CHECK_CACHE_FILE: &str = "CMakeFiles/cmake.check_cache";

/// Single-config generators recognised by name
pub(crate) const SINGLE_CONFIG_GENERATORS: &[&str] = &[
    "Ninja",
    "Unix Makefiles",
    "MinGW Makefiles",
    "MSYS Makefiles",
    "NMake Makefiles",
    "NMake Makefiles JOM",
    "Watcom WMake",
    "Borland Makefiles",
];

/// Multi-config generators recognised by name (Visual Studio handled separately)
pub(crate) const MULTI_CONFIG_GENERATORS: &[&str] =
    &["Ninja Multi-Config", "Xcode", "Green Hills MULTI"];

/// Phase of a profile build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Generate build files from source and options
    Configure,
    /// Run the generated build files
    Build,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Configure => write!(f, "Configure"),
            Phase::Build => write!(f, "Build"),
        }
    }
}

/// Generator family, which decides how the build type is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorFamily {
    /// Build type fixed at configure time (`CMAKE_BUILD_TYPE`)
    SingleConfig,
    /// Build type chosen at build time (`--config`)
    MultiConfig,
}

impl GeneratorFamily {
    /// Classify a CMake generator name, `None` if it is not recognised
    pub fn classify(generator: &str) -> Option<Self> {
        if SINGLE_CONFIG_GENERATORS.contains(&generator) {
            return Some(GeneratorFamily::SingleConfig);
        }
        if MULTI_CONFIG_GENERATORS.contains(&generator) || is_visual_studio(generator) {
            return Some(GeneratorFamily::MultiConfig);
        }
        None
    }
}

impl fmt::Display for GeneratorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorFamily::SingleConfig => write!(f, "single-config"),
            GeneratorFamily::MultiConfig => write!(f, "multi-config"),
        }
    }
}

/// "Visual Studio <version> <year>", e.g. "Visual Studio 17 2022"
fn is_visual_studio(generator: &str) -> bool {
    let Some(rest) = generator.strip_prefix("Visual Studio ") else {
        return false;
    };
    let mut parts = rest.split(' ');
    let version = parts.next().unwrap_or_default();
    let year = parts.next().unwrap_or_default();
    parts.next().is_none()
        && !version.is_empty()
        && version.chars().all(|c| c.is_ascii_digit())
        && year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
}

/// Target built when a profile does not name one
pub fn default_target(generator: &str, family: GeneratorFamily) -> &'static str {
    match family {
        GeneratorFamily::MultiConfig if is_visual_studio(generator) || generator == "Xcode" => {
            "ALL_BUILD"
        }
        _ => "all",
    }
}

/// An external command as an argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLine {
    /// Create a command line for `program` with no arguments
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Whether any argument equals `arg`
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Value following the flag `flag`, if present
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.display().to_string()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Basic quoting for display: wrap in double quotes when needed
fn quote(arg: &str) -> String {
    let needs_quotes = arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"');
    if needs_quotes {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// Builds the cmake invocations for each profile and phase
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    /// cmake executable
    cmake: PathBuf,
    /// Source directory (where CMakeLists.txt is located)
    source_dir: PathBuf,
    /// Root that relative output directories are resolved against
    build_root: PathBuf,
    /// Worker count for single-config builds
    jobs: usize,
}

impl CommandBuilder {
    /// Create a builder; output directories resolve against `source_dir`
    pub fn new(cmake: impl Into<PathBuf>, source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        Self {
            cmake: cmake.into(),
            build_root: source_dir.clone(),
            source_dir,
            jobs: DEFAULT_JOBS,
        }
    }

    /// Set the root for relative output directories
    pub fn build_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.build_root = root.into();
        self
    }

    /// Set the worker count for single-config builds
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Absolute (or root-relative) build directory of a profile
    pub fn output_dir(&self, config: &BuildConfiguration) -> PathBuf {
        self.build_root.join(&config.output_dir)
    }

    /// Generator family of a profile
    pub fn family(&self, config: &BuildConfiguration) -> Result<GeneratorFamily, MatrixError> {
        GeneratorFamily::classify(&config.generator).ok_or_else(|| {
            MatrixError::unsupported_generator(&config.profile_name, &config.generator)
        })
    }

    /// Build the command line for one phase of a profile
    pub fn build_command(
        &self,
        config: &BuildConfiguration,
        phase: Phase,
    ) -> Result<CommandLine, MatrixError> {
        let family = self.family(config)?;
        let output_dir = self.output_dir(config).display().to_string();

        let command = match phase {
            Phase::Configure => {
                let cmd = CommandLine::new(&self.cmake)
                    .arg("-S")
                    .arg(self.source_dir.display().to_string())
                    .arg("-B")
                    .arg(output_dir)
                    .arg("-G")
                    .arg(&config.generator);

                let cmd = match family {
                    GeneratorFamily::SingleConfig => {
                        cmd.arg(format!("-DCMAKE_BUILD_TYPE={}", config.build_mode))
                    }
                    GeneratorFamily::MultiConfig => cmd,
                };

                cmd.args(config.options.iter().cloned())
            }
            Phase::Build => {
                let target = config
                    .target
                    .as_deref()
                    .unwrap_or_else(|| default_target(&config.generator, family));

                let cmd = CommandLine::new(&self.cmake).arg("--build").arg(output_dir);

                match family {
                    GeneratorFamily::MultiConfig => cmd
                        .arg("--config")
                        .arg(&config.build_mode)
                        .arg("--target")
                        .arg(target),
                    GeneratorFamily::SingleConfig => cmd
                        .arg("--target")
                        .arg(target)
                        .arg("-j")
                        .arg(self.jobs.to_string()),
                }
            }
        };

        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ninja_profile() -> BuildConfiguration {
        BuildConfiguration::new("Debug-MinGW", "build/debug_gcc", "Ninja")
            .with_option("-DCMAKE_CXX_FLAGS_DEBUG:STRING=-g -Wall -std=c++20")
    }

    fn msvc_profile() -> BuildConfiguration {
        BuildConfiguration::new("Debug-Visual Studio", "build/debug_msvc", "Visual Studio 17 2022")
    }

    fn builder() -> CommandBuilder {
        CommandBuilder::new("cmake", "/src")
    }

    #[test]
    fn test_classify_generators() {
        assert_eq!(GeneratorFamily::classify("Ninja"), Some(GeneratorFamily::SingleConfig));
        assert_eq!(
            GeneratorFamily::classify("Unix Makefiles"),
            Some(GeneratorFamily::SingleConfig)
        );
        assert_eq!(
            GeneratorFamily::classify("Visual Studio 17 2022"),
            Some(GeneratorFamily::MultiConfig)
        );
        assert_eq!(
            GeneratorFamily::classify("Visual Studio 16 2019"),
            Some(GeneratorFamily::MultiConfig)
        );
        assert_eq!(
            GeneratorFamily::classify("Ninja Multi-Config"),
            Some(GeneratorFamily::MultiConfig)
        );
        assert_eq!(GeneratorFamily::classify("Xcode"), Some(GeneratorFamily::MultiConfig));

        assert_eq!(GeneratorFamily::classify("ninja"), None);
        assert_eq!(GeneratorFamily::classify("Visual Studio"), None);
        assert_eq!(GeneratorFamily::classify("Visual Studio 17 2022 Win64 extra"), None);
        assert_eq!(GeneratorFamily::classify("\"Visual Studio 17 2022\""), None);
        assert_eq!(GeneratorFamily::classify("Code::Blocks"), None);
    }

    #[test]
    fn test_configure_single_config() {
        let cmd = builder().build_command(&ninja_profile(), Phase::Configure).unwrap();
        assert_eq!(cmd.program(), Path::new("cmake"));
        assert_eq!(cmd.value_of("-S"), Some("/src"));
        assert_eq!(
            cmd.value_of("-B"),
            Some(Path::new("/src").join("build/debug_gcc").to_str().unwrap())
        );
        assert_eq!(cmd.value_of("-G"), Some("Ninja"));
        assert!(cmd.has_arg("-DCMAKE_BUILD_TYPE=Debug"));
        // options go through as a single argument each, in order, last
        assert_eq!(
            cmd.get_args().last().map(String::as_str),
            Some("-DCMAKE_CXX_FLAGS_DEBUG:STRING=-g -Wall -std=c++20")
        );
    }

    #[test]
    fn test_configure_multi_config_has_no_build_type() {
        let cmd = builder().build_command(&msvc_profile(), Phase::Configure).unwrap();
        assert_eq!(cmd.value_of("-G"), Some("Visual Studio 17 2022"));
        assert!(!cmd.get_args().iter().any(|a| a.starts_with("-DCMAKE_BUILD_TYPE")));
    }

    #[test]
    fn test_build_multi_config_uses_derived_mode() {
        let config =
            BuildConfiguration::new("Debug-X", "build/x", "Visual Studio 17 2022");
        let cmd = builder().build_command(&config, Phase::Build).unwrap();
        assert_eq!(cmd.value_of("--config"), Some("Debug"));
        assert_eq!(cmd.value_of("--target"), Some("ALL_BUILD"));
        assert!(!cmd.has_arg("-j"));
    }

    #[test]
    fn test_build_single_config_has_jobs_and_no_config() {
        let cmd = builder().build_command(&ninja_profile(), Phase::Build).unwrap();
        assert_eq!(cmd.value_of("-j"), Some("10"));
        assert_eq!(cmd.value_of("--target"), Some("all"));
        assert!(!cmd.has_arg("--config"));

        let cmd = builder()
            .jobs(4)
            .build_command(&ninja_profile(), Phase::Build)
            .unwrap();
        assert_eq!(cmd.value_of("-j"), Some("4"));
    }

    #[test]
    fn test_build_explicit_target_and_mode() {
        let config = BuildConfiguration::new("Fast", "build/fast", "Ninja Multi-Config")
            .with_build_mode("Release")
            .with_target("app");
        let cmd = builder().build_command(&config, Phase::Build).unwrap();
        assert_eq!(cmd.value_of("--config"), Some("Release"));
        assert_eq!(cmd.value_of("--target"), Some("app"));
    }

    #[test]
    fn test_default_targets() {
        assert_eq!(
            default_target("Visual Studio 17 2022", GeneratorFamily::MultiConfig),
            "ALL_BUILD"
        );
        assert_eq!(default_target("Xcode", GeneratorFamily::MultiConfig), "ALL_BUILD");
        assert_eq!(default_target("Ninja Multi-Config", GeneratorFamily::MultiConfig), "all");
        assert_eq!(default_target("Ninja", GeneratorFamily::SingleConfig), "all");
    }

    #[test]
    fn test_unsupported_generator() {
        let config = BuildConfiguration::new("Debug-Borland", "build/b", "Borland C++ 5");
        for phase in [Phase::Configure, Phase::Build] {
            let err = builder().build_command(&config, phase).unwrap_err();
            assert!(matches!(
                err,
                MatrixError::UnsupportedGenerator { ref profile, ref generator }
                    if profile == "Debug-Borland" && generator == "Borland C++ 5"
            ));
        }
    }

    #[test]
    fn test_build_root_and_absolute_output_dir() {
        let b = builder().build_root("/out");
        assert_eq!(b.output_dir(&ninja_profile()), PathBuf::from("/out/build/debug_gcc"));

        let absolute = BuildConfiguration::new("Debug-Abs", "/tmp/abs", "Ninja");
        assert_eq!(b.output_dir(&absolute), PathBuf::from("/tmp/abs"));
    }

    #[test]
    fn test_display_quotes_arguments() {
        let cmd = CommandLine::new("cmake")
            .arg("-G")
            .arg("Visual Studio 17 2022")
            .arg("-DFLAGS=\"x\"")
            .arg("");
        assert_eq!(
            cmd.to_string(),
            r#"cmake -G "Visual Studio 17 2022" "-DFLAGS=\"x\"" """#
        );
    }
}
