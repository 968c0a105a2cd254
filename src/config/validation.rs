//! Validation of build profiles with helpful error messages

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use super::BuildConfiguration;
use crate::error::{hints, MatrixError};

/// Validate a whole profile list
pub fn validate_configurations(configurations: &[BuildConfiguration]) -> Result<(), MatrixError> {
    if configurations.is_empty() {
        return Err(MatrixError::config_error_with_hint(
            "No build profiles defined",
            None,
            "Add at least one [[profile]] table to BuildMatrix.toml, or remove the \
             file to use the built-in matrix",
        ));
    }

    let mut names = HashSet::new();
    let mut output_dirs = HashSet::new();

    for (index, config) in configurations.iter().enumerate() {
        validate_configuration(index, config)?;

        if !names.insert(config.profile_name.as_str()) {
            return Err(MatrixError::config_error_with_hint(
                format!("Duplicate profile name '{}'", config.profile_name),
                None,
                hints::duplicate_profile(),
            ));
        }

        if !output_dirs.insert(normalize_path(&config.output_dir)) {
            return Err(MatrixError::config_error_with_hint(
                format!(
                    "Profile '{}' reuses output directory '{}'",
                    config.profile_name,
                    config.output_dir.display()
                ),
                None,
                hints::duplicate_profile(),
            ));
        }
    }

    Ok(())
}

/// Validate a single profile
fn validate_configuration(index: usize, config: &BuildConfiguration) -> Result<(), MatrixError> {
    if config.profile_name.trim().is_empty() {
        return Err(MatrixError::config_error_with_hint(
            format!("Profile #{} has an empty name", index + 1),
            None,
            "Give every profile a readable name like 'Debug-MinGW'",
        ));
    }

    if is_empty_path(&config.output_dir) {
        return Err(MatrixError::config_error_with_hint(
            format!("Profile '{}' has an empty output directory", config.profile_name),
            None,
            "Set output_dir, e.g. output_dir = \"build/debug_gcc\"",
        ));
    }

    if config.generator.trim().is_empty() {
        return Err(MatrixError::config_error_with_hint(
            format!("Profile '{}' has no generator", config.profile_name),
            None,
            hints::unsupported_generator(),
        ));
    }

    if config.build_mode.trim().is_empty() {
        return Err(MatrixError::config_error_with_hint(
            format!("Profile '{}' has an empty build mode", config.profile_name),
            None,
            "Set build_mode explicitly or name the profile '<Mode>-<Toolchain>'",
        ));
    }

    Ok(())
}

/// Lexical normal form: `.` dropped, `..` folded into its parent
fn normalize_path(path: &Path) -> PathBuf {
    let mut normal = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let folds = matches!(normal.components().next_back(), Some(Component::Normal(_)));
                if folds {
                    normal.pop();
                } else {
                    normal.push(component);
                }
            }
            other => normal.push(other),
        }
    }
    normal
}

fn is_empty_path(path: &Path) -> bool {
    path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str, dir: &str) -> BuildConfiguration {
        BuildConfiguration::new(name, dir, "Ninja")
    }

    #[test]
    fn test_valid_profiles() {
        let configs = vec![
            profile("Debug-MinGW", "build/debug_gcc"),
            profile("RelWithDebInfo-MinGW", "build/release_gcc"),
        ];
        assert!(validate_configurations(&configs).is_ok());
    }

    #[test]
    fn test_empty_set() {
        assert!(validate_configurations(&[]).is_err());
    }

    #[test]
    fn test_empty_name_and_dir() {
        assert!(validate_configurations(&[profile("", "build/a")]).is_err());
        assert!(validate_configurations(&[profile("   ", "build/a")]).is_err());
        assert!(validate_configurations(&[profile("Debug-MinGW", "")]).is_err());
    }

    #[test]
    fn test_empty_generator_and_mode() {
        let no_generator = BuildConfiguration::new("Debug-MinGW", "build/a", "");
        assert!(validate_configurations(&[no_generator]).is_err());

        // "-MinGW" derives an empty build mode
        assert!(validate_configurations(&[profile("-MinGW", "build/a")]).is_err());

        let explicit = profile("-MinGW", "build/a").with_build_mode("Debug");
        assert!(validate_configurations(&[explicit]).is_ok());
    }

    #[test]
    fn test_duplicates() {
        let err = validate_configurations(&[
            profile("Debug-MinGW", "build/a"),
            profile("Debug-MinGW", "build/b"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate profile name"));

        let err = validate_configurations(&[
            profile("Debug-MinGW", "build/a"),
            profile("Release-MinGW", "build/a/"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("reuses output directory"));

        for spelling in ["./build/a", "build/x/../a", "build/./a/."] {
            let err = validate_configurations(&[
                profile("Debug-MinGW", "build/a"),
                profile("Release-MinGW", spelling),
            ])
            .unwrap_err();
            assert!(err.to_string().contains("reuses output directory"), "{}", spelling);
        }

        let distinct = validate_configurations(&[
            profile("Debug-MinGW", "../build/a"),
            profile("Release-MinGW", "build/a"),
        ]);
        assert!(distinct.is_ok());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("./build/a/")), PathBuf::from("build/a"));
        assert_eq!(normalize_path(Path::new("build/x/../a")), PathBuf::from("build/a"));
        assert_eq!(normalize_path(Path::new("../out")), PathBuf::from("../out"));
        assert_eq!(normalize_path(Path::new("a/../../out")), PathBuf::from("../out"));
    }
}
