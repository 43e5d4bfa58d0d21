//! Project root discovery and configuration paths
//!
//! Data files named by test arguments are resolved relative to the project
//! root: the nearest ancestor of the working directory that contains one of
//! the configured marker files.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::{Error, Result};

/// Name used for the configuration directory
const APP_NAME: &str = "solution-harness";

/// Process-wide project root, resolved on first use
static PROJECT_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Get the project root, discovering it from the working directory on first call
///
/// The first successful resolution is cached for the lifetime of the process;
/// later calls return it even if the working directory has changed since.
/// A failed discovery is not cached.
pub fn project_root<S: AsRef<str>>(markers: &[S]) -> Result<&'static Path> {
    if let Some(root) = PROJECT_ROOT.get() {
        return Ok(root.as_path());
    }

    let cwd = std::env::current_dir()?;
    let found = find_project_root(&cwd, markers)?;
    tracing::debug!(root = %found.display(), "Resolved project root");

    Ok(PROJECT_ROOT.get_or_init(|| found).as_path())
}

/// Walk upward from `start` to the first directory containing a marker file
///
/// Markers starting with `*.` match any file with that extension
/// (e.g. `*.csproj`); other markers match an exact file name.
pub fn find_project_root<S: AsRef<str>>(start: &Path, markers: &[S]) -> Result<PathBuf> {
    let mut dir = Some(start);
    while let Some(candidate) = dir {
        if contains_marker(candidate, markers) {
            return Ok(candidate.to_path_buf());
        }
        dir = candidate.parent();
    }

    Err(Error::ProjectRootNotFound {
        start: start.display().to_string(),
        markers: markers
            .iter()
            .map(|m| m.as_ref())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

fn contains_marker<S: AsRef<str>>(dir: &Path, markers: &[S]) -> bool {
    markers.iter().any(|marker| {
        let marker = marker.as_ref();
        match marker.strip_prefix("*.") {
            Some(ext) => has_extension_in_dir(dir, ext),
            None => dir.join(marker).is_file(),
        }
    })
}

fn has_extension_in_dir(dir: &Path, ext: &str) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                let path = e.path();
                path.is_file()
                    && path
                        .extension()
                        .map(|x| x.eq_ignore_ascii_case(ext))
                        .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/solution-harness/`
/// - macOS: `~/Library/Application Support/solution-harness/`
/// - Windows: `%APPDATA%\solution-harness\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_root_walks_upward() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::write(root.join("Cargo.toml"), "[package]\n").unwrap();
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_project_root(&nested, &["Cargo.toml"]).unwrap();
        assert_eq!(found, root);
    }

    #[test]
    fn test_find_root_matches_extension_marker() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("LeetCode.csproj"), "<Project/>").unwrap();
        let nested = tmp.path().join("bin");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_project_root(&nested, &["*.csproj"]).unwrap();
        assert_eq!(found, tmp.path());
    }

    #[test]
    fn test_find_root_reports_missing_marker() {
        let tmp = tempfile::tempdir().unwrap();
        let err = find_project_root(tmp.path(), &["no-such-marker.toml"]).unwrap_err();
        assert!(matches!(err, Error::ProjectRootNotFound { .. }));
    }

    #[test]
    fn test_project_root_is_cached() {
        let first = project_root(&["Cargo.toml"]).unwrap();
        let second = project_root(&["does-not-matter"]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_config_dir_is_valid() {
        let dir = config_dir();
        assert!(dir.is_some());
    }
}
