//! Version oracles
//!
//! Two injectable lookups keep the core logic free of process spawning: the
//! [`VersionOracle`] discerns which base-runtime version the run tests
//! against, and [`ArtifactVersions`] asks the build tool which server
//! artifact version a git install would produce. Tests supply stubs;
//! production wiring shells out.

use std::path::PathBuf;
use std::process::Command;
use tracing::warn;

use crate::error::{HarnessError, Result};

/// Discovers the base runtime (Quarry) version to test against
pub trait VersionOracle {
    /// Best-effort; None when the version cannot be discerned
    fn describe_runtime(&self) -> Option<String>;
}

/// Reports the newest locally built server artifact version
pub trait ArtifactVersions {
    fn latest(&self) -> Result<String>;
}

/// Runs `git describe` against the vendored runtime submodule
#[derive(Debug, Clone)]
pub struct GitDescribeOracle {
    submodule: PathBuf,
}

impl GitDescribeOracle {
    pub fn new(submodule: impl Into<PathBuf>) -> Self {
        Self {
            submodule: submodule.into(),
        }
    }
}

impl VersionOracle for GitDescribeOracle {
    fn describe_runtime(&self) -> Option<String> {
        let git_dir = self.submodule.join(".git");
        let output = Command::new("git")
            .arg("--work-tree")
            .arg(&self.submodule)
            .arg("--git-dir")
            .arg(&git_dir)
            .arg("describe")
            .output()
            .ok()?;

        let described = String::from_utf8_lossy(&output.stdout);
        let version = parse_release_version(&described);
        if version.is_none() {
            warn!(
                submodule = %self.submodule.display(),
                "failed to discern runtime version using git describe"
            );
        }
        version
    }
}

/// Extract "X.Y.Z" from a `git describe` line such as "1.4.2-12-gdeadbee"
pub fn parse_release_version(described: &str) -> Option<String> {
    let token = described.lines().next()?.trim().split('-').next()?;
    let mut parts = token.split('.');
    for _ in 0..3 {
        let part = parts.next()?;
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
    }
    if parts.next().is_some() {
        return None;
    }
    Some(token.to_string())
}

/// Queries the project build tool for the artifact version it would produce
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildToolQuery;

impl ArtifactVersions for BuildToolQuery {
    fn latest(&self) -> Result<String> {
        let output = Command::new("lein")
            .args(["with-profile", "ci", "pprint", ":version"])
            .output()
            .map_err(|e| HarnessError::general(format!("failed to invoke build tool: {e}")))?;

        if !output.status.success() {
            return Err(HarnessError::general(format!(
                "build tool version query exited with {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        extract_quoted_version(&stdout).ok_or_else(|| {
            HarnessError::general("build tool output carried no quoted version token")
        })
    }
}

/// The version token is double-quoted on the last output line of the query
pub fn extract_quoted_version(output: &str) -> Option<String> {
    let line = output.lines().filter(|l| !l.trim().is_empty()).last()?;
    let mut parts = line.split('"');
    parts.next()?;
    let token = parts.next()?;
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release_version() {
        assert_eq!(
            parse_release_version("4.2.1\n").as_deref(),
            Some("4.2.1")
        );
        assert_eq!(
            parse_release_version("4.2.1-37-g1ab2c3d\n").as_deref(),
            Some("4.2.1")
        );
        assert_eq!(parse_release_version(""), None);
        assert_eq!(parse_release_version("not-a-version"), None);
        assert_eq!(parse_release_version("4.2\n"), None);
        assert_eq!(parse_release_version("4.2.1.9\n"), None);
    }

    #[test]
    fn test_extract_quoted_version() {
        assert_eq!(
            extract_quoted_version("\"2.3.0-SNAPSHOT\"\n").as_deref(),
            Some("2.3.0-SNAPSHOT")
        );
        // The build tool chatters before the version line
        let noisy = "Picked up JAVA_TOOL_OPTIONS\nwarning: profile ci\n\"1.0.8\"\n";
        assert_eq!(extract_quoted_version(noisy).as_deref(), Some("1.0.8"));
        // Trailing blank lines are ignored
        assert_eq!(
            extract_quoted_version("\"1.0.8\"\n\n").as_deref(),
            Some("1.0.8")
        );
        assert_eq!(extract_quoted_version("no quotes here\n"), None);
        assert_eq!(extract_quoted_version(""), None);
        assert_eq!(extract_quoted_version("\"\"\n"), None);
    }
}
