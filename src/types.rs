//! Type-safe configuration types for the acceptance harness
//!
//! Replaces stringly-typed configuration with proper Rust enums that provide
//! compile-time validation and exhaustive matching.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumIter, EnumString};

use crate::error::{HarnessError, Result};

/// How the server under test gets onto a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum InstallType {
    /// Install a locally built artifact from the git checkout
    #[strum(serialize = "git")]
    Git,
    /// Install the distribution package
    #[default]
    #[strum(serialize = "package")]
    Package,
}

/// Whether this run installs fresh or upgrades an existing install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum InstallMode {
    #[default]
    #[strum(serialize = "install")]
    Install,
    #[strum(serialize = "upgrade")]
    Upgrade,
}

/// Normalized OS family of a test host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PlatformFamily {
    #[strum(serialize = "fedora")]
    Fedora,
    /// Enterprise Linux: el, centos, redhat rebuilds
    #[strum(serialize = "el")]
    El,
    #[strum(serialize = "debian")]
    Debian,
    #[strum(serialize = "ubuntu")]
    Ubuntu,
    /// Anything the classifier does not recognize; consumers warn and skip
    #[strum(serialize = "other")]
    Other,
}

/// The chosen method for installing the server under test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStrategy {
    /// Prebuilt distribution package
    Package,
    /// Locally built artifact, version-qualified
    Artifact {
        /// Explicit version; resolved from the build tool when None
        version: Option<String>,
        /// Extra environment for the artifact build/install step
        build_env: HashMap<String, String>,
    },
}

impl InstallStrategy {
    /// Parse a strategy name as given on the command line or in an options
    /// file. Anything outside the known variants is a configuration defect.
    pub fn parse(kind: &str) -> Result<Self> {
        match kind {
            "package" => Ok(Self::Package),
            "git" => Ok(Self::Artifact {
                version: None,
                build_env: HashMap::new(),
            }),
            other => Err(HarnessError::UnsupportedStrategy(other.to_string())),
        }
    }
}
