//! Run configuration
//!
//! Built exactly once per process from an options file, the environment, and
//! declared defaults, then shared read-only for the remainder of the run.
//! The [`ConfigCell`] guard makes a second build attempt a loud failure
//! instead of a silent reconfiguration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

use crate::error::{HarnessError, Result};
use crate::settings::{env_snapshot, EnvSnapshot, Setting, ValueType};
use crate::types::{InstallMode, InstallStrategy, InstallType};
use crate::version::VersionOracle;

/// Known-good Quarry agent development build, used when no override is given
const DEFAULT_QUARRY_BUILD_VERSION: &str = "8f3c1d0b9a6e4712c5e8d03b1f47a92655e0c3da";
/// Known-good QuarryDB release
const DEFAULT_QUARRYDB_BUILD_VERSION: &str = "1.7.2";

const INSTALL_TYPE: Setting = Setting {
    description: "install type",
    legal_values: Some(&["git", "package"]),
    env_var: Some("QUARRYSERVER_INSTALL_TYPE"),
    default: Some("package"),
    value_type: ValueType::Symbol,
};

const INSTALL_MODE: Setting = Setting {
    description: "install mode",
    legal_values: Some(&["install", "upgrade"]),
    env_var: Some("QUARRYSERVER_INSTALL_MODE"),
    default: Some("install"),
    value_type: ValueType::Symbol,
};

const SERVER_VERSION: Setting = Setting {
    description: "Quarry Server version",
    legal_values: None,
    env_var: Some("QUARRYSERVER_VERSION"),
    default: None,
    value_type: ValueType::Str,
};

const QUARRY_VERSION: Setting = Setting {
    description: "Quarry version",
    legal_values: None,
    env_var: Some("QUARRY_VERSION"),
    default: None,
    value_type: ValueType::Str,
};

const QUARRY_BUILD_VERSION: Setting = Setting {
    description: "Quarry agent development build version",
    legal_values: None,
    env_var: Some("QUARRY_BUILD_VERSION"),
    default: Some(DEFAULT_QUARRY_BUILD_VERSION),
    value_type: ValueType::Str,
};

const QUARRYDB_BUILD_VERSION: Setting = Setting {
    description: "QuarryDB version",
    legal_values: None,
    env_var: Some("QUARRYDB_BUILD_VERSION"),
    default: Some(DEFAULT_QUARRYDB_BUILD_VERSION),
    value_type: ValueType::Str,
};

/// Explicit per-setting values, typically loaded from a JSON options file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOptions {
    pub install_type: Option<String>,
    pub install_mode: Option<String>,
    pub server_version: Option<String>,
    pub quarry_version: Option<String>,
    pub quarry_build_version: Option<String>,
    pub quarrydb_build_version: Option<String>,
}

impl RawOptions {
    /// Load explicit options from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// The complete resolved configuration for one test-run process
///
/// Immutable after construction; safely shared by reference across any
/// concurrent per-host work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub install_type: InstallType,
    pub install_mode: InstallMode,
    pub server_version: Option<String>,
    pub quarry_version: Option<String>,
    pub quarry_build_version: Option<String>,
    pub quarrydb_build_version: Option<String>,
}

impl RunConfig {
    /// Resolve every setting against the current process environment
    pub fn build(options: &RawOptions, oracle: &dyn VersionOracle) -> Result<Self> {
        Self::build_with_env(options, oracle, &env_snapshot())
    }

    /// Resolve every setting against an explicit environment snapshot
    pub fn build_with_env(
        options: &RawOptions,
        oracle: &dyn VersionOracle,
        env: &EnvSnapshot,
    ) -> Result<Self> {
        let install_type = parse_symbol::<InstallType>(
            &INSTALL_TYPE,
            INSTALL_TYPE.resolve(options.install_type.as_deref(), env)?,
        )?;
        let install_mode = parse_symbol::<InstallMode>(
            &INSTALL_MODE,
            INSTALL_MODE.resolve(options.install_mode.as_deref(), env)?,
        )?;

        let server_version = SERVER_VERSION.resolve(options.server_version.as_deref(), env)?;

        // The runtime version falls back to whatever the vendored submodule
        // reports, and stays None when that fails too.
        let quarry_version = QUARRY_VERSION
            .resolve(options.quarry_version.as_deref(), env)?
            .or_else(|| oracle.describe_runtime());

        let quarry_build_version =
            QUARRY_BUILD_VERSION.resolve(options.quarry_build_version.as_deref(), env)?;
        let quarrydb_build_version =
            QUARRYDB_BUILD_VERSION.resolve(options.quarrydb_build_version.as_deref(), env)?;

        let config = Self {
            install_type,
            install_mode,
            server_version,
            quarry_version,
            quarry_build_version,
            quarrydb_build_version,
        };

        info!("Quarry Server acceptance configuration:\n{config:#?}");
        Ok(config)
    }

    /// Derive the install strategy this configuration calls for
    pub fn install_strategy(&self, build_env: HashMap<String, String>) -> InstallStrategy {
        match self.install_type {
            InstallType::Package => InstallStrategy::Package,
            InstallType::Git => InstallStrategy::Artifact {
                version: self.server_version.clone(),
                build_env,
            },
        }
    }
}

fn parse_symbol<T: std::str::FromStr>(setting: &Setting, resolved: Option<String>) -> Result<T> {
    let value = resolved.ok_or_else(|| {
        HarnessError::invalid_configuration(setting.description, "<unset>")
    })?;
    value
        .parse::<T>()
        .map_err(|_| HarnessError::invalid_configuration(setting.description, value))
}

/// Build-once holder for the process-wide run configuration
///
/// Mid-run reconfiguration is out of scope; a second install fails with
/// [`HarnessError::ConfigAlreadyBuilt`] rather than silently returning a
/// different configuration.
#[derive(Debug, Default)]
pub struct ConfigCell(OnceLock<RunConfig>);

impl ConfigCell {
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Store the just-built configuration; fails loudly on a second attempt
    pub fn install(&self, config: RunConfig) -> Result<&RunConfig> {
        self.0
            .set(config)
            .map_err(|_| HarnessError::ConfigAlreadyBuilt)?;
        // Infallible: set() just succeeded on this cell
        Ok(self.0.get().expect("config cell set but empty"))
    }

    pub fn get(&self) -> Option<&RunConfig> {
        self.0.get()
    }
}
