//! Install dispatch: distribution package vs locally built artifact
//!
//! The dispatcher picks the configured strategy and drives one of two
//! injectable collaborators. Remote failures propagate unchanged; an install
//! failure is fatal to that host's run and is never retried here.

use std::collections::HashMap;
use std::process::Command;
use tracing::info;

use crate::error::{HarnessError, Result};
use crate::platform::classify;
use crate::remote::{Host, RemoteRunner};
use crate::types::{InstallStrategy, PlatformFamily};
use crate::version::ArtifactVersions;

/// Name of the server package in the distribution repositories
pub const SERVER_PACKAGE: &str = "quarryserver";

/// Key prefix of the version-qualified artifact install descriptor
const VERSION_DESCRIPTOR_KEY: &str = "quarry-server-version=";

/// Installs the server from the distribution's package repository
pub trait PackageInstaller {
    fn install_package(&self, host: &Host, package: &str) -> Result<()>;
}

/// Installs a locally built artifact identified by a version descriptor
pub trait ArtifactInstaller {
    fn install_artifact(
        &self,
        host: &Host,
        package: &str,
        descriptor: &str,
        build_env: &HashMap<String, String>,
    ) -> Result<()>;
}

/// Chooses and executes the install strategy for one host
pub struct InstallDispatcher<'a> {
    pub packages: &'a dyn PackageInstaller,
    pub artifacts: &'a dyn ArtifactInstaller,
    pub versions: &'a dyn ArtifactVersions,
}

impl InstallDispatcher<'_> {
    /// Install the server on `host` using the given strategy.
    ///
    /// For [`InstallStrategy::Artifact`] with no explicit version, the build
    /// tool is queried exactly once for the latest artifact version before
    /// the install call.
    pub fn install_server(&self, host: &Host, strategy: &InstallStrategy) -> Result<()> {
        match strategy {
            InstallStrategy::Package => {
                info!(host = %host.name, package = SERVER_PACKAGE, "installing server package");
                self.packages.install_package(host, SERVER_PACKAGE)
            }
            InstallStrategy::Artifact { version, build_env } => {
                let version = match version {
                    Some(v) => v.clone(),
                    None => self.versions.latest()?,
                };
                let descriptor = format!("{VERSION_DESCRIPTOR_KEY}{version}");
                info!(host = %host.name, %descriptor, "installing server from local artifact");
                self.artifacts
                    .install_artifact(host, SERVER_PACKAGE, &descriptor, build_env)
            }
        }
    }
}

/// Package installer backed by the host's native package manager over the
/// remote-execution seam
pub struct RemotePackageInstaller<'a> {
    pub runner: &'a dyn RemoteRunner,
}

impl PackageInstaller for RemotePackageInstaller<'_> {
    fn install_package(&self, host: &Host, package: &str) -> Result<()> {
        let platform = classify(&host.platform);
        let command = match platform.family {
            PlatformFamily::Fedora | PlatformFamily::El => {
                format!("yum install -y {package}")
            }
            PlatformFamily::Debian | PlatformFamily::Ubuntu => {
                format!("apt-get install -y {package}")
            }
            PlatformFamily::Other => {
                return Err(HarnessError::remote(
                    &host.name,
                    format!("no package manager known for platform '{}'", host.platform),
                ));
            }
        };
        self.runner.run_checked(host, &command).map(drop)
    }
}

/// Artifact installer delegating to the project's install target, with the
/// target host and version descriptor passed through the environment
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildToolArtifactInstaller;

impl ArtifactInstaller for BuildToolArtifactInstaller {
    fn install_artifact(
        &self,
        host: &Host,
        package: &str,
        descriptor: &str,
        build_env: &HashMap<String, String>,
    ) -> Result<()> {
        let mut cmd = Command::new("make");
        cmd.args(["-e", "install-artifact"])
            .env("TARGET_HOST", &host.name)
            .env("ARTIFACT_PACKAGE", package)
            .env("ARTIFACT_VERSION", descriptor);
        for (key, value) in build_env {
            cmd.env(key, value);
        }

        let status = cmd.status().map_err(|e| {
            HarnessError::remote(&host.name, format!("failed to spawn artifact install: {e}"))
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(HarnessError::remote(
                &host.name,
                format!("artifact install exited with {:?}", status.code()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteOutput;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingInstallers {
        package_calls: RefCell<Vec<(String, String)>>,
        artifact_calls: RefCell<Vec<(String, String)>>,
        version_queries: RefCell<u32>,
    }

    impl PackageInstaller for RecordingInstallers {
        fn install_package(&self, host: &Host, package: &str) -> Result<()> {
            self.package_calls
                .borrow_mut()
                .push((host.name.clone(), package.to_string()));
            Ok(())
        }
    }

    impl ArtifactInstaller for RecordingInstallers {
        fn install_artifact(
            &self,
            host: &Host,
            _package: &str,
            descriptor: &str,
            _build_env: &HashMap<String, String>,
        ) -> Result<()> {
            self.artifact_calls
                .borrow_mut()
                .push((host.name.clone(), descriptor.to_string()));
            Ok(())
        }
    }

    impl ArtifactVersions for RecordingInstallers {
        fn latest(&self) -> Result<String> {
            *self.version_queries.borrow_mut() += 1;
            Ok("9.9.9".to_string())
        }
    }

    fn host() -> Host {
        Host::new("server1", "el-7-x86_64-server")
    }

    #[test]
    fn test_package_strategy_installs_once_queries_never() {
        let mocks = RecordingInstallers::default();
        let dispatcher = InstallDispatcher {
            packages: &mocks,
            artifacts: &mocks,
            versions: &mocks,
        };

        dispatcher
            .install_server(&host(), &InstallStrategy::Package)
            .unwrap();

        assert_eq!(
            mocks.package_calls.borrow().as_slice(),
            &[("server1".to_string(), "quarryserver".to_string())]
        );
        assert!(mocks.artifact_calls.borrow().is_empty());
        assert_eq!(*mocks.version_queries.borrow(), 0);
    }

    #[test]
    fn test_artifact_strategy_with_explicit_version() {
        let mocks = RecordingInstallers::default();
        let dispatcher = InstallDispatcher {
            packages: &mocks,
            artifacts: &mocks,
            versions: &mocks,
        };

        let strategy = InstallStrategy::Artifact {
            version: Some("2.3.0".to_string()),
            build_env: HashMap::new(),
        };
        dispatcher.install_server(&host(), &strategy).unwrap();

        assert_eq!(*mocks.version_queries.borrow(), 0);
        assert_eq!(
            mocks.artifact_calls.borrow().as_slice(),
            &[(
                "server1".to_string(),
                "quarry-server-version=2.3.0".to_string()
            )]
        );
    }

    #[test]
    fn test_artifact_strategy_queries_build_tool_when_unversioned() {
        let mocks = RecordingInstallers::default();
        let dispatcher = InstallDispatcher {
            packages: &mocks,
            artifacts: &mocks,
            versions: &mocks,
        };

        let strategy = InstallStrategy::Artifact {
            version: None,
            build_env: HashMap::new(),
        };
        dispatcher.install_server(&host(), &strategy).unwrap();

        assert_eq!(*mocks.version_queries.borrow(), 1);
        assert_eq!(
            mocks.artifact_calls.borrow().as_slice(),
            &[(
                "server1".to_string(),
                "quarry-server-version=9.9.9".to_string()
            )]
        );
        assert!(mocks.package_calls.borrow().is_empty());
    }

    #[test]
    fn test_remote_failure_propagates_unchanged() {
        struct FailingInstaller;
        impl PackageInstaller for FailingInstaller {
            fn install_package(&self, host: &Host, _package: &str) -> Result<()> {
                Err(HarnessError::remote(&host.name, "yum repo unreachable"))
            }
        }

        let mocks = RecordingInstallers::default();
        let failing = FailingInstaller;
        let dispatcher = InstallDispatcher {
            packages: &failing,
            artifacts: &mocks,
            versions: &mocks,
        };

        let err = dispatcher
            .install_server(&host(), &InstallStrategy::Package)
            .unwrap_err();
        assert!(err.to_string().contains("yum repo unreachable"));
    }

    #[test]
    fn test_remote_package_installer_picks_platform_command() {
        struct Capture(RefCell<Vec<String>>);
        impl RemoteRunner for Capture {
            fn run(&self, _host: &Host, command: &str) -> Result<RemoteOutput> {
                self.0.borrow_mut().push(command.to_string());
                Ok(RemoteOutput {
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: Some(0),
                })
            }
        }

        let capture = Capture(RefCell::new(Vec::new()));
        let installer = RemotePackageInstaller { runner: &capture };

        installer
            .install_package(&Host::new("a", "el-7-x86_64-x"), "quarryserver")
            .unwrap();
        installer
            .install_package(&Host::new("b", "ubuntu-14-amd64-x"), "quarryserver")
            .unwrap();

        assert_eq!(
            capture.0.borrow().as_slice(),
            &[
                "yum install -y quarryserver".to_string(),
                "apt-get install -y quarryserver".to_string(),
            ]
        );

        let err = installer
            .install_package(&Host::new("c", "windows-2016-x64-x"), "quarryserver")
            .unwrap_err();
        assert!(err.to_string().contains("no package manager"));
    }
}
