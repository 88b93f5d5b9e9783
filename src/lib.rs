//! Quarry Server acceptance harness
//!
//! Resolves a single authoritative test-run configuration from explicit
//! options, environment variables, and defaults, then drives
//! platform-conditional operations (install, log collection, TLS bootstrap,
//! defaults lookup) against remote test hosts. Remote execution, file
//! transfer, and version discovery are injectable seams so the decision
//! logic tests without touching any host.

pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod installer;
pub mod logs;
pub mod platform;
pub mod remote;
pub mod settings;
pub mod tls;
pub mod types;
pub mod version;

// Re-export main types for convenience
pub use config::{ConfigCell, RawOptions, RunConfig};
pub use defaults::{defaults_dir, defaults_file, defaults_var};
pub use error::{HarnessError, Result};
pub use installer::{
    ArtifactInstaller, BuildToolArtifactInstaller, InstallDispatcher, PackageInstaller,
    RemotePackageInstaller, SERVER_PACKAGE,
};
pub use logs::{collect_logs, use_journal, LogCollection};
pub use platform::{classify, quarrydb_supported, ClassifiedPlatform};
pub use remote::{FileTransfer, Host, RemoteOutput, RemoteRunner, SshTransport};
pub use settings::{env_snapshot, resolve, EnvSnapshot, Setting, ValueType};
pub use tls::initialize_tls;
pub use types::{InstallMode, InstallStrategy, InstallType, PlatformFamily};
pub use version::{ArtifactVersions, BuildToolQuery, GitDescribeOracle, VersionOracle};
