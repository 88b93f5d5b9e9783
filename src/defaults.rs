//! Locating and reading a package's environment-defaults file
//!
//! RPM-family platforms keep service defaults under /etc/sysconfig, Debian
//! derivatives under /etc/default. Anything else gets a warning and no path;
//! callers treat that as "unsupported platform" rather than an error.

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::Result;
use crate::platform::{classify, ClassifiedPlatform};
use crate::remote::{Host, RemoteRunner};
use crate::types::PlatformFamily;

/// OS-specific directory holding a package's environment-defaults file
pub fn defaults_dir(platform: &ClassifiedPlatform) -> Option<&'static Path> {
    match platform.family {
        PlatformFamily::Fedora | PlatformFamily::El => Some(Path::new("/etc/sysconfig")),
        PlatformFamily::Debian | PlatformFamily::Ubuntu => Some(Path::new("/etc/default")),
        PlatformFamily::Other => {
            warn!(family = %platform.family, "unsupported platform for server defaults");
            None
        }
    }
}

/// Full path of the defaults file for `package` on this platform
pub fn defaults_file(platform: &ClassifiedPlatform, package: &str) -> Option<PathBuf> {
    defaults_dir(platform).map(|dir| dir.join(package))
}

/// Source the defaults file on the host and echo one variable's value.
///
/// Returns None when the host's platform has no defaults directory.
pub fn defaults_var(
    runner: &dyn RemoteRunner,
    host: &Host,
    package: &str,
    varname: &str,
) -> Result<Option<String>> {
    let platform = classify(&host.platform);
    let Some(file) = defaults_file(&platform, package) else {
        return Ok(None);
    };

    let command = format!("source {}; echo -n ${}", file.display(), varname);
    let output = runner.run_checked(host, &command)?;
    Ok(Some(output.stdout))
}
