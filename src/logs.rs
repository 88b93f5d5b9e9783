//! Platform-aware retrieval of server logs after a run
//!
//! systemd-era platforms route the daemon's standard output to the journal
//! instead of the init-script log file, so the secondary log comes from
//! `journalctl` there and from a flat file everywhere else. Log collection is
//! diagnostic: the secondary step is best-effort and must never mask the
//! run's actual result.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::Result;
use crate::platform::{classify, ClassifiedPlatform};
use crate::remote::{FileTransfer, Host, RemoteRunner};
use crate::types::PlatformFamily;

/// Primary flat log written by the server on every platform
pub const SERVER_LOG: &str = "/var/log/quarry/quarryserver.log";
/// Daemon log written by the init scripts on pre-systemd platforms
pub const DAEMON_LOG: &str = "/var/log/quarry/quarryserver-daemon.log";
/// Local file name for the secondary log, whichever way it was captured
pub const DAEMON_LOG_NAME: &str = "quarryserver-daemon.log";
/// Default local root under which per-test log directories are created
pub const DEFAULT_LOG_ROOT: &str = "./log/latest/quarryserver";

const SERVER_UNIT: &str = "quarryserver";

/// Whether the daemon's output lands in the systemd journal on this platform
pub fn use_journal(platform: &ClassifiedPlatform) -> bool {
    match (platform.family, platform.version) {
        (PlatformFamily::Fedora, Some(v)) => v >= 15,
        (PlatformFamily::El, Some(v)) => v >= 7,
        _ => false,
    }
}

/// Outcome of one collection pass, with per-sub-step results so callers can
/// escalate the primary fetch and merely log the secondary one
#[derive(Debug)]
pub struct LogCollection {
    pub destination: PathBuf,
    pub primary: Result<PathBuf>,
    pub secondary: Result<PathBuf>,
}

impl LogCollection {
    /// Escalate the primary fetch; the secondary is advisory and only logged
    pub fn finish(self, host: &Host) -> Result<PathBuf> {
        if let Err(e) = &self.secondary {
            warn!(host = %host.name, error = %e, "failed to capture daemon log (continuing)");
        }
        self.primary
    }
}

/// Collect the server's logs from `host` into `<log_root>/<relative_path>`.
///
/// The destination directory is created first (idempotent). The primary flat
/// log is always fetched; the secondary log is either a journal capture or a
/// second flat-file fetch depending on the host's platform.
pub fn collect_logs(
    runner: &dyn RemoteRunner,
    transfer: &dyn FileTransfer,
    host: &Host,
    log_root: &Path,
    relative_path: &str,
) -> Result<LogCollection> {
    let platform = classify(&host.platform);
    let journal = use_journal(&platform);

    let destination = log_root.join(relative_path);
    fs::create_dir_all(&destination)?;

    let primary = transfer
        .fetch(host, SERVER_LOG, &destination)
        .map(|_| destination.join("quarryserver.log"));

    let secondary = if journal {
        capture_journal(runner, host, &destination)
    } else {
        transfer
            .fetch(host, DAEMON_LOG, &destination)
            .map(|_| destination.join(DAEMON_LOG_NAME))
    };

    info!(
        host = %host.name,
        destination = %destination.display(),
        journal,
        "collected server logs"
    );

    Ok(LogCollection {
        destination,
        primary,
        secondary,
    })
}

fn capture_journal(
    runner: &dyn RemoteRunner,
    host: &Host,
    destination: &Path,
) -> Result<PathBuf> {
    let output = runner.run_checked(host, &format!("journalctl -u {SERVER_UNIT}"))?;
    let path = destination.join(DAEMON_LOG_NAME);
    let mut text = output.trimmed_stdout().to_string();
    text.push('\n');
    fs::write(&path, text)?;
    Ok(path)
}
