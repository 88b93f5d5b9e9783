//! Remote-execution and file-transfer seams
//!
//! The harness never talks to hosts directly; everything goes through the
//! [`RemoteRunner`] and [`FileTransfer`] traits so the orchestration logic is
//! testable without any network. Production wiring uses [`SshTransport`],
//! which shells out to the system ssh/scp binaries.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{HarnessError, Result};

/// One remote test host: a reachable name plus its raw platform descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Name ssh can resolve
    pub name: String,
    /// Raw platform descriptor, e.g. "el-7-x86_64-server"
    pub platform: String,
}

impl Host {
    pub fn new(name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
        }
    }
}

/// Captured output of one remote command
#[derive(Debug, Clone)]
pub struct RemoteOutput {
    pub stdout: String,
    pub stderr: String,
    /// None when the command was terminated by a signal
    pub exit_code: Option<i32>,
}

impl RemoteOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn trimmed_stdout(&self) -> &str {
        self.stdout.trim()
    }
}

/// Runs a shell command on a remote host
pub trait RemoteRunner {
    fn run(&self, host: &Host, command: &str) -> Result<RemoteOutput>;

    /// Like [`RemoteRunner::run`], but a non-zero exit is an error
    fn run_checked(&self, host: &Host, command: &str) -> Result<RemoteOutput> {
        let output = self.run(host, command)?;
        if output.success() {
            Ok(output)
        } else {
            Err(HarnessError::remote(
                &host.name,
                format!(
                    "`{}` exited with {:?}: {}",
                    command,
                    output.exit_code,
                    output.stderr.trim()
                ),
            ))
        }
    }
}

/// Copies a file from a remote host into a local directory
pub trait FileTransfer {
    fn fetch(&self, host: &Host, remote_path: &str, local_dir: &Path) -> Result<()>;
}

/// Production transport shelling out to ssh and scp
#[derive(Debug, Clone, Copy, Default)]
pub struct SshTransport;

impl RemoteRunner for SshTransport {
    fn run(&self, host: &Host, command: &str) -> Result<RemoteOutput> {
        debug!(host = %host.name, command, "running remote command");
        let output = Command::new("ssh")
            .args(["-o", "BatchMode=yes"])
            .arg(&host.name)
            .arg(command)
            .output()
            .map_err(|e| HarnessError::remote(&host.name, format!("failed to spawn ssh: {e}")))?;

        Ok(RemoteOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        })
    }
}

impl FileTransfer for SshTransport {
    fn fetch(&self, host: &Host, remote_path: &str, local_dir: &Path) -> Result<()> {
        debug!(host = %host.name, remote_path, local_dir = %local_dir.display(), "fetching remote file");
        let output = Command::new("scp")
            .args(["-o", "BatchMode=yes"])
            .arg(format!("{}:{}", host.name, remote_path))
            .arg(local_dir)
            .output()
            .map_err(|e| HarnessError::remote(&host.name, format!("failed to spawn scp: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(HarnessError::remote(
                &host.name,
                format!(
                    "scp of {} exited with {:?}: {}",
                    remote_path,
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ))
        }
    }
}
