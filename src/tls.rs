//! TLS bootstrap across the test hosts
//!
//! Clears every agent's trust store, then runs each agent once against the
//! server so fresh certificates get signed (acceptance runs configure the
//! server to autosign). Starting and stopping the server itself belongs to
//! the surrounding test framework, not this step.

use tracing::info;

use crate::error::Result;
use crate::remote::{Host, RemoteRunner};

/// Regenerate TLS trust material for `agents` against `server`
pub fn initialize_tls(runner: &dyn RemoteRunner, server: &Host, agents: &[Host]) -> Result<()> {
    let hostname = runner
        .run_checked(server, "hostname -s")?
        .trimmed_stdout()
        .to_string();
    let fqdn = runner
        .run_checked(server, "hostname -f")?
        .trimmed_stdout()
        .to_string();
    info!(%hostname, %fqdn, "bootstrapping TLS trust material");

    for host in agents {
        let ssldir = runner
            .run_checked(host, "quarry agent --configprint ssldir")?
            .trimmed_stdout()
            .to_string();
        runner.run_checked(host, &format!("rm -rf '{ssldir}'/*"))?;
    }

    for host in agents {
        info!(host = %host.name, "running agent to generate CSR");
        runner.run_checked(
            host,
            &format!("quarry agent --test --server {}", server.name),
        )?;
    }

    Ok(())
}
